#![allow(dead_code)]

use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use vellum::{Locals, ViewConfig, ViewEngine, ViewError};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A temporary view folder that is deleted when dropped.
pub struct ViewFolder {
    dir: TempDir,
}

impl ViewFolder {
    pub fn new() -> std::io::Result<Self> {
        init_logger();
        Ok(Self { dir: TempDir::new()? })
    }

    /// Writes `source` as view `name` with the default `.tpl` extension.
    pub fn add(&self, name: &str, source: &str) -> std::io::Result<&Self> {
        let path = self.dir.path().join(format!("{}.tpl", name));
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, source)?;
        Ok(self)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn config(&self) -> ViewConfig {
        ViewConfig {
            view_folder: self.path().to_path_buf(),
            ..ViewConfig::default()
        }
    }

    pub fn engine(&self) -> Result<ViewEngine, ViewError> {
        ViewEngine::new(self.config())
    }
}

pub fn locals(value: Value) -> Locals {
    match value {
        Value::Object(map) => map,
        _ => Locals::new(),
    }
}
