// src/config.rs
use crate::error::ViewError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use vellum_runtime::EscapeMode;

/// Output escaping applied to `{{ }}` expressions, as written in configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EscapeSetting {
    #[default]
    Html,
    None,
}

impl From<EscapeSetting> for EscapeMode {
    fn from(setting: EscapeSetting) -> Self {
        match setting {
            EscapeSetting::Html => EscapeMode::Html,
            EscapeSetting::None => EscapeMode::None,
        }
    }
}

/// Settings for a [`ViewEngine`](crate::ViewEngine). Every field has a default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewConfig {
    /// Folder view names are resolved against.
    pub view_folder: PathBuf,
    /// Appended to a view name to form its file name, e.g. `.tpl`.
    pub extension: String,
    /// Compile views as templates. When false, view files are passed through verbatim.
    pub compile_templates: bool,
    /// Keep compiled units in memory until the source file changes.
    pub cache_compiled: bool,
    pub escape: EscapeSetting,
    pub base_url: String,
    pub asset_base_url: String,
    /// How many views may be nested through `include` below the outermost one.
    pub max_include_depth: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            view_folder: PathBuf::from("views"),
            extension: ".tpl".into(),
            compile_templates: true,
            cache_compiled: true,
            escape: EscapeSetting::Html,
            base_url: "http://localhost".into(),
            asset_base_url: "http://localhost/assets".into(),
            max_include_depth: 16,
        }
    }
}

impl ViewConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ViewError> {
        let config: ViewConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ViewError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            ViewError::Config(format!("failed to read '{}': {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ViewError> {
        if self.extension.contains('/') {
            return Err(ViewError::Config(format!(
                "extension '{}' must not contain '/'",
                self.extension
            )));
        }
        Ok(())
    }
}
