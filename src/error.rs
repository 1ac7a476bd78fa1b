// src/error.rs
use std::path::PathBuf;
use thiserror::Error;
use vellum_compiler::CompileError;
use vellum_runtime::RenderError;

/// Everything that can go wrong while loading a view.
#[derive(Error, Debug)]
pub enum ViewError {
    #[error("View '{name}' not found at {}", .path.display())]
    NoSuchView { name: String, path: PathBuf },

    #[error("Invalid view name '{name}': {reason}")]
    InvalidViewName { name: String, reason: &'static str },

    #[error("Compiling view '{name}' failed: {source}")]
    Compile {
        name: String,
        #[source]
        source: CompileError,
    },

    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("Including '{name}' exceeds the nesting limit of {limit}")]
    IncludeDepth { name: String, limit: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration is invalid: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ViewError {
    fn from(e: serde_json::Error) -> Self {
        ViewError::Config(e.to_string())
    }
}
