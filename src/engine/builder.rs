// src/engine/builder.rs
use super::ViewEngine;
use crate::cache::UnitCache;
use crate::config::ViewConfig;
use crate::error::ViewError;
use crate::resolver::ViewResolver;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use vellum_compiler::{Compiler, Filter, Syntax, Tag, Vocabulary};

/// A builder for creating a `ViewEngine`.
#[derive(Debug, Default)]
pub struct ViewEngineBuilder {
    config: ViewConfig,
    syntax: Syntax,
    vocabulary: Vocabulary,
}

impl ViewEngineBuilder {
    /// Creates a builder with the default configuration and the built-in filters and tags.
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_config(mut self, config: ViewConfig) -> Self {
        self.config = config;
        self
    }

    /// Loads the configuration from a JSON file, replacing any set before.
    pub fn with_config_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ViewError> {
        self.config = ViewConfig::from_json_file(path)?;
        Ok(self)
    }

    pub fn with_view_folder<P: Into<PathBuf>>(mut self, folder: P) -> Self {
        self.config.view_folder = folder.into();
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.config.extension = extension.into();
        self
    }

    /// Switches between compiled templates and verbatim pass-through.
    pub fn with_compilation(mut self, compile_templates: bool) -> Self {
        self.config.compile_templates = compile_templates;
        self
    }

    pub fn with_syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = syntax;
        self
    }

    /// Adds a custom filter. Fails if the name is already taken.
    pub fn with_filter(mut self, filter: Arc<dyn Filter>) -> Result<Self, ViewError> {
        self.vocabulary
            .register_filter(filter)
            .map_err(|e| ViewError::Config(e.to_string()))?;
        Ok(self)
    }

    /// Adds a custom tag. Fails if the name is already taken.
    pub fn with_tag(mut self, tag: Arc<dyn Tag>) -> Result<Self, ViewError> {
        self.vocabulary
            .register_tag(tag)
            .map_err(|e| ViewError::Config(e.to_string()))?;
        Ok(self)
    }

    /// Consumes the builder and creates the `ViewEngine`.
    pub fn build(self) -> Result<ViewEngine, ViewError> {
        self.config.validate()?;
        let resolver = ViewResolver::new(&self.config.view_folder, &self.config.extension);
        let compiler = Compiler::new(Arc::new(self.vocabulary)).with_syntax(self.syntax);
        log::debug!(
            "Built view engine for {} (compile_templates: {}, cache: {})",
            resolver.folder().display(),
            self.config.compile_templates,
            self.config.cache_compiled
        );
        Ok(ViewEngine {
            config: self.config,
            resolver,
            compiler,
            cache: UnitCache::new(),
        })
    }
}
