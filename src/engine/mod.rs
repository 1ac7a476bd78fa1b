// src/engine/mod.rs
mod builder;
mod session;

pub use builder::ViewEngineBuilder;
pub use session::ViewSession;

use crate::cache::UnitCache;
use crate::config::ViewConfig;
use crate::error::ViewError;
use crate::resolver::ViewResolver;
use std::fs;
use std::sync::Arc;
use vellum_compiler::Compiler;
use vellum_runtime::Locals;
use vellum_template_core::CodeUnit;

/// The long-lived half of view rendering: configuration, compiler and the
/// compiled-unit cache. Cheap to share; each request gets its own
/// [`ViewSession`].
#[derive(Debug)]
pub struct ViewEngine {
    config: ViewConfig,
    resolver: ViewResolver,
    compiler: Compiler,
    cache: UnitCache,
}

impl ViewEngine {
    pub fn builder() -> ViewEngineBuilder {
        ViewEngineBuilder::new()
    }

    pub fn new(config: ViewConfig) -> Result<Self, ViewError> {
        ViewEngineBuilder::new().with_config(config).build()
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn resolver(&self) -> &ViewResolver {
        &self.resolver
    }

    pub fn cache(&self) -> &UnitCache {
        &self.cache
    }

    /// Starts a session with an empty context stack.
    pub fn session(&self) -> ViewSession<'_> {
        ViewSession::new(self)
    }

    /// Renders one view in a fresh session with `variables` in its base frame.
    pub fn render(&self, name: &str, variables: Locals) -> Result<String, ViewError> {
        let mut session = self.session();
        session.set_vars(variables);
        session.load_view(name, Locals::new())
    }

    /// Returns the compiled unit for `name`, compiling it unless a unit built
    /// from the same file version is cached. Failed compiles are not cached.
    pub fn compile_view(&self, name: &str) -> Result<Arc<CodeUnit>, ViewError> {
        let path = self.resolver.resolve(name)?;
        let modified = fs::metadata(&path).and_then(|m| m.modified()).ok();

        if self.config.cache_compiled {
            if let Some(unit) = self.cache.get_fresh(name, modified) {
                log::debug!("Using cached unit for view '{}'", name);
                return Ok(unit);
            }
        }

        let source = fs::read_to_string(&path)?;
        let unit = self
            .compiler
            .compile(&source, Some(name))
            .map_err(|source| ViewError::Compile {
                name: name.to_string(),
                source,
            })?;
        let unit = Arc::new(unit);

        if self.config.cache_compiled {
            self.cache.insert(name, modified, unit.clone());
        }
        Ok(unit)
    }

    /// Reads a view file as-is, for direct (uncompiled) mode.
    pub fn read_view(&self, name: &str) -> Result<String, ViewError> {
        let path = self.resolver.resolve(name)?;
        log::debug!("Passing through view '{}' from {}", name, path.display());
        Ok(fs::read_to_string(path)?)
    }
}
