// src/engine/session.rs
use super::ViewEngine;
use crate::error::ViewError;
use crate::url::join_url;
use serde_json::Value;
use vellum_runtime::{ContextStack, Executor, Locals, RenderEnv, RenderGuard};

/// Per-request rendering state: one context stack shared by every view the
/// request loads.
///
/// Variables set through the session live in the base frame and are visible
/// to every view. Each nested view gets its own frame for the duration of
/// its render, so its `set` assignments vanish when it finishes.
#[derive(Debug)]
pub struct ViewSession<'e> {
    engine: &'e ViewEngine,
    context: ContextStack,
    /// Number of views currently being rendered.
    depth: usize,
}

impl<'e> ViewSession<'e> {
    pub fn new(engine: &'e ViewEngine) -> Self {
        Self {
            engine,
            context: ContextStack::new(),
            depth: 0,
        }
    }

    pub fn engine(&self) -> &'e ViewEngine {
        self.engine
    }

    pub fn context(&self) -> &ContextStack {
        &self.context
    }

    /// Sets a session-wide variable in the base frame.
    pub fn set_var(&mut self, name: impl Into<String>, value: Value) {
        self.context.set_global(name, value);
    }

    pub fn set_vars<I, K>(&mut self, variables: I)
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        for (name, value) in variables {
            self.context.set_global(name, value);
        }
    }

    pub fn get_var(&self, name: &str) -> Option<&Value> {
        self.context.get(name).ok()
    }

    pub fn has_var(&self, name: &str) -> bool {
        self.context.contains(name)
    }

    /// Removes a variable. Removing a variable that is not set does nothing.
    pub fn delete_var(&mut self, name: &str) -> Option<Value> {
        self.context.delete(name)
    }

    /// Renders the view `name` with `locals` as page-scoped variables.
    ///
    /// Locals are visible to that view only. They never enter the context
    /// stack, so `get_var` cannot see them.
    pub fn load_view(&mut self, name: &str, locals: Locals) -> Result<String, ViewError> {
        let mut out = String::new();
        self.render_view(name, locals, &mut out)?;
        Ok(out)
    }

    /// The site URL for `path`. See [`join_url`] for the joining rules.
    pub fn url(&self, path: Option<&str>) -> String {
        join_url(&self.engine.config().base_url, path)
    }

    pub fn asset_url(&self, path: Option<&str>) -> String {
        join_url(&self.engine.config().asset_base_url, path)
    }

    fn render_view(&mut self, name: &str, locals: Locals, out: &mut String) -> Result<(), ViewError> {
        let engine = self.engine;
        let config = engine.config();
        if !config.compile_templates {
            out.push_str(&engine.read_view(name)?);
            return Ok(());
        }

        let nested = self.depth > 0;
        if nested && self.depth > config.max_include_depth {
            return Err(ViewError::IncludeDepth {
                name: name.to_string(),
                limit: config.max_include_depth,
            });
        }

        let unit = engine.compile_view(name)?;
        let executor = Executor::new(&unit).with_escape(config.escape.into());

        let mut render = RenderGuard::enter(self, nested);
        executor.render_into(&mut *render, locals, out)
    }
}

impl RenderEnv for ViewSession<'_> {
    type Error = ViewError;

    fn context(&self) -> &ContextStack {
        &self.context
    }

    fn context_mut(&mut self) -> &mut ContextStack {
        &mut self.context
    }

    fn render_depth_mut(&mut self) -> &mut usize {
        &mut self.depth
    }

    fn include(&mut self, view: &str, locals: Locals, out: &mut String) -> Result<(), ViewError> {
        self.render_view(view, locals, out)
    }
}
