//! The seam between the executor and whatever owns the context stack and views.

use crate::context::ContextStack;
use crate::error::RenderError;
use crate::executor::{Executor, Locals};
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use vellum_template_core::{CodeUnit, EscapeMode};

/// Everything a render needs from its surroundings.
///
/// The view session implements this to resolve includes from disk. The
/// error type lets it surface its own failures through the executor.
pub trait RenderEnv {
    type Error: From<RenderError>;

    fn context(&self) -> &ContextStack;

    fn context_mut(&mut self) -> &mut ContextStack;

    /// Counter of views currently being rendered through this environment.
    fn render_depth_mut(&mut self) -> &mut usize;

    /// Renders the view named `view` into `out` with `locals` as its page locals.
    fn include(&mut self, view: &str, locals: Locals, out: &mut String) -> Result<(), Self::Error>;
}

/// One view render in progress on an environment.
///
/// Entering bumps the render depth and optionally pushes a context frame.
/// Dropping restores both, so a render that fails or panics leaves the
/// environment as it found it.
pub struct RenderGuard<'a, E: RenderEnv> {
    env: &'a mut E,
    context_depth: usize,
    render_depth: usize,
}

impl<'a, E: RenderEnv> RenderGuard<'a, E> {
    pub fn enter(env: &'a mut E, push_frame: bool) -> Self {
        let context_depth = env.context().depth();
        let render_depth = *env.render_depth_mut();
        if push_frame {
            env.context_mut().push();
        }
        *env.render_depth_mut() += 1;
        Self {
            env,
            context_depth,
            render_depth,
        }
    }
}

impl<E: RenderEnv> Deref for RenderGuard<'_, E> {
    type Target = E;

    fn deref(&self) -> &E {
        self.env
    }
}

impl<E: RenderEnv> DerefMut for RenderGuard<'_, E> {
    fn deref_mut(&mut self) -> &mut E {
        self.env
    }
}

impl<E: RenderEnv> Drop for RenderGuard<'_, E> {
    fn drop(&mut self) {
        self.env.context_mut().restore_depth(self.context_depth);
        *self.env.render_depth_mut() = self.render_depth;
    }
}

/// An environment whose includable views are compiled units held in memory.
#[derive(Debug, Clone)]
pub struct MemoryEnv {
    context: ContextStack,
    views: HashMap<String, Arc<CodeUnit>>,
    escape: EscapeMode,
    max_depth: usize,
    depth: usize,
}

impl Default for MemoryEnv {
    fn default() -> Self {
        Self {
            context: ContextStack::new(),
            views: HashMap::new(),
            escape: EscapeMode::default(),
            max_depth: 16,
            depth: 0,
        }
    }
}

impl MemoryEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_view(mut self, name: impl Into<String>, unit: Arc<CodeUnit>) -> Self {
        self.views.insert(name.into(), unit);
        self
    }

    pub fn with_escape(mut self, escape: EscapeMode) -> Self {
        self.escape = escape;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Renders a registered view as the outermost render.
    pub fn render(&mut self, view: &str, locals: Locals) -> Result<String, RenderError> {
        let unit = self.lookup(view)?;
        Executor::new(&unit).with_escape(self.escape).render(self, locals)
    }

    fn lookup(&self, view: &str) -> Result<Arc<CodeUnit>, RenderError> {
        self.views
            .get(view)
            .cloned()
            .ok_or_else(|| RenderError::UnknownInclude(view.to_string()))
    }
}

impl RenderEnv for MemoryEnv {
    type Error = RenderError;

    fn context(&self) -> &ContextStack {
        &self.context
    }

    fn context_mut(&mut self) -> &mut ContextStack {
        &mut self.context
    }

    fn render_depth_mut(&mut self) -> &mut usize {
        &mut self.depth
    }

    fn include(&mut self, view: &str, locals: Locals, out: &mut String) -> Result<(), RenderError> {
        if self.depth >= self.max_depth {
            return Err(RenderError::IncludeDepth {
                view: view.to_string(),
                limit: self.max_depth,
            });
        }
        let unit = self.lookup(view)?;
        let executor = Executor::new(&unit).with_escape(self.escape);
        let mut render = RenderGuard::enter(self, true);
        executor.render_into(&mut *render, locals, out)
    }
}
