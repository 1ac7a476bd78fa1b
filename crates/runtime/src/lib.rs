//! Render-time support for compiled vellum templates.
//!
//! - [`ContextStack`]: layered variables shared by every view in a session
//! - [`Executor`]: walks a code unit's instructions and writes output
//! - [`RenderEnv`]: what the executor needs from its owner (context, includes)

mod context;
mod env;
pub mod error;
mod executor;

pub use context::{ContextStack, Frame, ScopeGuard};
pub use env::{MemoryEnv, RenderEnv, RenderGuard};
pub use error::{ContextError, RenderError};
pub use executor::{Executor, Locals};
pub use vellum_template_core::EscapeMode;
