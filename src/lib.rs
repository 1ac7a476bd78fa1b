//! vellum renders named views.
//!
//! A view name resolves to a file under the configured view folder. With
//! `compile_templates` on, the file is compiled into a code unit (cached until
//! the file changes) and executed against the session's context stack.
//! Otherwise it is passed through verbatim.
//!
//! ```no_run
//! use vellum::{ViewEngine, ViewError};
//! use serde_json::json;
//!
//! fn main() -> Result<(), ViewError> {
//!     let engine = ViewEngine::builder().with_view_folder("views").build()?;
//!     let mut session = engine.session();
//!     session.set_var("user", json!({ "name": "Ada" }));
//!     let html = session.load_view("pages/home", Default::default())?;
//!     println!("{}", html);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
mod engine;
pub mod error;
pub mod resolver;
pub mod url;

pub use config::{EscapeSetting, ViewConfig};
pub use engine::{ViewEngine, ViewEngineBuilder, ViewSession};
pub use error::ViewError;

// Re-exports for callers that extend the vocabulary or drive the runtime directly.
pub use vellum_compiler::{CompileError, Compiler, Filter, Syntax, Tag, TemplateSyntaxError, Vocabulary};
pub use vellum_runtime::{ContextStack, Locals, RenderError};
pub use vellum_template_core::CodeUnit;
