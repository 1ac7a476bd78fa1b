//! The vellum template compiler.
//!
//! Source text goes through three stages:
//!
//! 1. **Lexing** (`lexer`): split into text, `{{ expression | filter }}` and
//!    `{% tag %}` tokens.
//! 2. **Parsing** (`parser`): resolve filter and tag names against a
//!    [`Vocabulary`] and build a [`node::Root`] tree.
//! 3. **Emission** (`node`): every node writes its own instructions into a
//!    [`CodeUnitBuilder`](vellum_template_core::CodeUnitBuilder), registering
//!    the helper routines its filters need.
//!
//! The result is an immutable [`CodeUnit`](vellum_template_core::CodeUnit)
//! ready for the runtime.

mod compiler;
pub mod error;
pub mod filter;
pub mod filters;
pub mod lexer;
pub mod node;
pub mod parser;
pub mod tag;
pub mod tags;
mod vocabulary;

pub use compiler::{Compiler, compile};
pub use error::{CompileError, TemplateSyntaxError};
pub use filter::{Escape, Filter};
pub use lexer::{Syntax, TagRole, Token, TokenKind};
pub use tag::{Tag, TagArguments, TagKind};
pub use vocabulary::Vocabulary;
