//! The expression language embedded in vellum templates.
//!
//! Expressions select values from the render scope and call helper routines
//! registered on a code unit. Template filters work by wrapping an expression
//! in a helper call, so the same AST doubles as the generated code.

pub mod ast;
pub mod engine;
pub mod error;
pub mod helpers;
mod parser;

// --- Public API ---
pub use ast::{CompareOp, Expression, Path, PathSegment};
pub use engine::{
    EvaluationContext, VariableSource, evaluate, evaluate_as_bool, evaluate_as_string, is_truthy,
    select, to_output_string, values_equal,
};
pub use error::ExprError;
pub use helpers::{Helper, HelperFn, HelperSet};
pub use parser::{is_identifier, parse_expression};
