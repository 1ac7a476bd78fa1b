//! The filter contract: a compile-time transform of an output expression.

use crate::error::CompileError;
use std::ops::RangeInclusive;
use vellum_expr::{Expression, parse_expression};
use vellum_template_core::CodeUnitBuilder;

/// Escape state threaded through a filter chain.
///
/// Filters can turn escaping off but never back on, so once a filter has
/// produced markup no later filter can cause it to be escaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Escape {
    enabled: bool,
}

impl Default for Escape {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Escape {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }
}

/// A named output transform.
///
/// `apply` receives the expression produced so far and returns a new one,
/// registering on `unit` every helper the returned expression calls.
pub trait Filter: Send + Sync {
    fn name(&self) -> &str;

    /// Accepted argument counts, checked when the template is parsed.
    fn arity(&self) -> RangeInclusive<usize> {
        0..=0
    }

    fn apply(
        &self,
        expression: Expression,
        arguments: &[String],
        escape: &mut Escape,
        unit: &mut CodeUnitBuilder,
    ) -> Result<Expression, CompileError>;
}

/// Parses filter arguments as expressions.
pub fn parse_arguments(arguments: &[String]) -> Result<Vec<Expression>, CompileError> {
    arguments
        .iter()
        .map(|arg| parse_expression(arg).map_err(CompileError::from))
        .collect()
}
