//! Built-in filters.
//!
//! Most filters wrap the expression in one helper call; they differ only in the
//! helper they register, their arity and whether their result is already markup.

mod filesize;
mod text;

pub use filesize::{FORMAT_FILE_SIZE, FileSizeFilter, format_file_size};
pub use text::{
    ARRAY_JOIN, HTML_NL2BR, JSON_ENCODE, STR_LOWER, STR_TRIM, STR_TRUNCATE, STR_UPPER, VALUE_LENGTH,
    VALUE_OR_DEFAULT,
};

use crate::error::CompileError;
use crate::filter::{Escape, Filter, parse_arguments};
use std::ops::RangeInclusive;
use std::sync::Arc;
use vellum_expr::{Expression, Helper};
use vellum_template_core::CodeUnitBuilder;

/// A filter that wraps the expression in a call to a single helper.
#[derive(Debug, Clone)]
pub struct HelperFilter {
    name: &'static str,
    helper: Helper,
    arity: RangeInclusive<usize>,
    /// The helper returns markup, so the output must not be escaped again.
    produces_markup: bool,
}

impl HelperFilter {
    pub fn new(name: &'static str, helper: Helper) -> Self {
        Self {
            name,
            helper,
            arity: 0..=0,
            produces_markup: false,
        }
    }

    pub fn with_arity(mut self, arity: RangeInclusive<usize>) -> Self {
        self.arity = arity;
        self
    }

    pub fn producing_markup(mut self) -> Self {
        self.produces_markup = true;
        self
    }
}

impl Filter for HelperFilter {
    fn name(&self) -> &str {
        self.name
    }

    fn arity(&self) -> RangeInclusive<usize> {
        self.arity.clone()
    }

    fn apply(
        &self,
        expression: Expression,
        arguments: &[String],
        escape: &mut Escape,
        unit: &mut CodeUnitBuilder,
    ) -> Result<Expression, CompileError> {
        unit.register_helper(self.helper);
        if self.produces_markup {
            escape.disable();
        }
        Ok(expression.wrap(self.helper.name, parse_arguments(arguments)?))
    }
}

/// `raw`: output the value unescaped. Registers nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawFilter;

impl Filter for RawFilter {
    fn name(&self) -> &str {
        "raw"
    }

    fn apply(
        &self,
        expression: Expression,
        _arguments: &[String],
        escape: &mut Escape,
        _unit: &mut CodeUnitBuilder,
    ) -> Result<Expression, CompileError> {
        escape.disable();
        Ok(expression)
    }
}

/// Every built-in filter, in registration order.
pub fn builtins() -> Vec<Arc<dyn Filter>> {
    vec![
        Arc::new(RawFilter),
        Arc::new(HelperFilter::new("upper", STR_UPPER)),
        Arc::new(HelperFilter::new("lower", STR_LOWER)),
        Arc::new(HelperFilter::new("trim", STR_TRIM)),
        Arc::new(HelperFilter::new("default", VALUE_OR_DEFAULT).with_arity(1..=1)),
        Arc::new(HelperFilter::new("truncate", STR_TRUNCATE).with_arity(1..=2)),
        Arc::new(HelperFilter::new("length", VALUE_LENGTH)),
        Arc::new(HelperFilter::new("join", ARRAY_JOIN).with_arity(0..=1)),
        Arc::new(HelperFilter::new("json", JSON_ENCODE)),
        Arc::new(HelperFilter::new("nl2br", HTML_NL2BR).producing_markup()),
        Arc::new(FileSizeFilter),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_expr::parse_expression;

    fn apply(filter: &dyn Filter, args: &[&str]) -> (Expression, Escape, CodeUnitBuilder) {
        let mut unit = CodeUnitBuilder::new();
        let mut escape = Escape::default();
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let expr = filter
            .apply(parse_expression("value").unwrap(), &args, &mut escape, &mut unit)
            .unwrap();
        (expr, escape, unit)
    }

    #[test]
    fn helper_filter_wraps_and_registers() {
        let (expr, escape, unit) = apply(&HelperFilter::new("upper", STR_UPPER), &[]);
        assert_eq!(expr.to_string(), "str_upper(value)");
        assert!(escape.is_enabled());
        assert!(unit.has_helper("str_upper"));
    }

    #[test]
    fn extra_arguments_follow_the_value() {
        let filter = HelperFilter::new("truncate", STR_TRUNCATE).with_arity(1..=2);
        let (expr, _, _) = apply(&filter, &["5", "'..'"]);
        assert_eq!(expr.to_string(), "str_truncate(value, 5, '..')");
    }

    #[test]
    fn raw_disables_escape_without_helpers() {
        let (expr, escape, unit) = apply(&RawFilter, &[]);
        assert_eq!(expr.to_string(), "value");
        assert!(!escape.is_enabled());
        assert!(unit.helpers().is_empty());
    }

    #[test]
    fn builtin_names_are_unique() {
        let mut names: Vec<String> = builtins().iter().map(|f| f.name().to_string()).collect();
        let count = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), count);
    }
}
