//! The evaluation engine for executing a parsed expression AST.
use super::ast::{CompareOp, Expression, Path, PathSegment};
use super::helpers::HelperSet;
use crate::error::ExprError;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Anything that can resolve the root name of a path.
pub trait VariableSource {
    fn lookup(&self, name: &str) -> Option<&Value>;
}

impl VariableSource for HashMap<String, Value> {
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl VariableSource for Map<String, Value> {
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

/// A container for all state needed during expression evaluation.
#[derive(Clone, Copy)]
pub struct EvaluationContext<'a> {
    pub variables: &'a dyn VariableSource,
    pub helpers: &'a HelperSet,
}

/// Evaluates a compiled expression to a `serde_json::Value`.
///
/// An unknown root variable is an error. A missing key or index further down
/// the path evaluates to `null`.
pub fn evaluate(expr: &Expression, e_ctx: &EvaluationContext) -> Result<Value, ExprError> {
    match expr {
        Expression::Literal(val) => Ok(val.clone()),
        Expression::Path(path) => select(path, e_ctx.variables).map(|v| v.cloned().unwrap_or(Value::Null)),
        Expression::Call { name, args } => {
            let helper = e_ctx
                .helpers
                .get(name)
                .ok_or_else(|| ExprError::UndefinedHelper(name.clone()))?;
            let evaluated_args = args
                .iter()
                .map(|arg| evaluate(arg, e_ctx))
                .collect::<Result<Vec<_>, _>>()?;
            helper.call(&evaluated_args).map_err(|message| ExprError::Helper {
                name: name.clone(),
                message,
            })
        }
        Expression::Not(inner) => Ok(Value::Bool(!is_truthy(&evaluate(inner, e_ctx)?))),
        Expression::Compare { op, lhs, rhs } => {
            let equal = values_equal(&evaluate(lhs, e_ctx)?, &evaluate(rhs, e_ctx)?);
            Ok(Value::Bool(match op {
                CompareOp::Eq => equal,
                CompareOp::Ne => !equal,
            }))
        }
    }
}

/// Evaluates an expression and coerces the result to a boolean.
pub fn evaluate_as_bool(expr: &Expression, e_ctx: &EvaluationContext) -> Result<bool, ExprError> {
    evaluate(expr, e_ctx).map(|v| is_truthy(&v))
}

/// Evaluates an expression and coerces the result to a string.
pub fn evaluate_as_string(
    expr: &Expression,
    e_ctx: &EvaluationContext,
) -> Result<String, ExprError> {
    evaluate(expr, e_ctx).map(|v| to_output_string(&v))
}

/// "Truthiness" rules: `false`, `null`, `0`, `""`, empty arrays/objects are false.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().unwrap_or(0.0) != 0.0,
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// The text written to the output for a value. `null` prints as nothing.
pub fn to_output_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Equality where numbers compare by value regardless of integer/float representation.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Resolves a path against the variable source.
pub fn select<'a>(
    path: &Path,
    variables: &'a dyn VariableSource,
) -> Result<Option<&'a Value>, ExprError> {
    let mut current = variables
        .lookup(&path.root)
        .ok_or_else(|| ExprError::UndefinedVariable(path.root.clone()))?;
    for segment in &path.segments {
        let next_val = match segment {
            PathSegment::Key(k) => current.get(k),
            PathSegment::Index(i) => current.get(i),
        };
        match next_val {
            Some(next) => current = next,
            None => return Ok(None),
        }
    }
    Ok(Some(current))
}
