//! Defines the Abstract Syntax Tree (AST) for template expressions.
use serde_json::Value;
use std::fmt;

/// The top-level representation of a parsed expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A literal value, like a string, number, or boolean.
    Literal(Value),
    /// A variable lookup, optionally followed by key/index segments.
    Path(Path),
    /// A call to a helper routine registered on the code unit.
    Call { name: String, args: Vec<Expression> },
    /// Logical negation of the operand's truthiness.
    Not(Box<Expression>),
    /// An equality comparison.
    Compare {
        op: CompareOp,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
}

/// Represents a segment in a path after the root variable.
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    /// An object key (e.g., `.name`).
    Key(String),
    /// An array index (e.g., `[0]`).
    Index(usize),
}

/// A variable reference such as `user.orders[0].id`.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub root: String,
    pub segments: Vec<PathSegment>,
}

impl Path {
    pub fn variable(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            segments: Vec::new(),
        }
    }
}

impl Expression {
    /// Wraps `self` as the first argument of a helper call, followed by `extra`.
    ///
    /// This is how filters compose: `x | upper` becomes `str_upper(x)`.
    pub fn wrap(self, helper: &str, extra: Vec<Expression>) -> Expression {
        let mut args = Vec::with_capacity(extra.len() + 1);
        args.push(self);
        args.extend(extra);
        Expression::Call {
            name: helper.to_string(),
            args,
        }
    }

    /// Visits the name of every helper call in this expression, depth first.
    pub fn visit_calls<'a>(&'a self, visit: &mut dyn FnMut(&'a str)) {
        match self {
            Expression::Literal(_) | Expression::Path(_) => {}
            Expression::Call { name, args } => {
                visit(name);
                for arg in args {
                    arg.visit_calls(visit);
                }
            }
            Expression::Not(inner) => inner.visit_calls(visit),
            Expression::Compare { lhs, rhs, .. } => {
                lhs.visit_calls(visit);
                rhs.visit_calls(visit);
            }
        }
    }
}

// --- Source rendering ---
//
// `Display` prints an expression back in the syntax accepted by the parser,
// which is what the code unit listing shows.

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(value) => write_literal(f, value),
            Expression::Path(path) => write!(f, "{}", path),
            Expression::Call { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
            Expression::Not(inner) => match inner.as_ref() {
                Expression::Compare { .. } => write!(f, "!({})", inner),
                _ => write!(f, "!{}", inner),
            },
            Expression::Compare { op, lhs, rhs } => write!(f, "{} {} {}", lhs, op, rhs),
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Eq => f.write_str("=="),
            CompareOp::Ne => f.write_str("!="),
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.root)?;
        for segment in &self.segments {
            match segment {
                PathSegment::Key(k) => write!(f, ".{}", k)?,
                PathSegment::Index(i) => write!(f, "[{}]", i)?,
            }
        }
        Ok(())
    }
}

fn write_literal(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::String(s) if s.contains('\'') => write!(f, "\"{}\"", s),
        Value::String(s) => write!(f, "'{}'", s),
        other => write!(f, "{}", other),
    }
}
