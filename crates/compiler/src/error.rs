use thiserror::Error;
use vellum_expr::ExprError;
use vellum_template_core::{CodeUnitError, Location};

/// A structural problem in template source, always tied to the position where it was found.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TemplateSyntaxError {
    #[error("Unterminated {what} starting at {location}")]
    Unterminated { what: &'static str, location: Location },

    #[error("Tag without a name at {location}")]
    EmptyTag { location: Location },

    #[error("Empty expression at {location}")]
    EmptyExpression { location: Location },

    #[error("Unknown tag '{name}' at {location}")]
    UnknownTag { name: String, location: Location },

    #[error("Unknown filter '{name}' at {location}")]
    UnknownFilter { name: String, location: Location },

    #[error("Closing tag 'end{found}' at {location} does not match the open '{expected}' block")]
    MismatchedClose { expected: String, found: String, location: Location },

    #[error("Closing tag 'end{name}' at {location} has no open block")]
    UnexpectedClose { name: String, location: Location },

    #[error("Block '{name}' opened at {location} is never closed")]
    UnclosedBlock { name: String, location: Location },

    #[error("Tag '{name}' at {location} must appear directly inside {}", .allowed.join(" or "))]
    MisplacedTag { name: String, allowed: Vec<String>, location: Location },

    #[error("Invalid expression '{expression}' at {location}: {message}")]
    InvalidExpression { expression: String, message: String, location: Location },

    #[error("Invalid arguments for '{name}' at {location}: {message}")]
    InvalidArguments { name: String, message: String, location: Location },
}

impl TemplateSyntaxError {
    pub fn location(&self) -> Location {
        match self {
            TemplateSyntaxError::Unterminated { location, .. }
            | TemplateSyntaxError::EmptyTag { location }
            | TemplateSyntaxError::EmptyExpression { location }
            | TemplateSyntaxError::UnknownTag { location, .. }
            | TemplateSyntaxError::UnknownFilter { location, .. }
            | TemplateSyntaxError::MismatchedClose { location, .. }
            | TemplateSyntaxError::UnexpectedClose { location, .. }
            | TemplateSyntaxError::UnclosedBlock { location, .. }
            | TemplateSyntaxError::MisplacedTag { location, .. }
            | TemplateSyntaxError::InvalidExpression { location, .. }
            | TemplateSyntaxError::InvalidArguments { location, .. } => *location,
        }
    }

    /// Converts an expression parse failure found at `location`.
    pub(crate) fn from_expr(err: ExprError, source: &str, location: Location) -> Self {
        let message = match err {
            ExprError::Parse { message, .. } => message,
            other => other.to_string(),
        };
        TemplateSyntaxError::InvalidExpression {
            expression: source.trim().to_string(),
            message,
            location,
        }
    }
}

/// Errors produced while turning template source into a code unit.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("Template syntax error: {0}")]
    Syntax(#[from] TemplateSyntaxError),

    #[error("Generated code calls undefined helper '{name}'")]
    UndefinedHelper { name: String },

    #[error("Filter argument error: {0}")]
    Expression(#[from] ExprError),

    #[error("A {kind} named '{name}' is already registered")]
    DuplicateName { kind: &'static str, name: String },
}

impl From<CodeUnitError> for CompileError {
    fn from(err: CodeUnitError) -> Self {
        match err {
            CodeUnitError::UndefinedHelper { name } => CompileError::UndefinedHelper { name },
        }
    }
}
