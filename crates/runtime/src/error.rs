use thiserror::Error;
use vellum_expr::ExprError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContextError {
    #[error("No such variable '{0}'")]
    NoSuchVariable(String),
}

/// Errors raised while executing a code unit.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("No such variable '{0}'")]
    NoSuchVariable(String),

    #[error("Expression error: {0}")]
    Expression(ExprError),

    #[error("Cannot iterate over {found} in 'for {binding}'")]
    InvalidIterable { binding: String, found: String },

    #[error("Locals for include '{view}' must be an object, got {found}")]
    InvalidLocals { view: String, found: String },

    #[error("No view named '{0}' is available to include")]
    UnknownInclude(String),

    #[error("Including '{view}' exceeds the nesting limit of {limit}")]
    IncludeDepth { view: String, limit: usize },
}

impl From<ExprError> for RenderError {
    fn from(err: ExprError) -> Self {
        match err {
            ExprError::UndefinedVariable(name) => RenderError::NoSuchVariable(name),
            other => RenderError::Expression(other),
        }
    }
}

impl From<ContextError> for RenderError {
    fn from(err: ContextError) -> Self {
        match err {
            ContextError::NoSuchVariable(name) => RenderError::NoSuchVariable(name),
        }
    }
}
