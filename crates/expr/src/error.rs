use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExprError {
    #[error("Expression parse error in '{expression}': {message}")]
    Parse { expression: String, message: String },

    #[error("Undefined variable '{0}'")]
    UndefinedVariable(String),

    #[error("Call to undefined helper '{0}'")]
    UndefinedHelper(String),

    #[error("Helper '{name}' failed: {message}")]
    Helper { name: String, message: String },
}
