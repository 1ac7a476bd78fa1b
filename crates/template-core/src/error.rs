use thiserror::Error;

/// Errors raised while finalizing a code unit.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodeUnitError {
    #[error("Generated code calls undefined helper '{name}'")]
    UndefinedHelper { name: String },
}
