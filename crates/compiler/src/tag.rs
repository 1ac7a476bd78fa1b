//! The tag contract: block and standalone control constructs.

use crate::error::{CompileError, TemplateSyntaxError};
use crate::node::BlockNode;
use std::fmt;
use vellum_expr::{Expression, parse_expression};
use vellum_template_core::{CodeUnitBuilder, Instruction, Location};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// Has a body and needs a matching `end<name>` tag.
    Block,
    /// Has no body.
    Standalone,
}

/// Arguments a tag extracted from its source text when it was opened.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TagArguments {
    pub raw: String,
    /// Identifiers the tag binds, e.g. the loop variable of `for`.
    pub names: Vec<String>,
    pub expressions: Vec<Expression>,
    /// Quoted literal values, e.g. the view name of `include`.
    pub literals: Vec<String>,
}

impl TagArguments {
    pub fn new(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            ..Self::default()
        }
    }

    pub fn expression(&self, index: usize, tag: &str, location: Location) -> Result<&Expression, CompileError> {
        self.expressions
            .get(index)
            .ok_or_else(|| missing_argument(tag, "expression", location))
    }

    pub fn name(&self, index: usize, tag: &str, location: Location) -> Result<&str, CompileError> {
        self.names
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| missing_argument(tag, "name", location))
    }

    pub fn literal(&self, index: usize, tag: &str, location: Location) -> Result<&str, CompileError> {
        self.literals
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| missing_argument(tag, "literal", location))
    }
}

fn missing_argument(tag: &str, what: &str, location: Location) -> CompileError {
    CompileError::Syntax(TemplateSyntaxError::InvalidArguments {
        name: tag.to_string(),
        message: format!("missing {}", what),
        location,
    })
}

pub trait Tag: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn kind(&self) -> TagKind;

    /// Names of the blocks this tag must sit directly inside. Empty means anywhere.
    fn enclosing(&self) -> &[&'static str] {
        &[]
    }

    /// Validates and parses the argument text when the tag is opened.
    fn open(&self, arguments: &str, location: Location) -> Result<TagArguments, TemplateSyntaxError>;

    /// Called once a block's children are complete.
    fn close(&self, _node: &mut BlockNode) -> Result<(), TemplateSyntaxError> {
        Ok(())
    }

    fn emit(&self, node: &BlockNode, unit: &mut CodeUnitBuilder) -> Result<Vec<Instruction>, CompileError>;
}

// --- Argument parsing utilities shared by the built-in tags ---

pub(crate) fn invalid(tag: &str, message: impl Into<String>, location: Location) -> TemplateSyntaxError {
    TemplateSyntaxError::InvalidArguments {
        name: tag.to_string(),
        message: message.into(),
        location,
    }
}

pub(crate) fn parse_argument_expression(
    tag: &str,
    text: &str,
    location: Location,
) -> Result<Expression, TemplateSyntaxError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(invalid(tag, "expected an expression", location));
    }
    parse_expression(text).map_err(|e| TemplateSyntaxError::from_expr(e, text, location))
}
