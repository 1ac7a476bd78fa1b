//! The node tree built by the parser. Each node emits its own instructions.

use crate::error::CompileError;
use crate::filter::{Escape, Filter};
use crate::tag::{Tag, TagArguments};
use std::fmt;
use std::sync::Arc;
use vellum_expr::Expression;
use vellum_template_core::{CodeUnitBuilder, Instruction, Location};

#[derive(Debug, Clone)]
pub enum Node {
    Text(TextNode),
    Expression(ExpressionNode),
    Block(BlockNode),
}

impl Node {
    pub fn emit(&self, unit: &mut CodeUnitBuilder) -> Result<Vec<Instruction>, CompileError> {
        match self {
            Node::Text(node) => Ok(node.emit()),
            Node::Expression(node) => node.emit(unit).map(|i| vec![i]),
            Node::Block(node) => node.emit(unit),
        }
    }

    /// The tag name when this node is a block, for matching `else` and friends.
    pub fn tag_name(&self) -> Option<&str> {
        match self {
            Node::Block(block) => Some(block.tag.name()),
            _ => None,
        }
    }
}

/// Emits a sequence of sibling nodes in order.
pub fn emit_all(nodes: &[Node], unit: &mut CodeUnitBuilder) -> Result<Vec<Instruction>, CompileError> {
    let mut instructions = Vec::with_capacity(nodes.len());
    for node in nodes {
        instructions.extend(node.emit(unit)?);
    }
    Ok(instructions)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextNode {
    pub text: String,
}

impl TextNode {
    fn emit(&self) -> Vec<Instruction> {
        if self.text.is_empty() {
            Vec::new()
        } else {
            vec![Instruction::Text(self.text.clone())]
        }
    }
}

/// A filter resolved against the vocabulary, with its raw arguments.
#[derive(Clone)]
pub struct AppliedFilter {
    pub filter: Arc<dyn Filter>,
    pub arguments: Vec<String>,
}

impl fmt::Debug for AppliedFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppliedFilter")
            .field("filter", &self.filter.name())
            .field("arguments", &self.arguments)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ExpressionNode {
    pub expression: Expression,
    pub filters: Vec<AppliedFilter>,
    pub escape: Escape,
    pub location: Location,
}

impl ExpressionNode {
    /// Folds the filter chain left to right over the expression, then outputs it.
    pub fn emit(&self, unit: &mut CodeUnitBuilder) -> Result<Instruction, CompileError> {
        let mut expression = self.expression.clone();
        let mut escape = self.escape;
        for applied in &self.filters {
            expression = applied
                .filter
                .apply(expression, &applied.arguments, &mut escape, unit)?;
        }
        Ok(Instruction::Output {
            expression,
            escape: escape.is_enabled(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct BlockNode {
    pub tag: Arc<dyn Tag>,
    pub arguments: TagArguments,
    pub children: Vec<Node>,
    pub location: Location,
}

impl BlockNode {
    pub fn emit(&self, unit: &mut CodeUnitBuilder) -> Result<Vec<Instruction>, CompileError> {
        self.tag.emit(self, unit)
    }

    /// Splits the children at the first direct child tag named `separator`.
    pub fn split_children(&self, separator: &str) -> (&[Node], &[Node]) {
        match self.children.iter().position(|n| n.tag_name() == Some(separator)) {
            Some(at) => (&self.children[..at], &self.children[at + 1..]),
            None => (&self.children, &[]),
        }
    }
}

/// The top of a parsed template.
#[derive(Debug, Clone, Default)]
pub struct Root {
    pub children: Vec<Node>,
}

impl Root {
    pub fn emit(&self, unit: &mut CodeUnitBuilder) -> Result<Vec<Instruction>, CompileError> {
        emit_all(&self.children, unit)
    }
}
