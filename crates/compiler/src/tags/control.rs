//! Conditional and looping tags.

use crate::error::{CompileError, TemplateSyntaxError};
use crate::node::{BlockNode, emit_all};
use crate::tag::{Tag, TagArguments, TagKind, invalid, parse_argument_expression};
use vellum_expr::is_identifier;
use vellum_template_core::{CodeUnitBuilder, Instruction, Location};

/// Reserved for the loop metadata object inside `for` bodies.
pub const LOOP_VARIABLE: &str = "loop";

fn reject_second_else(node: &BlockNode) -> Result<(), TemplateSyntaxError> {
    let mut elses = node.children.iter().filter(|n| n.tag_name() == Some(ElseTag::NAME));
    elses.next();
    match elses.next() {
        Some(_) => Err(invalid(
            node.tag.name(),
            "a block may contain at most one 'else'",
            node.location,
        )),
        None => Ok(()),
    }
}

/// `{% if expr %} ... {% else %} ... {% endif %}`
#[derive(Debug, Clone, Copy, Default)]
pub struct IfTag;

impl Tag for IfTag {
    fn name(&self) -> &str {
        "if"
    }

    fn kind(&self) -> TagKind {
        TagKind::Block
    }

    fn open(&self, arguments: &str, location: Location) -> Result<TagArguments, TemplateSyntaxError> {
        let mut parsed = TagArguments::new(arguments);
        parsed
            .expressions
            .push(parse_argument_expression(self.name(), arguments, location)?);
        Ok(parsed)
    }

    fn close(&self, node: &mut BlockNode) -> Result<(), TemplateSyntaxError> {
        reject_second_else(node)
    }

    fn emit(&self, node: &BlockNode, unit: &mut CodeUnitBuilder) -> Result<Vec<Instruction>, CompileError> {
        let test = node.arguments.expression(0, self.name(), node.location)?.clone();
        let (then, otherwise) = node.split_children(ElseTag::NAME);
        Ok(vec![Instruction::Branch {
            test,
            then: emit_all(then, unit)?,
            otherwise: emit_all(otherwise, unit)?,
        }])
    }
}

/// `{% else %}`: splits an `if` or `for` body. Emits nothing itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElseTag;

impl ElseTag {
    pub const NAME: &'static str = "else";
}

impl Tag for ElseTag {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn kind(&self) -> TagKind {
        TagKind::Standalone
    }

    fn enclosing(&self) -> &[&'static str] {
        &["if", "for"]
    }

    fn open(&self, arguments: &str, location: Location) -> Result<TagArguments, TemplateSyntaxError> {
        if !arguments.trim().is_empty() {
            return Err(invalid(self.name(), "takes no arguments", location));
        }
        Ok(TagArguments::new(arguments))
    }

    fn emit(&self, _node: &BlockNode, _unit: &mut CodeUnitBuilder) -> Result<Vec<Instruction>, CompileError> {
        Ok(Vec::new())
    }
}

/// `{% for item in items %} ... {% else %} ... {% endfor %}`
///
/// The `else` branch runs when the sequence is empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForTag;

impl Tag for ForTag {
    fn name(&self) -> &str {
        "for"
    }

    fn kind(&self) -> TagKind {
        TagKind::Block
    }

    fn open(&self, arguments: &str, location: Location) -> Result<TagArguments, TemplateSyntaxError> {
        let text = arguments.trim();
        let (binding, rest) = text.split_once(char::is_whitespace).unwrap_or((text, ""));
        let rest = rest.trim_start();
        let (keyword, source) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));

        if !is_identifier(binding) {
            return Err(invalid(self.name(), format!("'{}' is not a variable name", binding), location));
        }
        if binding == LOOP_VARIABLE {
            return Err(invalid(self.name(), "'loop' is reserved for loop metadata", location));
        }
        if keyword != "in" {
            return Err(invalid(self.name(), "expected '<name> in <expression>'", location));
        }

        let mut parsed = TagArguments::new(arguments);
        parsed.names.push(binding.to_string());
        parsed
            .expressions
            .push(parse_argument_expression(self.name(), source, location)?);
        Ok(parsed)
    }

    fn close(&self, node: &mut BlockNode) -> Result<(), TemplateSyntaxError> {
        reject_second_else(node)
    }

    fn emit(&self, node: &BlockNode, unit: &mut CodeUnitBuilder) -> Result<Vec<Instruction>, CompileError> {
        let binding = node.arguments.name(0, self.name(), node.location)?.to_string();
        let source = node.arguments.expression(0, self.name(), node.location)?.clone();
        let (body, empty) = node.split_children(ElseTag::NAME);
        Ok(vec![Instruction::Iterate {
            binding,
            source,
            body: emit_all(body, unit)?,
            empty: emit_all(empty, unit)?,
        }])
    }
}
