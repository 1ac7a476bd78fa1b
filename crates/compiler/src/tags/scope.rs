use crate::error::{CompileError, TemplateSyntaxError};
use crate::node::BlockNode;
use crate::tag::{Tag, TagArguments, TagKind, invalid, parse_argument_expression};
use vellum_expr::is_identifier;
use vellum_template_core::{CodeUnitBuilder, Instruction, Location};

/// `{% set name = expr %}`: writes into the current context frame.
///
/// Lookups try loop bindings and page locals before the context stack, so
/// a `set` whose name matches one of those stays hidden until the loop or
/// view that binds it ends.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetTag;

impl Tag for SetTag {
    fn name(&self) -> &str {
        "set"
    }

    fn kind(&self) -> TagKind {
        TagKind::Standalone
    }

    fn open(&self, arguments: &str, location: Location) -> Result<TagArguments, TemplateSyntaxError> {
        let Some((name, value)) = arguments.split_once('=') else {
            return Err(invalid(self.name(), "expected '<name> = <expression>'", location));
        };
        let name = name.trim();
        if !is_identifier(name) {
            return Err(invalid(self.name(), format!("'{}' is not a variable name", name), location));
        }

        let mut parsed = TagArguments::new(arguments);
        parsed.names.push(name.to_string());
        parsed
            .expressions
            .push(parse_argument_expression(self.name(), value, location)?);
        Ok(parsed)
    }

    fn emit(&self, node: &BlockNode, _unit: &mut CodeUnitBuilder) -> Result<Vec<Instruction>, CompileError> {
        Ok(vec![Instruction::Assign {
            name: node.arguments.name(0, self.name(), node.location)?.to_string(),
            value: node.arguments.expression(0, self.name(), node.location)?.clone(),
        }])
    }
}

/// `{% include 'view/name' with expr %}`: renders another view in place.
///
/// The `with` expression must evaluate to an object at render time; its keys
/// become page locals of the included view.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncludeTag;

impl Tag for IncludeTag {
    fn name(&self) -> &str {
        "include"
    }

    fn kind(&self) -> TagKind {
        TagKind::Standalone
    }

    fn open(&self, arguments: &str, location: Location) -> Result<TagArguments, TemplateSyntaxError> {
        let text = arguments.trim();
        let quote = match text.chars().next() {
            Some(q @ ('\'' | '"')) => q,
            _ => return Err(invalid(self.name(), "expected a quoted view name", location)),
        };
        let Some(end) = text[1..].find(quote).map(|i| i + 1) else {
            return Err(invalid(self.name(), "unterminated view name", location));
        };
        let view = &text[1..end];
        if view.trim().is_empty() {
            return Err(invalid(self.name(), "view name is empty", location));
        }

        let mut parsed = TagArguments::new(arguments);
        parsed.literals.push(view.to_string());

        let rest = text[end + 1..].trim();
        if !rest.is_empty() {
            let Some(locals) = rest.strip_prefix("with").filter(|r| r.starts_with(char::is_whitespace)) else {
                return Err(invalid(self.name(), format!("unexpected '{}' after view name", rest), location));
            };
            parsed
                .expressions
                .push(parse_argument_expression(self.name(), locals, location)?);
        }
        Ok(parsed)
    }

    fn emit(&self, node: &BlockNode, _unit: &mut CodeUnitBuilder) -> Result<Vec<Instruction>, CompileError> {
        Ok(vec![Instruction::Include {
            view: node.arguments.literal(0, self.name(), node.location)?.to_string(),
            locals: node.arguments.expressions.first().cloned(),
        }])
    }
}
