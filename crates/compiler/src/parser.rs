//! Builds the node tree from tokens, resolving filter and tag names.

use crate::error::TemplateSyntaxError;
use crate::filter::Escape;
use crate::lexer::{FilterInvocation, TagRole, Token, TokenKind};
use crate::node::{AppliedFilter, BlockNode, ExpressionNode, Node, Root, TextNode};
use crate::tag::TagKind;
use crate::vocabulary::Vocabulary;
use vellum_expr::parse_expression;
use vellum_template_core::Location;

pub struct Parser<'a> {
    source: &'a str,
    vocabulary: &'a Vocabulary,
    /// Blocks opened but not yet closed, innermost last.
    block_stack: Vec<BlockNode>,
    /// One child list per open block, plus the root's at the bottom.
    children_stack: Vec<Vec<Node>>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, vocabulary: &'a Vocabulary) -> Self {
        Self {
            source,
            vocabulary,
            block_stack: Vec::new(),
            children_stack: vec![Vec::new()],
        }
    }

    pub fn parse(mut self, tokens: Vec<Token>) -> Result<Root, TemplateSyntaxError> {
        for token in tokens {
            let location = Location::locate(self.source, token.span.start);
            match token.kind {
                TokenKind::Text(text) => self.push_child(Node::Text(TextNode { text })),
                TokenKind::Expression { expression, filters } => {
                    let node = self.expression_node(&expression, filters, location)?;
                    self.push_child(Node::Expression(node));
                }
                TokenKind::Tag { name, arguments, role: TagRole::Close } => {
                    match self.end_prefixed_tag(&name) {
                        Some(full_name) => self.open_tag(&full_name, &arguments, TagRole::Open, location)?,
                        None => self.close_block(&name, &arguments, location)?,
                    }
                }
                TokenKind::Tag { name, arguments, role } => {
                    self.open_tag(&name, &arguments, role, location)?;
                }
            }
        }

        if let Some(unclosed) = self.block_stack.pop() {
            return Err(TemplateSyntaxError::UnclosedBlock {
                name: unclosed.tag.name().to_string(),
                location: unclosed.location,
            });
        }
        let children = self.children_stack.pop().unwrap_or_default();
        Ok(Root { children })
    }

    fn push_child(&mut self, node: Node) {
        if let Some(children) = self.children_stack.last_mut() {
            children.push(node);
        }
    }

    fn expression_node(
        &self,
        expression: &str,
        invocations: Vec<FilterInvocation>,
        location: Location,
    ) -> Result<ExpressionNode, TemplateSyntaxError> {
        let parsed = parse_expression(expression)
            .map_err(|e| TemplateSyntaxError::from_expr(e, expression, location))?;

        let mut filters = Vec::with_capacity(invocations.len());
        for invocation in invocations {
            let filter = self.vocabulary.filter(&invocation.name).ok_or_else(|| {
                TemplateSyntaxError::UnknownFilter {
                    name: invocation.name.clone(),
                    location,
                }
            })?;

            let arity = filter.arity();
            if !arity.contains(&invocation.arguments.len()) {
                return Err(TemplateSyntaxError::InvalidArguments {
                    name: invocation.name,
                    message: format!(
                        "expected {} argument(s), got {}",
                        describe_arity(arity.start(), arity.end()),
                        invocation.arguments.len()
                    ),
                    location,
                });
            }
            for argument in &invocation.arguments {
                parse_expression(argument)
                    .map_err(|e| TemplateSyntaxError::from_expr(e, argument, location))?;
            }

            filters.push(AppliedFilter {
                filter,
                arguments: invocation.arguments,
            });
        }

        Ok(ExpressionNode {
            expression: parsed,
            filters,
            escape: Escape::default(),
            location,
        })
    }

    fn open_tag(
        &mut self,
        name: &str,
        arguments: &str,
        role: TagRole,
        location: Location,
    ) -> Result<(), TemplateSyntaxError> {
        let tag = self
            .vocabulary
            .tag(name)
            .ok_or_else(|| TemplateSyntaxError::UnknownTag {
                name: name.to_string(),
                location,
            })?;

        let allowed = tag.enclosing();
        if !allowed.is_empty() {
            let parent = self.block_stack.last().map(|b| b.tag.name());
            if !parent.is_some_and(|p| allowed.contains(&p)) {
                return Err(TemplateSyntaxError::MisplacedTag {
                    name: name.to_string(),
                    allowed: allowed.iter().map(|s| s.to_string()).collect(),
                    location,
                });
            }
        }

        let parsed = tag.open(arguments, location)?;
        let kind = tag.kind();
        let node = BlockNode {
            tag,
            arguments: parsed,
            children: Vec::new(),
            location,
        };

        match (kind, role) {
            (TagKind::Block, TagRole::Standalone) => Err(TemplateSyntaxError::InvalidArguments {
                name: name.to_string(),
                message: "block tags cannot be self-closing".into(),
                location,
            }),
            (TagKind::Block, _) => {
                log::trace!("Opened block '{}' at {}", name, location);
                self.block_stack.push(node);
                self.children_stack.push(Vec::new());
                Ok(())
            }
            (TagKind::Standalone, _) => {
                self.push_child(Node::Block(node));
                Ok(())
            }
        }
    }

    /// `end<name>` is a close tag unless a tag is registered under the full
    /// name and the innermost open block is not `<name>`.
    fn end_prefixed_tag(&self, name: &str) -> Option<String> {
        let closes_innermost = self.block_stack.last().is_some_and(|block| block.tag.name() == name);
        let full_name = format!("end{}", name);
        (!closes_innermost && self.vocabulary.tag(&full_name).is_some()).then_some(full_name)
    }

    fn close_block(&mut self, name: &str, arguments: &str, location: Location) -> Result<(), TemplateSyntaxError> {
        let Some(mut block) = self.block_stack.pop() else {
            return Err(TemplateSyntaxError::UnexpectedClose {
                name: name.to_string(),
                location,
            });
        };
        if block.tag.name() != name {
            return Err(TemplateSyntaxError::MismatchedClose {
                expected: block.tag.name().to_string(),
                found: name.to_string(),
                location,
            });
        }
        if !arguments.is_empty() {
            return Err(TemplateSyntaxError::InvalidArguments {
                name: format!("end{}", name),
                message: "closing tags take no arguments".into(),
                location,
            });
        }

        block.children = self.children_stack.pop().unwrap_or_default();
        let tag = block.tag.clone();
        tag.close(&mut block)?;
        self.push_child(Node::Block(block));
        Ok(())
    }
}

fn describe_arity(min: &usize, max: &usize) -> String {
    if min == max {
        min.to_string()
    } else {
        format!("{} to {}", min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse(source: &str) -> Result<Root, TemplateSyntaxError> {
        let vocabulary = Vocabulary::default();
        Parser::new(source, &vocabulary).parse(tokenize(source)?)
    }

    #[test]
    fn nests_blocks() {
        let root = parse("a{% if x %}b{% for i in xs %}{{ i }}{% endfor %}{% endif %}c").unwrap();
        assert_eq!(root.children.len(), 3);
        let Node::Block(outer) = &root.children[1] else { panic!("expected block") };
        assert_eq!(outer.tag.name(), "if");
        assert_eq!(outer.children.len(), 2);
        assert_eq!(outer.children[1].tag_name(), Some("for"));
    }

    #[test]
    fn unknown_filter_is_reported_with_location() {
        let err = parse("ok\n{{ name | shout }}").unwrap_err();
        assert_eq!(
            err,
            TemplateSyntaxError::UnknownFilter {
                name: "shout".into(),
                location: Location { offset: 3, line: 2, col: 1 },
            }
        );
    }

    #[test]
    fn filter_arity_is_checked() {
        assert!(matches!(
            parse("{{ x | default }}"),
            Err(TemplateSyntaxError::InvalidArguments { .. })
        ));
        assert!(matches!(
            parse("{{ x | upper:1 }}"),
            Err(TemplateSyntaxError::InvalidArguments { .. })
        ));
    }

    #[test]
    fn mismatched_close() {
        let err = parse("{% if a %}{% for x in y %}{% endif %}").unwrap_err();
        assert!(matches!(
            err,
            TemplateSyntaxError::MismatchedClose { ref expected, ref found, .. }
                if expected == "for" && found == "if"
        ));
    }

    #[test]
    fn stray_close_and_unclosed_block() {
        assert!(matches!(parse("{% endif %}"), Err(TemplateSyntaxError::UnexpectedClose { .. })));
        let err = parse("x{% if a %}").unwrap_err();
        assert_eq!(err.location().offset, 1);
        assert!(matches!(err, TemplateSyntaxError::UnclosedBlock { .. }));
    }

    #[test]
    fn else_must_be_inside_if_or_for() {
        assert!(matches!(parse("{% else %}"), Err(TemplateSyntaxError::MisplacedTag { .. })));
        assert!(parse("{% for x in xs %}{{ x }}{% else %}none{% endfor %}").is_ok());
    }

    #[test]
    fn only_one_else_per_block() {
        assert!(matches!(
            parse("{% if a %}1{% else %}2{% else %}3{% endif %}"),
            Err(TemplateSyntaxError::InvalidArguments { .. })
        ));
    }

    #[test]
    fn unknown_tag_and_bad_arguments() {
        assert!(matches!(parse("{% macro x %}"), Err(TemplateSyntaxError::UnknownTag { .. })));
        assert!(matches!(
            parse("{% for x of xs %}{% endfor %}"),
            Err(TemplateSyntaxError::InvalidArguments { .. })
        ));
        assert!(matches!(
            parse("{% include row %}"),
            Err(TemplateSyntaxError::InvalidArguments { .. })
        ));
        assert!(matches!(parse("{% if %}{% endif %}"), Err(TemplateSyntaxError::InvalidArguments { .. })));
    }

    #[test]
    fn block_tags_cannot_self_close() {
        assert!(matches!(parse("{% if a /%}"), Err(TemplateSyntaxError::InvalidArguments { .. })));
    }

    #[test]
    fn invalid_expression_carries_source() {
        let err = parse("{{ a == }}").unwrap_err();
        assert!(matches!(err, TemplateSyntaxError::InvalidExpression { ref expression, .. } if expression == "a =="));
    }
}
