//! Splits template source into text, expression and tag tokens.
//!
//! The lexer only finds the structure of the template. It does not check filter
//! or tag names; that is the parser's job once the vocabulary is known.

use crate::error::TemplateSyntaxError;
use std::ops::Range;
use vellum_template_core::Location;

/// The delimiters that mark expressions, tags and comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Syntax {
    pub expression_open: String,
    pub expression_close: String,
    pub tag_open: String,
    pub tag_close: String,
    pub comment_open: String,
    pub comment_close: String,
}

impl Default for Syntax {
    fn default() -> Self {
        Self {
            expression_open: "{{".into(),
            expression_close: "}}".into(),
            tag_open: "{%".into(),
            tag_close: "%}".into(),
            comment_open: "{#".into(),
            comment_close: "#}".into(),
        }
    }
}

/// How a tag token relates to the block structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagRole {
    Open,
    /// `end<name>`. The parser reads it as a tag of the full name when one is
    /// registered and `<name>` is not the innermost open block.
    Close,
    /// Marked self-closing with a trailing `/` before the closing delimiter.
    Standalone,
}

/// One `name:arg1,arg2` entry of an expression's filter chain, unresolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterInvocation {
    pub name: String,
    pub arguments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Text(String),
    Expression {
        expression: String,
        filters: Vec<FilterInvocation>,
    },
    Tag {
        name: String,
        arguments: String,
        role: TagRole,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte range in the source, delimiters included.
    pub span: Range<usize>,
}

/// Tokenizes `source` with the default delimiters.
pub fn tokenize(source: &str) -> Result<Vec<Token>, TemplateSyntaxError> {
    tokenize_with(source, &Syntax::default())
}

/// Tokenizes `source`. Tokens come out in source order; their spans, plus any
/// comments that were dropped, cover the source without gaps.
pub fn tokenize_with(source: &str, syntax: &Syntax) -> Result<Vec<Token>, TemplateSyntaxError> {
    let mut lexer = Lexer {
        source,
        syntax,
        position: 0,
        tokens: Vec::new(),
    };
    lexer.run()?;
    log::trace!("Tokenized {} bytes into {} token(s)", source.len(), lexer.tokens.len());
    Ok(lexer.tokens)
}

// --- Lexer state ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Construct {
    Expression,
    Tag,
    Comment,
}

impl Construct {
    fn describe(self) -> &'static str {
        match self {
            Construct::Expression => "expression",
            Construct::Tag => "tag",
            Construct::Comment => "comment",
        }
    }
}

struct Lexer<'a> {
    source: &'a str,
    syntax: &'a Syntax,
    position: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn run(&mut self) -> Result<(), TemplateSyntaxError> {
        while self.position < self.source.len() {
            let Some((start, construct)) = self.next_opening() else {
                self.push_text(self.source.len());
                break;
            };
            self.push_text(start);
            self.position = start;
            self.lex_construct(construct)?;
        }
        Ok(())
    }

    /// Finds the nearest opening delimiter at or after the current position.
    /// On a tie the longer delimiter wins.
    fn next_opening(&self) -> Option<(usize, Construct)> {
        let rest = &self.source[self.position..];
        [
            (self.syntax.expression_open.as_str(), Construct::Expression),
            (self.syntax.tag_open.as_str(), Construct::Tag),
            (self.syntax.comment_open.as_str(), Construct::Comment),
        ]
        .into_iter()
        .filter(|(open, _)| !open.is_empty())
        .filter_map(|(open, construct)| rest.find(open).map(|at| (at, open.len(), construct)))
        .min_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)))
        .map(|(at, _, construct)| (self.position + at, construct))
    }

    fn push_text(&mut self, end: usize) {
        if end > self.position {
            self.tokens.push(Token {
                kind: TokenKind::Text(self.source[self.position..end].to_string()),
                span: self.position..end,
            });
        }
        self.position = end;
    }

    fn lex_construct(&mut self, construct: Construct) -> Result<(), TemplateSyntaxError> {
        let start = self.position;
        let (open, close) = match construct {
            Construct::Expression => (&self.syntax.expression_open, &self.syntax.expression_close),
            Construct::Tag => (&self.syntax.tag_open, &self.syntax.tag_close),
            Construct::Comment => (&self.syntax.comment_open, &self.syntax.comment_close),
        };
        let body_start = start + open.len();
        let quoted = construct != Construct::Comment;
        let body_end = find_close(self.source, body_start, close, quoted).ok_or_else(|| {
            TemplateSyntaxError::Unterminated {
                what: construct.describe(),
                location: self.locate(start),
            }
        })?;
        let end = body_end + close.len();
        let body = &self.source[body_start..body_end];

        let kind = match construct {
            Construct::Comment => None,
            Construct::Expression => Some(self.expression_token(body, start)?),
            Construct::Tag => Some(self.tag_token(body, start)?),
        };
        if let Some(kind) = kind {
            self.tokens.push(Token { kind, span: start..end });
        }
        self.position = end;
        Ok(())
    }

    fn expression_token(&self, body: &str, start: usize) -> Result<TokenKind, TemplateSyntaxError> {
        let mut parts = split_top_level(body, '|').into_iter();
        let expression = parts.next().unwrap_or_default().trim();
        if expression.is_empty() {
            return Err(TemplateSyntaxError::EmptyExpression { location: self.locate(start) });
        }

        let mut filters = Vec::new();
        for part in parts {
            let part = part.trim();
            let (name, raw_arguments) = match find_top_level(part, ':') {
                Some(at) => (part[..at].trim(), Some(&part[at + 1..])),
                None => (part, None),
            };
            if name.is_empty() {
                return Err(TemplateSyntaxError::InvalidExpression {
                    expression: body.trim().to_string(),
                    message: "filter name is missing".into(),
                    location: self.locate(start),
                });
            }
            let arguments = match raw_arguments {
                Some(raw) => split_top_level(raw, ',')
                    .into_iter()
                    .map(|arg| arg.trim().to_string())
                    .collect(),
                None => Vec::new(),
            };
            filters.push(FilterInvocation { name: name.to_string(), arguments });
        }

        Ok(TokenKind::Expression {
            expression: expression.to_string(),
            filters,
        })
    }

    fn tag_token(&self, body: &str, start: usize) -> Result<TokenKind, TemplateSyntaxError> {
        let mut content = body.trim();
        let mut self_closing = false;
        if let Some(stripped) = content.strip_suffix('/') {
            content = stripped.trim_end();
            self_closing = true;
        }

        let (name, arguments) = match content.find(char::is_whitespace) {
            Some(at) => (&content[..at], content[at..].trim()),
            None => (content, ""),
        };
        if name.is_empty() {
            return Err(TemplateSyntaxError::EmptyTag { location: self.locate(start) });
        }

        let (name, role) = match name.strip_prefix("end") {
            Some(closed) if !closed.is_empty() && !self_closing => (closed, TagRole::Close),
            _ if self_closing => (name, TagRole::Standalone),
            _ => (name, TagRole::Open),
        };
        Ok(TokenKind::Tag {
            name: name.to_string(),
            arguments: arguments.to_string(),
            role,
        })
    }

    fn locate(&self, offset: usize) -> Location {
        Location::locate(self.source, offset)
    }
}

// --- Scanning utilities ---

/// Returns the offset of the first `close` at or after `from`, skipping over
/// quoted strings when `quoted` is set.
fn find_close(source: &str, from: usize, close: &str, quoted: bool) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in source[from..].char_indices() {
        let at = from + i;
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if quoted && (c == '\'' || c == '"') => quote = Some(c),
            None if source[at..].starts_with(close) => return Some(at),
            None => {}
        }
    }
    None
}

/// Byte offset of the first `separator` outside quotes and parentheses.
fn find_top_level(text: &str, separator: char) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (i, c) in text.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '(' | '[') => depth += 1,
            (None, ')' | ']') => depth = depth.saturating_sub(1),
            (None, c) if c == separator && depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

/// Splits at every top-level `separator`.
pub(crate) fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = text;
    while let Some(at) = find_top_level(rest, separator) {
        parts.push(&rest[..at]);
        rest = &rest[at + separator.len_utf8()..];
    }
    parts.push(rest);
    parts
}
