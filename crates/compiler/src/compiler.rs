use crate::error::{CompileError, TemplateSyntaxError};
use crate::lexer::{Syntax, tokenize_with};
use crate::node::Root;
use crate::parser::Parser;
use crate::vocabulary::Vocabulary;
use std::sync::Arc;
use vellum_template_core::{CodeUnit, CodeUnitBuilder};

/// Compiles template source into code units.
///
/// A compiler is immutable once built and can be shared between threads.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    vocabulary: Arc<Vocabulary>,
    syntax: Syntax,
}

impl Compiler {
    pub fn new(vocabulary: Arc<Vocabulary>) -> Self {
        Self {
            vocabulary,
            syntax: Syntax::default(),
        }
    }

    pub fn with_syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = syntax;
        self
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn syntax(&self) -> &Syntax {
        &self.syntax
    }

    /// Tokenizes and parses `source` into a node tree.
    pub fn parse(&self, source: &str) -> Result<Root, TemplateSyntaxError> {
        let tokens = tokenize_with(source, &self.syntax)?;
        Parser::new(source, &self.vocabulary).parse(tokens)
    }

    /// Compiles `source` into a finalized code unit. `name` only labels the unit.
    pub fn compile(&self, source: &str, name: Option<&str>) -> Result<CodeUnit, CompileError> {
        let root = self.parse(source)?;
        let mut unit = match name {
            Some(name) => CodeUnitBuilder::named(name),
            None => CodeUnitBuilder::new(),
        };
        let body = root.emit(&mut unit)?;
        let unit = unit.finish(body)?;
        log::debug!(
            "Compiled {} ({} bytes)",
            name.unwrap_or("<anonymous>"),
            source.len()
        );
        Ok(unit)
    }
}

/// Compiles `source` with the built-in vocabulary and default delimiters.
pub fn compile(source: &str) -> Result<CodeUnit, CompileError> {
    Compiler::default().compile(source, None)
}
