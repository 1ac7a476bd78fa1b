//! The code unit: the compiler's output artifact, and the builder that fills it.

use crate::error::CodeUnitError;
use crate::instruction::{Instruction, write_block};
use std::collections::BTreeSet;
use std::fmt;
use vellum_expr::{Helper, HelperSet};

/// Accumulates helper routine definitions while a node tree is emitted.
///
/// Helpers are deduplicated by name: registering a name twice is a no-op.
#[derive(Debug, Default)]
pub struct CodeUnitBuilder {
    name: Option<String>,
    helpers: HelperSet,
}

impl CodeUnitBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder whose unit will carry `name` (usually the view name) in listings.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            helpers: HelperSet::new(),
        }
    }

    /// Registers a helper routine. Returns `true` only the first time a name is seen.
    pub fn register_helper(&mut self, helper: Helper) -> bool {
        let inserted = self.helpers.register(helper);
        if inserted {
            log::trace!("Registered helper '{}'", helper.name);
        }
        inserted
    }

    pub fn has_helper(&self, name: &str) -> bool {
        self.helpers.contains(name)
    }

    pub fn helpers(&self) -> &HelperSet {
        &self.helpers
    }

    /// Finalizes the unit with its render body.
    ///
    /// Fails if the body calls a helper that was never registered, so a unit that
    /// exists is always executable.
    pub fn finish(self, body: Vec<Instruction>) -> Result<CodeUnit, CodeUnitError> {
        let mut called = BTreeSet::new();
        for instruction in &body {
            instruction.visit_expressions(&mut |expr| {
                expr.visit_calls(&mut |name| {
                    called.insert(name.to_string());
                })
            });
        }
        if let Some(name) = called.into_iter().find(|n| !self.helpers.contains(n)) {
            return Err(CodeUnitError::UndefinedHelper { name });
        }

        log::debug!(
            "Finalized code unit {:?}: {} helper(s), {} top-level instruction(s)",
            self.name,
            self.helpers.len(),
            body.len()
        );
        Ok(CodeUnit {
            name: self.name,
            helpers: self.helpers,
            body,
        })
    }
}

/// A finalized, immutable compiled template.
///
/// It holds no interior mutability and is safe to share across renders (`Arc<CodeUnit>`).
#[derive(Debug, Clone)]
pub struct CodeUnit {
    name: Option<String>,
    helpers: HelperSet,
    body: Vec<Instruction>,
}

impl CodeUnit {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn helpers(&self) -> &HelperSet {
        &self.helpers
    }

    pub fn body(&self) -> &[Instruction] {
        &self.body
    }
}

impl fmt::Display for CodeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            writeln!(f, "// unit {}", name)?;
        }
        for helper in self.helpers.iter() {
            writeln!(f, "{}", helper)?;
        }
        if !self.helpers.is_empty() {
            writeln!(f)?;
        }
        writeln!(f, "render {{")?;
        write_block(f, &self.body, 1)?;
        writeln!(f, "}}")
    }
}
