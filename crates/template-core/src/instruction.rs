//! The instruction set emitted by the node tree: the generated code of a template.

use std::fmt;
use vellum_expr::Expression;

/// One statement of a code unit's render body.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Write literal text.
    Text(String),
    /// Evaluate an expression and write it, escaped unless `escape` is false.
    Output { expression: Expression, escape: bool },
    Branch {
        test: Expression,
        then: Vec<Instruction>,
        otherwise: Vec<Instruction>,
    },
    /// Run `body` once per element of `source` with `binding` set; run `empty`
    /// instead when there are no elements.
    Iterate {
        binding: String,
        source: Expression,
        body: Vec<Instruction>,
        empty: Vec<Instruction>,
    },
    /// Write a variable into the top frame of the context stack.
    Assign { name: String, value: Expression },
    /// Render another view in place. `locals` must evaluate to an object.
    Include {
        view: String,
        locals: Option<Expression>,
    },
}

impl Instruction {
    /// Visits every expression in this instruction and its nested bodies.
    pub fn visit_expressions<'a>(&'a self, visit: &mut dyn FnMut(&'a Expression)) {
        match self {
            Instruction::Text(_) => {}
            Instruction::Output { expression, .. } => visit(expression),
            Instruction::Branch { test, then, otherwise } => {
                visit(test);
                for instruction in then.iter().chain(otherwise) {
                    instruction.visit_expressions(visit);
                }
            }
            Instruction::Iterate { source, body, empty, .. } => {
                visit(source);
                for instruction in body.iter().chain(empty) {
                    instruction.visit_expressions(visit);
                }
            }
            Instruction::Assign { value, .. } => visit(value),
            Instruction::Include { locals, .. } => {
                if let Some(locals) = locals {
                    visit(locals);
                }
            }
        }
    }
}

// --- Listing ---

const INDENT: &str = "    ";

pub(crate) fn write_block(
    f: &mut fmt::Formatter<'_>,
    instructions: &[Instruction],
    depth: usize,
) -> fmt::Result {
    for instruction in instructions {
        write_instruction(f, instruction, depth)?;
    }
    Ok(())
}

fn write_instruction(f: &mut fmt::Formatter<'_>, instruction: &Instruction, depth: usize) -> fmt::Result {
    let pad = INDENT.repeat(depth);
    match instruction {
        Instruction::Text(text) => writeln!(f, "{}text {:?}", pad, text),
        Instruction::Output { expression, escape: true } => {
            writeln!(f, "{}output escape({})", pad, expression)
        }
        Instruction::Output { expression, escape: false } => {
            writeln!(f, "{}output {}", pad, expression)
        }
        Instruction::Branch { test, then, otherwise } => {
            writeln!(f, "{}if {} {{", pad, test)?;
            write_block(f, then, depth + 1)?;
            if !otherwise.is_empty() {
                writeln!(f, "{}}} else {{", pad)?;
                write_block(f, otherwise, depth + 1)?;
            }
            writeln!(f, "{}}}", pad)
        }
        Instruction::Iterate { binding, source, body, empty } => {
            writeln!(f, "{}for {} in {} {{", pad, binding, source)?;
            write_block(f, body, depth + 1)?;
            if !empty.is_empty() {
                writeln!(f, "{}}} empty {{", pad)?;
                write_block(f, empty, depth + 1)?;
            }
            writeln!(f, "{}}}", pad)
        }
        Instruction::Assign { name, value } => writeln!(f, "{}set {} = {}", pad, name, value),
        Instruction::Include { view, locals: Some(locals) } => {
            writeln!(f, "{}include {:?} with {}", pad, view, locals)
        }
        Instruction::Include { view, locals: None } => writeln!(f, "{}include {:?}", pad, view),
    }
}
