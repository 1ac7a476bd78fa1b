//! Executes a code unit's instructions against a render environment.

use crate::context::ContextStack;
use crate::env::RenderEnv;
use crate::error::RenderError;
use serde_json::{Map, Value, json};
use vellum_expr::{
    EvaluationContext, Expression, VariableSource, evaluate, is_truthy, to_output_string,
};
use vellum_template_core::{CodeUnit, EscapeMode, Instruction};

pub type Locals = Map<String, Value>;

/// Variables visible to one expression: page locals and loop frames first,
/// innermost first, then the context stack.
struct RenderScope<'a> {
    locals: &'a [Locals],
    context: &'a ContextStack,
}

impl VariableSource for RenderScope<'_> {
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.locals
            .iter()
            .rev()
            .find_map(|frame| frame.get(name))
            .or_else(|| self.context.lookup(name))
    }
}

/// Renders one code unit.
///
/// The executor holds no render state of its own. Everything mutable lives in
/// the environment's context stack or in the per-call local frames.
#[derive(Debug, Clone, Copy)]
pub struct Executor<'u> {
    unit: &'u CodeUnit,
    escape: EscapeMode,
}

impl<'u> Executor<'u> {
    pub fn new(unit: &'u CodeUnit) -> Self {
        Self {
            unit,
            escape: EscapeMode::default(),
        }
    }

    pub fn with_escape(mut self, escape: EscapeMode) -> Self {
        self.escape = escape;
        self
    }

    pub fn render<E: RenderEnv>(&self, env: &mut E, locals: Locals) -> Result<String, E::Error> {
        let mut out = String::new();
        self.render_into(env, locals, &mut out)?;
        Ok(out)
    }

    /// Appends the rendered output to `out`. `locals` are page-scoped and never
    /// touch the context stack.
    pub fn render_into<E: RenderEnv>(
        &self,
        env: &mut E,
        locals: Locals,
        out: &mut String,
    ) -> Result<(), E::Error> {
        log::debug!(
            "Rendering {} with {} page local(s)",
            self.unit.name().unwrap_or("<anonymous>"),
            locals.len()
        );
        let mut frames = vec![locals];
        self.run(self.unit.body(), env, &mut frames, out)
    }

    fn run<E: RenderEnv>(
        &self,
        instructions: &[Instruction],
        env: &mut E,
        frames: &mut Vec<Locals>,
        out: &mut String,
    ) -> Result<(), E::Error> {
        for instruction in instructions {
            self.step(instruction, env, frames, out)?;
        }
        Ok(())
    }

    fn step<E: RenderEnv>(
        &self,
        instruction: &Instruction,
        env: &mut E,
        frames: &mut Vec<Locals>,
        out: &mut String,
    ) -> Result<(), E::Error> {
        match instruction {
            Instruction::Text(text) => out.push_str(text),
            Instruction::Output { expression, escape } => {
                let text = to_output_string(&self.eval(expression, env, frames)?);
                if *escape {
                    out.push_str(&self.escape.apply(&text));
                } else {
                    out.push_str(&text);
                }
            }
            Instruction::Branch { test, then, otherwise } => {
                let branch = if is_truthy(&self.eval(test, env, frames)?) {
                    then
                } else {
                    otherwise
                };
                self.run(branch, env, frames, out)?;
            }
            Instruction::Iterate { binding, source, body, empty } => {
                let items = iteration_items(binding, self.eval(source, env, frames)?)?;
                if items.is_empty() {
                    return self.run(empty, env, frames, out);
                }
                let length = items.len();
                for (index, (key, item)) in items.into_iter().enumerate() {
                    let mut meta = json!({
                        "index": index + 1,
                        "index0": index,
                        "first": index == 0,
                        "last": index + 1 == length,
                        "length": length,
                    });
                    if let (Some(key), Value::Object(map)) = (key, &mut meta) {
                        map.insert("key".into(), Value::String(key));
                    }
                    let mut frame = Locals::new();
                    frame.insert(binding.clone(), item);
                    frame.insert("loop".into(), meta);

                    frames.push(frame);
                    let result = self.run(body, env, frames, out);
                    frames.pop();
                    result?;
                }
            }
            Instruction::Assign { name, value } => {
                let value = self.eval(value, env, frames)?;
                log::trace!("set {} in context frame {}", name, env.context().depth());
                env.context_mut().set(name.clone(), value);
            }
            Instruction::Include { view, locals } => {
                let locals = match locals {
                    None => Locals::new(),
                    Some(expression) => match self.eval(expression, env, frames)? {
                        Value::Object(map) => map,
                        other => {
                            return Err(RenderError::InvalidLocals {
                                view: view.clone(),
                                found: describe(&other),
                            }
                            .into());
                        }
                    },
                };
                log::trace!("include {}", view);
                env.include(view, locals, out)?;
            }
        }
        Ok(())
    }

    fn eval<E: RenderEnv>(
        &self,
        expression: &Expression,
        env: &E,
        frames: &[Locals],
    ) -> Result<Value, RenderError> {
        let scope = RenderScope {
            locals: frames,
            context: env.context(),
        };
        let e_ctx = EvaluationContext {
            variables: &scope,
            helpers: self.unit.helpers(),
        };
        Ok(evaluate(expression, &e_ctx)?)
    }
}

/// Arrays iterate their elements, objects their values (with keys exposed as
/// `loop.key`), and null iterates nothing.
fn iteration_items(binding: &str, value: Value) -> Result<Vec<(Option<String>, Value)>, RenderError> {
    match value {
        Value::Array(items) => Ok(items.into_iter().map(|v| (None, v)).collect()),
        Value::Object(map) => Ok(map.into_iter().map(|(k, v)| (Some(k), v)).collect()),
        Value::Null => Ok(Vec::new()),
        other => Err(RenderError::InvalidIterable {
            binding: binding.to_string(),
            found: describe(&other),
        }),
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".into(),
        Value::Bool(_) => "a boolean".into(),
        Value::Number(n) => format!("the number {}", n),
        Value::String(_) => "a string".into(),
        Value::Array(_) => "an array".into(),
        Value::Object(_) => "an object".into(),
    }
}
