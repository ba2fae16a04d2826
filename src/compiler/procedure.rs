//! The render procedure: a compiled template and its interpreter

use serde_json::{Map, Value};

use crate::compiler::program::{Expression, Instruction};
use crate::error::{Error, RenderError};
use crate::eval::value::{is_truthy, kind, to_text};
use crate::eval::{iterate, Evaluator, Scope};
use crate::template::Engine;

/// A compiled template
///
/// Rendering needs the [`Engine`] that owns the registry so `include`
/// directives can be resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    name: Option<String>,
    instructions: Vec<Instruction>,
}

impl Template {
    pub(crate) fn new(name: Option<String>, instructions: Vec<Instruction>) -> Self {
        Self { name, instructions }
    }

    /// Registry name, `None` for ad-hoc templates
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Render against `context`, which must be an object
    ///
    /// Output is all-or-nothing: any failure discards what was produced so far.
    pub fn render(&self, engine: &Engine, context: &Value) -> Result<String, Error> {
        self.render_at(engine, context, 0)
    }

    pub(crate) fn render_at(
        &self,
        engine: &Engine,
        context: &Value,
        depth: usize,
    ) -> Result<String, Error> {
        let fields = match context {
            Value::Object(fields) => fields,
            other => return Err(RenderError::InvalidContext { found: kind(other) }.into()),
        };

        let mut renderer = Renderer {
            name: self.name.as_deref(),
            engine,
            evaluator: engine.evaluator(),
            scope: Scope::new(fields),
            depth,
        };
        let mut out = String::new();
        renderer.run(&self.instructions, &mut out)?;
        Ok(out)
    }
}

struct Renderer<'r> {
    name: Option<&'r str>,
    engine: &'r Engine,
    evaluator: Evaluator<'r>,
    scope: Scope<'r>,
    depth: usize,
}

impl Renderer<'_> {
    fn eval(&self, expr: &Expression) -> Result<Value, RenderError> {
        self.evaluator.eval(expr.tree(self.name)?, &self.scope)
    }

    fn run(&mut self, instructions: &[Instruction], out: &mut String) -> Result<(), Error> {
        for instruction in instructions {
            match instruction {
                Instruction::Literal(text) => out.push_str(text),
                Instruction::Print(expr) => {
                    let value = self.eval(expr)?;
                    out.push_str(&to_text(&value)?);
                }
                Instruction::Branch(arms) => {
                    for arm in arms {
                        let taken = match &arm.guard {
                            Some(guard) => is_truthy(&self.eval(guard)?),
                            None => true,
                        };
                        if taken {
                            self.run(&arm.body, out)?;
                            break;
                        }
                    }
                }
                Instruction::Loop {
                    index,
                    value,
                    collection,
                    body,
                } => {
                    let target = self.eval(collection)?;
                    for (key, item) in iterate(&target)? {
                        self.scope.push_loop(index, key, value, item.clone());
                        let result = self.run(body, out);
                        self.scope.pop();
                        result?;
                    }
                }
                Instruction::Include { path, context } => {
                    let context = match context {
                        Some(expr) => self.eval(expr)?,
                        None => Value::Object(Map::new()),
                    };
                    let rendered = self
                        .engine
                        .resolve_include(path, &context, self.depth + 1)?;
                    out.push_str(&rendered);
                }
            }
        }
        Ok(())
    }
}
