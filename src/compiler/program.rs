//! Instruction tree executed by a render procedure

use crate::error::{ExpressionError, RenderError};
use crate::expr::{self, Expr};
use crate::syntax::Payload;

/// Expression text parsed once at generation time
///
/// A syntax error is kept rather than reported, and only surfaces as a
/// [`RenderError::Expression`] when the owning instruction runs. Error spans
/// are relative to the template source, not the expression text.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    offset: usize,
    parsed: Result<Expr, Vec<ExpressionError>>,
}

impl Expression {
    /// Parse `source`, which starts at byte `offset` of its template
    pub fn compile(source: impl Into<String>, offset: usize) -> Self {
        let source = source.into();
        let parsed = expr::parse(&source).map_err(|errors| {
            errors
                .into_iter()
                .map(|error| error.shifted(offset))
                .collect()
        });
        Self {
            source,
            offset,
            parsed,
        }
    }

    /// Expression text as written in the template
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_valid(&self) -> bool {
        self.parsed.is_ok()
    }

    /// Parsed tree, or the syntax errors tagged with the owning template
    pub fn tree(&self, template: Option<&str>) -> Result<&Expr, RenderError> {
        self.parsed.as_ref().map_err(|errors| RenderError::Expression {
            template: template.map(str::to_string),
            source_text: self.source.clone(),
            errors: errors.clone(),
        })
    }
}

impl From<Payload> for Expression {
    fn from(payload: Payload) -> Self {
        Expression::compile(payload.text, payload.offset)
    }
}

/// One guarded (or final unguarded) arm of a conditional chain
#[derive(Debug, Clone, PartialEq)]
pub struct Arm {
    /// `None` for the `else` arm
    pub guard: Option<Expression>,
    pub body: Vec<Instruction>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Append text verbatim
    Literal(String),
    /// Append the string form of an expression
    Print(Expression),
    /// Run the first arm whose guard is truthy
    Branch(Vec<Arm>),
    /// Run `body` once per (key, value) pair of `collection`
    Loop {
        index: String,
        value: String,
        collection: Expression,
        body: Vec<Instruction>,
    },
    /// Render another registered template and append its output
    Include {
        path: String,
        /// `None` renders the included template with an empty context
        context: Option<Expression>,
    },
}
