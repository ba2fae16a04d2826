//! Error types for compiling and rendering templates

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Syntax error inside an embedded expression
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    #[error("Parse error at {span:?}: {message}")]
    Syntax {
        span: Span,
        message: String,
        expected: Vec<String>,
    },
}

impl ExpressionError {
    pub fn span(&self) -> Span {
        match self {
            ExpressionError::Syntax { span, .. } => span.clone(),
        }
    }

    /// Move the span by `offset` bytes, from expression text into its template
    pub fn shifted(self, offset: usize) -> Self {
        match self {
            ExpressionError::Syntax {
                span,
                message,
                expected,
            } => ExpressionError::Syntax {
                span: span.start + offset..span.end + offset,
                message,
                expected,
            },
        }
    }

    /// Format the error with the expression text as context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let ExpressionError::Syntax {
            span,
            message,
            expected,
        } = self;
        let expected_str = if expected.is_empty() {
            String::new()
        } else {
            format!("\nExpected: {}", expected.join(", "))
        };
        report(
            source,
            filename,
            span.clone(),
            message,
            &format!("{}{}", message, expected_str),
        )
    }
}

impl<'a> From<chumsky::error::Rich<'a, crate::expr::lexer::Token>> for ExpressionError {
    fn from(err: chumsky::error::Rich<'a, crate::expr::lexer::Token>) -> Self {
        use chumsky::error::RichReason;

        let message = match err.reason() {
            RichReason::ExpectedFound { found, .. } => {
                let found_str = match found {
                    Some(tok) => format_token(tok),
                    None => "end of expression".to_string(),
                };
                format!("Unexpected {}", found_str)
            }
            RichReason::Custom(msg) => msg.to_string(),
            #[allow(unreachable_patterns)]
            _ => "invalid expression".to_string(),
        };

        let expected: Vec<String> = err
            .expected()
            .filter_map(|e| match e {
                chumsky::error::RichPattern::Token(tok) => Some(format_token(tok)),
                chumsky::error::RichPattern::Label(label) => Some(label.to_string()),
                chumsky::error::RichPattern::EndOfInput => Some("end of expression".to_string()),
                chumsky::error::RichPattern::Identifier(s) => Some(format!("identifier '{}'", s)),
                chumsky::error::RichPattern::Any => Some("any token".to_string()),
                chumsky::error::RichPattern::SomethingElse => None,
                #[allow(unreachable_patterns)]
                _ => None,
            })
            .collect();

        ExpressionError::Syntax {
            span: err.span().into_range(),
            message,
            expected,
        }
    }
}

/// Format a token for human-readable error messages
fn format_token(tok: &crate::expr::lexer::Token) -> String {
    use crate::expr::lexer::Token;
    match tok {
        Token::Ident(s) => format!("identifier '{}'", s),
        Token::String(s) => format!("string \"{}\"", s),
        Token::Number(n) => format!("number {}", n),
        Token::Error(s) => format!("'{}'", s),
        Token::True => "keyword 'true'".to_string(),
        Token::False => "keyword 'false'".to_string(),
        Token::Null => "keyword 'null'".to_string(),
        Token::In => "keyword 'in'".to_string(),
        Token::ParenOpen => "'('".to_string(),
        Token::ParenClose => "')'".to_string(),
        Token::BracketOpen => "'['".to_string(),
        Token::BracketClose => "']'".to_string(),
        Token::BraceOpen => "'{'".to_string(),
        Token::BraceClose => "'}'".to_string(),
        Token::Comma => "','".to_string(),
        Token::Colon => "':'".to_string(),
        Token::Question => "'?'".to_string(),
        Token::Dot => "'.'".to_string(),
        _ => format!("operator {:?}", tok),
    }
}

/// Errors raised while turning template text into a render procedure
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    /// `for` payload is not `index, value in collection`
    #[error("invalid for-expression: `{payload}`")]
    InvalidFor { payload: String, span: Span },

    /// `include` payload has no template path
    #[error("invalid include: missing template path")]
    InvalidInclude { span: Span },

    /// `_name` marker that is not a known directive
    #[error("unknown directive `{name}`")]
    UnknownDirective { name: String, span: Span },

    /// Payload given to a directive that takes none
    #[error("directive `{directive}` takes no payload, found `{payload}`")]
    UnexpectedPayload {
        directive: &'static str,
        payload: String,
        span: Span,
    },

    /// `${` without a matching `}`
    #[error("unterminated directive")]
    UnterminatedDirective { span: Span },

    /// Text after a backtick payload before the closing `}`
    #[error("expected `}}` to close directive")]
    ExpectedClose { span: Span },

    /// Mismatched `if`/`endif` or `for`/`endfor`
    #[error("unbalanced `{directive}`: {reason}")]
    UnbalancedBlock {
        directive: &'static str,
        reason: String,
        span: Span,
    },

    /// Name missing from the registry
    #[error("template not found: {name}")]
    NotFound { name: String },
}

impl CompileError {
    /// Source location of the error, if it came from template text
    pub fn span(&self) -> Option<Span> {
        match self {
            CompileError::InvalidFor { span, .. }
            | CompileError::InvalidInclude { span }
            | CompileError::UnknownDirective { span, .. }
            | CompileError::UnexpectedPayload { span, .. }
            | CompileError::UnterminatedDirective { span }
            | CompileError::ExpectedClose { span }
            | CompileError::UnbalancedBlock { span, .. } => Some(span.clone()),
            CompileError::NotFound { .. } => None,
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let message = self.to_string();
        match self.span() {
            Some(span) => report(source, filename, span, &message, &message),
            None => format!("Error: {}", message),
        }
    }
}

fn report(source: &str, filename: &str, span: Span, message: &str, label: &str) -> String {
    let mut buf = Vec::new();
    let written = Report::build(ReportKind::Error, filename, span.start)
        .with_message(message)
        .with_label(
            Label::new((filename, span))
                .with_message(label)
                .with_color(Color::Red),
        )
        .finish()
        .write((filename, Source::from(source)), &mut buf);
    match written {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        Err(_) => format!("Error: {}", message),
    }
}

/// Errors raised while executing a render procedure
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// Context is not a key-value structure
    #[error("context must be an object, found {found}")]
    InvalidContext { found: &'static str },

    /// Expression text failed to parse
    #[error("invalid expression `{source_text}`: {}", format_expression_errors(.errors))]
    Expression {
        /// Registry name of the template, `None` for ad-hoc text
        template: Option<String>,
        source_text: String,
        errors: Vec<ExpressionError>,
    },

    #[error("undefined variable '{name}'")]
    UndefinedVariable { name: String },

    /// Operator or access applied to a value of the wrong kind
    #[error("type error: {message}")]
    Type { message: String },

    /// Value has no string form
    #[error("cannot print a value of type {kind}")]
    Unprintable { kind: &'static str },

    #[error("arithmetic produced a non-finite result for `{op}`")]
    NonFinite { op: &'static str },

    #[error("unknown function '{name}'")]
    UnknownFunction { name: String },

    #[error("function '{name}' failed: {message}")]
    Function { name: String, message: String },
}

fn format_expression_errors(errors: &[ExpressionError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Loop target cannot be iterated
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IterationError {
    #[error("cannot iterate over a value of type {kind}")]
    NotIterable { kind: &'static str },
}

/// Failures resolving an `include` at render time
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IncludeError {
    #[error("included template not found: {name}")]
    NotFound { name: String },

    #[error("included template '{name}' failed to compile: {source}")]
    Compile {
        name: String,
        #[source]
        source: CompileError,
    },

    #[error("include depth limit of {limit} exceeded at '{name}'")]
    DepthExceeded { name: String, limit: usize },
}

/// Any failure of a render call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("compile error: {0}")]
    Compile(#[from] CompileError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    #[error("iteration error: {0}")]
    Iteration(#[from] IterationError),

    #[error("include error: {0}")]
    Include(#[from] IncludeError),
}
