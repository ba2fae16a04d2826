//! Template tokens

use std::fmt;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Token with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// Expression text from a directive and where it starts in the template
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    pub text: String,
    /// Byte offset of `text` in the template source
    pub offset: usize,
}

impl Payload {
    pub fn new(text: impl Into<String>, offset: usize) -> Self {
        Self {
            text: text.into(),
            offset,
        }
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Directive marker, the word after `${` (optionally prefixed with `_`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Print,
    If,
    ElseIf,
    Else,
    EndIf,
    For,
    EndFor,
    Include,
}

impl Directive {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "print" => Directive::Print,
            "if" => Directive::If,
            "elseif" => Directive::ElseIf,
            "else" => Directive::Else,
            "endif" => Directive::EndIf,
            "for" => Directive::For,
            "endfor" => Directive::EndFor,
            "include" => Directive::Include,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Directive::Print => "print",
            Directive::If => "if",
            Directive::ElseIf => "elseif",
            Directive::Else => "else",
            Directive::EndIf => "endif",
            Directive::For => "for",
            Directive::EndFor => "endfor",
            Directive::Include => "include",
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One element of a token stream
///
/// Expression payloads are kept as raw text; nothing here checks them.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Text between directives, byte for byte
    Literal(String),
    Print(Payload),
    If(Payload),
    ElseIf(Payload),
    Else,
    EndIf,
    For {
        index: String,
        value: String,
        collection: Payload,
    },
    EndFor,
    Include {
        path: String,
        context: Option<Payload>,
    },
}

impl Token {
    /// Directive that produced this token, `None` for literal text
    pub fn directive(&self) -> Option<Directive> {
        Some(match self {
            Token::Literal(_) => return None,
            Token::Print(_) => Directive::Print,
            Token::If(_) => Directive::If,
            Token::ElseIf(_) => Directive::ElseIf,
            Token::Else => Directive::Else,
            Token::EndIf => Directive::EndIf,
            Token::For { .. } => Directive::For,
            Token::EndFor => Directive::EndFor,
            Token::Include { .. } => Directive::Include,
        })
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Literal(text) => write!(f, "literal {:?}", text),
            Token::Print(expr) => write!(f, "print `{}`", expr),
            Token::If(expr) => write!(f, "if `{}`", expr),
            Token::ElseIf(expr) => write!(f, "elseif `{}`", expr),
            Token::Else => f.write_str("else"),
            Token::EndIf => f.write_str("endif"),
            Token::For {
                index,
                value,
                collection,
            } => write!(f, "for {}, {} in `{}`", index, value, collection),
            Token::EndFor => f.write_str("endfor"),
            Token::Include { path, context } => match context {
                Some(ctx) => write!(f, "include {} `{}`", path, ctx),
                None => write!(f, "include {}", path),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive_names_round_trip() {
        for name in ["print", "if", "elseif", "else", "endif", "for", "endfor", "include"] {
            let directive = Directive::from_name(name).expect("Should be a directive");
            assert_eq!(directive.name(), name);
        }
        assert_eq!(Directive::from_name("end"), None);
    }

    #[test]
    fn test_token_display() {
        let token = Token::For {
            index: "i".to_string(),
            value: "v".to_string(),
            collection: Payload::new("items", 12),
        };
        assert_eq!(token.to_string(), "for i, v in `items`");
        assert_eq!(Token::Literal("a\n".to_string()).to_string(), r#"literal "a\n""#);
    }

    #[test]
    fn test_literal_has_no_directive() {
        assert_eq!(Token::Literal("x".to_string()).directive(), None);
        assert_eq!(Token::EndFor.directive(), Some(Directive::EndFor));
    }
}
