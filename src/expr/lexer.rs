//! Lexer for embedded expressions using logos

use logos::Logos;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
pub enum Token {
    // Keywords
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,
    #[token("in")]
    In,

    // Equality operators (longer patterns first)
    #[token("===")]
    StrictEq,
    #[token("!==")]
    StrictNotEq,
    #[token("==")]
    Eq,
    #[token("!=")]
    NotEq,

    // Comparison operators
    #[token("<=")]
    LessOrEqual,
    #[token(">=")]
    GreaterOrEqual,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,

    // Boolean connectives
    #[token("&&")]
    And,
    #[token("||")]
    Or,
    #[token("!")]
    Bang,

    // Arithmetic
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,

    // Delimiters
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token("[")]
    BracketOpen,
    #[token("]")]
    BracketClose,
    #[token("{")]
    BraceOpen,
    #[token("}")]
    BraceClose,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token("?")]
    Question,
    #[token(".")]
    Dot,

    // Literals - identifiers must come after keywords
    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*", |lex| lex.slice().to_string(), priority = 1)]
    Ident(String),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| unescape(lex.slice()))]
    #[regex(r#"'([^'\\]|\\.)*'"#, |lex| unescape(lex.slice()))]
    String(String),

    #[regex(r"[0-9]+(\.[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    /// Text the lexer could not recognise; kept so the parser reports it
    Error(String),
}

/// Strip the surrounding quotes and resolve backslash escapes
fn unescape(quoted: &str) -> String {
    let inner = &quoted[1..quoted.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Lex input string into tokens with spans
///
/// Unrecognised input becomes [`Token::Error`] instead of being dropped.
pub fn lex(input: &str) -> impl Iterator<Item = (Token, Span)> + '_ {
    Token::lexer(input).spanned().map(move |(tok, span)| match tok {
        Ok(t) => (t, span),
        Err(()) => (Token::Error(input[span.clone()].to_string()), span),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords() {
        let tokens: Vec<_> = lex("true false null in").map(|(t, _)| t).collect();
        assert_eq!(
            tokens,
            vec![Token::True, Token::False, Token::Null, Token::In]
        );
    }

    #[test]
    fn test_equality_operators() {
        let tokens: Vec<_> = lex("=== !== == !=").map(|(t, _)| t).collect();
        assert_eq!(
            tokens,
            vec![Token::StrictEq, Token::StrictNotEq, Token::Eq, Token::NotEq]
        );
    }

    #[test]
    fn test_comparison_operators() {
        let tokens: Vec<_> = lex("< <= > >=").map(|(t, _)| t).collect();
        assert_eq!(
            tokens,
            vec![
                Token::Less,
                Token::LessOrEqual,
                Token::Greater,
                Token::GreaterOrEqual
            ]
        );
    }

    #[test]
    fn test_identifiers_and_strings() {
        let tokens: Vec<_> = lex(r#"name "hi there" 'single'"#)
            .map(|(t, _)| t)
            .collect();
        assert_eq!(
            tokens,
            vec![
                Token::Ident("name".to_string()),
                Token::String("hi there".to_string()),
                Token::String("single".to_string()),
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        let tokens: Vec<_> = lex(r#""a\"b\nc""#).map(|(t, _)| t).collect();
        assert_eq!(tokens, vec![Token::String("a\"b\nc".to_string())]);
    }

    #[test]
    fn test_keyword_prefix_is_identifier() {
        let tokens: Vec<_> = lex("index nullable").map(|(t, _)| t).collect();
        assert_eq!(
            tokens,
            vec![
                Token::Ident("index".to_string()),
                Token::Ident("nullable".to_string())
            ]
        );
    }

    #[test]
    fn test_numbers() {
        let tokens: Vec<_> = lex("42 3.14 -10").map(|(t, _)| t).collect();
        assert_eq!(
            tokens,
            vec![
                Token::Number(42.0),
                Token::Number(3.14),
                Token::Minus,
                Token::Number(10.0)
            ]
        );
    }

    #[test]
    fn test_object_shorthand() {
        let tokens: Vec<_> = lex("{ title }").map(|(t, _)| t).collect();
        assert_eq!(
            tokens,
            vec![
                Token::BraceOpen,
                Token::Ident("title".to_string()),
                Token::BraceClose
            ]
        );
    }

    #[test]
    fn test_for_header() {
        let tokens: Vec<_> = lex("index, name in names").map(|(t, _)| t).collect();
        assert_eq!(
            tokens,
            vec![
                Token::Ident("index".to_string()),
                Token::Comma,
                Token::Ident("name".to_string()),
                Token::In,
                Token::Ident("names".to_string()),
            ]
        );
    }

    #[test]
    fn test_unknown_character_is_kept() {
        let tokens: Vec<_> = lex("a @ b").map(|(t, _)| t).collect();
        assert_eq!(
            tokens,
            vec![
                Token::Ident("a".to_string()),
                Token::Error("@".to_string()),
                Token::Ident("b".to_string()),
            ]
        );
    }

    #[test]
    fn test_spans() {
        let spans: Vec<_> = lex("age + 1").map(|(_, s)| s).collect();
        assert_eq!(spans, vec![0..3, 4..5, 6..7]);
    }
}
