//! Splits template text into literal runs and directive slots
//!
//! A slot is `${ ... }`. Two spellings are accepted inside it:
//!
//! ```text
//! ${ _if`num === 1` }     marker with a backtick payload
//! ${if num === 1}         bare marker, payload runs to the matching `}`
//! ${ _`name` }            `_` alone is print
//! ${name}                 no marker: the whole slot is printed
//! ${_id}                  `_word` that is not a marker and has no backtick
//!                         payload is printed too
//! ```
//!
//! `\${` in literal text produces a literal `${`. A doubled backslash,
//! `\\${`, writes one backslash and still opens a directive.

use tracing::trace;

use crate::error::CompileError;
use crate::expr::lexer::{self, Token as ExprToken};
use crate::syntax::token::{Directive, Payload, Span, Spanned, Token};

const OPEN: &str = "${";

/// Tokenize one template source into a flat token stream
pub fn tokenize(source: &str) -> Result<Vec<Spanned<Token>>, CompileError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut literal_start = 0;
    let mut pos = 0;

    while let Some(found) = source[pos..].find(OPEN) {
        let start = pos + found;
        let escaped = start > pos && bytes[start - 1] == b'\\';
        let doubled = escaped && start >= pos + 2 && bytes[start - 2] == b'\\';

        // Escaped opener: drop the backslash, keep `${` as text
        if escaped && !doubled {
            literal.push_str(&source[pos..start - 1]);
            literal.push_str(OPEN);
            pos = start + OPEN.len();
            continue;
        }

        // `\\${`: keep one backslash, then the directive
        let text_end = if doubled { start - 1 } else { start };
        literal.push_str(&source[pos..text_end]);
        if !literal.is_empty() {
            tokens.push(Spanned::new(
                Token::Literal(std::mem::take(&mut literal)),
                literal_start..start,
            ));
        }

        let (token, end) = Slot::new(source, start).parse()?;
        tokens.push(Spanned::new(token, start..end));
        pos = end;
        literal_start = end;
    }

    literal.push_str(&source[pos..]);
    if !literal.is_empty() {
        tokens.push(Spanned::new(Token::Literal(literal), literal_start..source.len()));
    }

    trace!(count = tokens.len(), "tokenized template");
    Ok(tokens)
}

/// Cursor over one `${ ... }` slot
struct Slot<'s> {
    source: &'s str,
    start: usize,
    pos: usize,
}

impl<'s> Slot<'s> {
    fn new(source: &'s str, start: usize) -> Self {
        Self {
            source,
            start,
            pos: start + OPEN.len(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.source.as_bytes().get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    /// Length of the identifier-like word at the cursor
    fn word_len(&self) -> usize {
        self.source.as_bytes()[self.pos..]
            .iter()
            .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_' || **b == b'$')
            .count()
    }

    fn unterminated(&self) -> CompileError {
        CompileError::UnterminatedDirective {
            span: self.start..self.source.len(),
        }
    }

    fn parse(mut self) -> Result<(Token, usize), CompileError> {
        let source = self.source;
        self.skip_whitespace();
        let content = self.pos;

        let directive = if self.peek() == Some(b'_') {
            self.pos += 1;
            let len = self.word_len();
            let word = &source[self.pos..self.pos + len];
            self.pos += len;
            if word.is_empty() {
                Directive::Print
            } else if let Some(directive) = Directive::from_name(word) {
                directive
            } else {
                let marker_end = self.pos;
                self.skip_whitespace();
                if self.peek() == Some(b'`') {
                    return Err(CompileError::UnknownDirective {
                        name: format!("_{}", word),
                        span: self.start..marker_end,
                    });
                }
                // `_word` is an identifier, print the whole slot
                self.pos = content;
                Directive::Print
            }
        } else {
            let len = self.word_len();
            let word = &source[self.pos..self.pos + len];
            let next = source.as_bytes().get(self.pos + len).copied();
            let ends_marker = matches!(next, None | Some(b'`') | Some(b'}'))
                || next.is_some_and(|b| b.is_ascii_whitespace());
            match Directive::from_name(word) {
                Some(directive) if ends_marker => {
                    self.pos += len;
                    directive
                }
                // Not a marker: the whole slot is a print expression
                _ => Directive::Print,
            }
        };

        self.skip_whitespace();
        let payload = if self.peek() == Some(b'`') {
            self.backtick_payload()?
        } else {
            self.bare_payload()?
        };

        let token = self.build(directive, payload)?;
        Ok((token, self.pos))
    }

    /// `` `payload` `` followed by the closing `}`; payload kept verbatim
    fn backtick_payload(&mut self) -> Result<Payload, CompileError> {
        let source = self.source;
        let open = self.pos + 1;
        let close = source[open..]
            .find('`')
            .map(|i| open + i)
            .ok_or_else(|| self.unterminated())?;
        self.pos = close + 1;
        self.skip_whitespace();
        match self.peek() {
            Some(b'}') => {
                self.pos += 1;
                Ok(Payload::new(&source[open..close], open))
            }
            None => Err(self.unterminated()),
            Some(_) => Err(CompileError::ExpectedClose {
                span: self.start..self.pos + 1,
            }),
        }
    }

    /// Payload up to the `}` that balances the slot, skipping string literals
    fn bare_payload(&mut self) -> Result<Payload, CompileError> {
        let source = self.source;
        let bytes = source.as_bytes();
        let begin = self.pos;
        let mut depth = 0usize;
        let mut i = begin;
        while i < bytes.len() {
            match bytes[i] {
                quote @ (b'"' | b'\'') => {
                    i += 1;
                    while i < bytes.len() && bytes[i] != quote {
                        if bytes[i] == b'\\' {
                            i += 1;
                        }
                        i += 1;
                    }
                }
                b'{' => depth += 1,
                b'}' if depth == 0 => {
                    self.pos = i + 1;
                    return Ok(trimmed(&source[begin..i], begin));
                }
                b'}' => depth -= 1,
                _ => {}
            }
            i += 1;
        }
        Err(self.unterminated())
    }

    fn build(&self, directive: Directive, payload: Payload) -> Result<Token, CompileError> {
        let span = self.start..self.pos;
        Ok(match directive {
            Directive::Print => Token::Print(payload),
            Directive::If => Token::If(payload),
            Directive::ElseIf => Token::ElseIf(payload),
            Directive::For => parse_for(&payload, span)?,
            Directive::Include => parse_include(&payload, span)?,
            Directive::Else | Directive::EndIf | Directive::EndFor => {
                if !payload.text.trim().is_empty() {
                    return Err(CompileError::UnexpectedPayload {
                        directive: directive.name(),
                        payload: payload.text,
                        span,
                    });
                }
                match directive {
                    Directive::Else => Token::Else,
                    Directive::EndIf => Token::EndIf,
                    _ => Token::EndFor,
                }
            }
        })
    }
}

/// Trim `text`, which starts at `offset`, keeping the offset accurate
fn trimmed(text: &str, offset: usize) -> Payload {
    let lead = text.len() - text.trim_start().len();
    Payload::new(text.trim(), offset + lead)
}

/// `index, value in collection`
fn parse_for(payload: &Payload, span: Span) -> Result<Token, CompileError> {
    let text = payload.text.as_str();
    let invalid = || CompileError::InvalidFor {
        payload: text.to_string(),
        span: span.clone(),
    };

    let mut header = lexer::lex(text);
    let (index, value, in_end) = match (header.next(), header.next(), header.next(), header.next()) {
        (
            Some((ExprToken::Ident(index), _)),
            Some((ExprToken::Comma, _)),
            Some((ExprToken::Ident(value), _)),
            Some((ExprToken::In, in_span)),
        ) => (index, value, in_span.end),
        _ => return Err(invalid()),
    };

    let collection = trimmed(&text[in_end..], payload.offset + in_end);
    if collection.text.is_empty() {
        return Err(invalid());
    }

    Ok(Token::For {
        index,
        value,
        collection,
    })
}

/// `path` or `path context-expression`, split at the first whitespace
fn parse_include(payload: &Payload, span: Span) -> Result<Token, CompileError> {
    let payload = trimmed(&payload.text, payload.offset);
    if payload.text.is_empty() {
        return Err(CompileError::InvalidInclude { span });
    }

    let (path, context) = match payload.text.find(char::is_whitespace) {
        Some(split) => {
            let context = trimmed(&payload.text[split..], payload.offset + split);
            let context = (!context.text.is_empty()).then_some(context);
            (&payload.text[..split], context)
        }
        None => (payload.text.as_str(), None),
    };

    Ok(Token::Include {
        path: path.to_string(),
        context,
    })
}
