//! Template syntax: directive slots and the token stream

pub mod token;
mod tokenizer;

pub use token::{Directive, Payload, Span, Spanned, Token};
pub use tokenizer::tokenize;
