//! Embedded expression language
//!
//! Directive payloads such as `num === 1`, `"hi" + name` or `{ title }` are
//! parsed by this module. The supported grammar, lowest precedence first:
//!
//! ```text
//! expr        := or ( "?" expr ":" expr )?
//! or          := and ( "||" and )*
//! and         := equality ( "&&" equality )*
//! equality    := comparison ( ("==" | "!=" | "===" | "!==") comparison )*
//! comparison  := sum ( ("<" | "<=" | ">" | ">=") sum )*
//! sum         := product ( ("+" | "-") product )*
//! product     := unary ( ("*" | "/" | "%") unary )*
//! unary       := ("!" | "-" | "+")* postfix
//! postfix     := atom ( "." ident | "." ident "(" args ")" | "[" expr "]" )*
//! atom        := number | string | "true" | "false" | "null" | ident
//!              | ident "(" args ")" | "[" args "]" | "{" entries "}" | "(" expr ")"
//! entries     := ( (ident | string) ":" expr | ident ) separated by ","
//! ```
//!
//! Strings take single or double quotes with backslash escapes. `in` is
//! reserved for `for` headers.

pub mod ast;
mod grammar;
pub mod lexer;

pub use ast::*;
pub use grammar::parse;
