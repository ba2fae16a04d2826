//! Iteration adapter: turns a loop target into ordered (key, value) pairs

use serde_json::{map, Value};

use crate::error::IterationError;
use crate::eval::value::kind;

/// Pairs yielded by [`iterate`]
pub enum Pairs<'v> {
    Sequence(std::iter::Enumerate<std::slice::Iter<'v, Value>>),
    Mapping(map::Iter<'v>),
}

impl<'v> Iterator for Pairs<'v> {
    type Item = (Value, &'v Value);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Pairs::Sequence(items) => items.next().map(|(i, v)| (Value::from(i), v)),
            Pairs::Mapping(entries) => entries.next().map(|(k, v)| (Value::String(k.clone()), v)),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Pairs::Sequence(items) => items.size_hint(),
            Pairs::Mapping(entries) => entries.size_hint(),
        }
    }
}

/// Arrays yield `(index, element)` in ascending order, objects yield
/// `(key, value)` in insertion order; anything else is not iterable.
pub fn iterate(value: &Value) -> Result<Pairs<'_>, IterationError> {
    match value {
        Value::Array(items) => Ok(Pairs::Sequence(items.iter().enumerate())),
        Value::Object(entries) => Ok(Pairs::Mapping(entries.iter())),
        other => Err(IterationError::NotIterable { kind: kind(other) }),
    }
}
