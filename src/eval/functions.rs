//! Callable functions available to expressions
//!
//! `f(a, b)` calls `f` with `[a, b]`; `a.f(b)` calls `f` with `[a, b]` too, so
//! every function doubles as a method on its first argument.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use crate::eval::value::{kind, to_text, values_equal};

/// Host function signature; the error string becomes a render error
pub type Function = Box<dyn Fn(&[Value]) -> Result<Value, String>>;

/// Name → function table
pub struct Functions {
    table: HashMap<String, Function>,
}

impl fmt::Debug for Functions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.table.keys().collect();
        names.sort();
        f.debug_struct("Functions").field("names", &names).finish()
    }
}

impl Default for Functions {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl Functions {
    /// An empty table
    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// The built-in set: `len`, `upper`, `lower`, `trim`, `join`, `keys`,
    /// `contains`, `str`, `default`, `json`
    pub fn with_builtins() -> Self {
        let mut functions = Self::empty();
        functions.insert("len", len);
        functions.insert("upper", |args| Ok(Value::String(string_arg(args, 0)?.to_uppercase())));
        functions.insert("lower", |args| Ok(Value::String(string_arg(args, 0)?.to_lowercase())));
        functions.insert("trim", |args| Ok(Value::String(string_arg(args, 0)?.trim().to_string())));
        functions.insert("join", join);
        functions.insert("keys", keys);
        functions.insert("contains", contains);
        functions.insert("str", |args| {
            to_text(arg(args, 0)?).map(Value::String).map_err(|e| e.to_string())
        });
        functions.insert("default", |args| {
            let value = arg(args, 0)?;
            Ok(if value.is_null() { arg(args, 1)?.clone() } else { value.clone() })
        });
        functions.insert("json", |args| {
            serde_json::to_string(arg(args, 0)?)
                .map(Value::String)
                .map_err(|e| e.to_string())
        });
        functions
    }

    /// Register or replace a function
    pub fn insert<F>(&mut self, name: impl Into<String>, function: F)
    where
        F: Fn(&[Value]) -> Result<Value, String> + 'static,
    {
        self.table.insert(name.into(), Box::new(function));
    }

    pub fn get(&self, name: &str) -> Option<&Function> {
        self.table.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }
}

fn arg(args: &[Value], index: usize) -> Result<&Value, String> {
    args.get(index)
        .ok_or_else(|| format!("missing argument {}", index + 1))
}

fn string_arg(args: &[Value], index: usize) -> Result<&str, String> {
    match arg(args, index)? {
        Value::String(s) => Ok(s),
        other => Err(format!(
            "argument {} must be a string, found {}",
            index + 1,
            kind(other)
        )),
    }
}

fn len(args: &[Value]) -> Result<Value, String> {
    let n = match arg(args, 0)? {
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Object(entries) => entries.len(),
        other => return Err(format!("{} has no length", kind(other))),
    };
    Ok(Value::from(n))
}

fn join(args: &[Value]) -> Result<Value, String> {
    let items = match arg(args, 0)? {
        Value::Array(items) => items,
        other => return Err(format!("cannot join {}", kind(other))),
    };
    let separator = match args.get(1) {
        Some(_) => string_arg(args, 1)?,
        None => "",
    };
    let parts = items
        .iter()
        .map(to_text)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.to_string())?;
    Ok(Value::String(parts.join(separator)))
}

fn keys(args: &[Value]) -> Result<Value, String> {
    match arg(args, 0)? {
        Value::Object(entries) => Ok(Value::Array(
            entries.keys().map(|k| Value::String(k.clone())).collect(),
        )),
        other => Err(format!("{} has no keys", kind(other))),
    }
}

fn contains(args: &[Value]) -> Result<Value, String> {
    let needle = arg(args, 1)?;
    let found = match (arg(args, 0)?, needle) {
        (Value::String(haystack), Value::String(part)) => haystack.contains(part.as_str()),
        (Value::Array(items), _) => items.iter().any(|item| values_equal(item, needle)),
        (Value::Object(entries), Value::String(key)) => entries.contains_key(key),
        (haystack, _) => {
            return Err(format!(
                "cannot search {} for {}",
                kind(haystack),
                kind(needle)
            ))
        }
    };
    Ok(Value::Bool(found))
}
