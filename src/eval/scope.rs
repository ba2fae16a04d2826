//! Layered variable scope: loop frames over the context's own fields

use std::collections::HashMap;

use serde_json::{Map, Value};

/// Name lookup environment for one render
///
/// Frames are searched innermost first; the context object is the outermost
/// layer.
#[derive(Debug)]
pub struct Scope<'c> {
    context: &'c Map<String, Value>,
    frames: Vec<HashMap<String, Value>>,
}

impl<'c> Scope<'c> {
    pub fn new(context: &'c Map<String, Value>) -> Self {
        Self {
            context,
            frames: Vec::new(),
        }
    }

    /// Look up a bare identifier
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name))
            .or_else(|| self.context.get(name))
    }

    /// Open a frame binding the loop's index and value names
    pub fn push_loop(&mut self, index_name: &str, index: Value, value_name: &str, value: Value) {
        let mut frame = HashMap::with_capacity(2);
        frame.insert(index_name.to_string(), index);
        frame.insert(value_name.to_string(), value);
        self.frames.push(frame);
    }

    pub fn pop(&mut self) {
        self.frames.pop();
    }

    /// Number of open loop frames
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}
