//! Lexical scope table
//!
//! A stack of name → [`Value`] maps. The bottom map is the global scope and
//! lives for the whole compilation; every function body and compound
//! statement pushes one more map on entry and pops it on exit.

use std::collections::HashMap;
use crate::ir::Value;

#[derive(Debug, Clone)]
pub struct Scope {
    frames: Vec<HashMap<String, Value>>,
}

impl Scope {
    pub fn new() -> Self {
        Self {
            frames: vec![HashMap::new()],
        }
    }

    pub fn enter(&mut self) {
        self.frames.push(HashMap::new());
    }

    /// Leave the innermost scope; the global scope is never popped
    pub fn exit(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    pub fn in_global(&self) -> bool {
        self.frames.len() == 1
    }

    /// Bind `name` in the innermost scope
    ///
    /// Returns `false` and leaves the existing binding untouched if the name
    /// is already bound in that scope.
    pub fn push(&mut self, name: &str, value: Value) -> bool {
        let Some(frame) = self.frames.last_mut() else {
            return false;
        };
        if frame.contains_key(name) {
            return false;
        }
        frame.insert(name.to_string(), value);
        true
    }

    /// Resolve `name`, innermost scope first
    pub fn find(&self, name: &str) -> Option<Value> {
        self.frames.iter().rev().find_map(|frame| frame.get(name).copied())
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}
