//! Name bindings as a stack of frames. The root frame sits at the bottom; a
//! call pushes a frame on top of whatever is active at the call site and pops
//! it on return, so callees see their caller's bindings.

use std::collections::HashMap;

use crate::runtime::value::Value;

#[derive(Debug)]
pub struct Environment {
    frames: Vec<HashMap<String, Value>>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    pub fn new() -> Self {
        Self { frames: vec![HashMap::new()] }
    }

    pub fn push_frame(&mut self) {
        self.frames.push(HashMap::new());
    }

    /// The root frame is never popped.
    pub fn pop_frame(&mut self) {
        if self.frames.len() > 1 { self.frames.pop(); }
    }

    /// Innermost binding of `name`, searching outward.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    /// Always binds in the innermost frame, shadowing any outer binding.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.into(), value);
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
