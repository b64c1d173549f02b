//! Scope stack
//!
//! This module provides the environment model for program execution:
//! - [`ScopeStack`]: ordered frames, frame 0 being the persistent global scope
//! - [`Frame`]: one scope of name → value bindings
//!
//! # Resolution Rules
//!
//! Reads search innermost to outermost. Plain assignment always writes the
//! innermost frame (creating or shadowing). In-place updates write into the
//! frame where the name was first found, see [`ScopeStack::find_frame_index`].

use super::value::Value;
use rustc_hash::FxHashMap;

/// One scope of bindings
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub vars: FxHashMap<String, Value>,
}

/// The stack of scopes
#[derive(Debug, Clone)]
pub struct ScopeStack {
    frames: Vec<Frame>,
}

impl ScopeStack {
    pub fn new() -> Self {
        ScopeStack {
            frames: vec![Frame::default()],
        }
    }

    /// Push a frame for a function call
    pub fn push_frame(&mut self) {
        self.frames.push(Frame::default());
    }

    /// Pop the innermost call frame. The global frame is never removed.
    pub fn pop_frame(&mut self) -> Option<Frame> {
        if self.frames.len() > 1 {
            self.frames.pop()
        } else {
            None
        }
    }

    /// Innermost-first lookup
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.frames.iter().rev().find_map(|frame| frame.vars.get(name))
    }

    /// Index of the innermost frame that binds `name`
    pub fn find_frame_index(&self, name: &str) -> Option<usize> {
        self.frames
            .iter()
            .rposition(|frame| frame.vars.contains_key(name))
    }

    /// Bind in the innermost frame
    pub fn set_local(&mut self, name: &str, value: Value) {
        if let Some(frame) = self.frames.last_mut() {
            frame.vars.insert(name.to_string(), value);
        }
    }

    /// Overwrite a binding in a specific frame
    pub fn set_in(&mut self, index: usize, name: &str, value: Value) {
        if let Some(frame) = self.frames.get_mut(index) {
            frame.vars.insert(name.to_string(), value);
        }
    }

    /// Get a value from a specific frame
    pub fn get_in(&self, index: usize, name: &str) -> Option<&Value> {
        self.frames.get(index).and_then(|frame| frame.vars.get(name))
    }

    pub fn globals(&self) -> &FxHashMap<String, Value> {
        &self.frames[0].vars
    }

    /// Drop every binding and call frame
    pub fn clear(&mut self) {
        self.frames.truncate(1);
        self.frames[0].vars.clear();
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}
