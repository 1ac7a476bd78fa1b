//! The context stack: layered variable frames visible to every render in a session.

use crate::error::ContextError;
use serde_json::Value;
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use vellum_expr::VariableSource;

pub type Frame = HashMap<String, Value>;

/// Ordered variable frames, searched from the top down.
///
/// The base frame always exists and holds session-wide variables. Nested
/// renders push a frame on entry and pop it on exit, so variables they `set`
/// disappear when they finish while base variables stay visible throughout.
#[derive(Debug, Clone, Default)]
pub struct ContextStack {
    base: Frame,
    scopes: Vec<Frame>,
}

impl ContextStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames, counting the base frame.
    pub fn depth(&self) -> usize {
        self.scopes.len() + 1
    }

    pub fn push(&mut self) {
        self.scopes.push(Frame::new());
        log::trace!("Pushed context frame (depth {})", self.depth());
    }

    /// Pops the top frame. The base frame is never popped.
    pub fn pop(&mut self) -> Option<Frame> {
        let frame = self.scopes.pop();
        match &frame {
            Some(_) => log::trace!("Popped context frame (depth {})", self.depth()),
            None => log::warn!("Ignoring attempt to pop the base context frame"),
        }
        frame
    }

    /// Runs `f` with a fresh frame pushed. The frame and anything pushed above
    /// it are removed on every exit path, unwinding included.
    pub fn scoped<R>(&mut self, f: impl FnOnce(&mut ContextStack) -> R) -> R {
        let mut guard = ScopeGuard::new(self);
        f(&mut *guard)
    }

    fn top_mut(&mut self) -> &mut Frame {
        match self.scopes.last_mut() {
            Some(frame) => frame,
            None => &mut self.base,
        }
    }

    /// Writes into the top frame.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.top_mut().insert(name.into(), value);
    }

    pub fn set_all<I, K>(&mut self, variables: I)
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let top = self.top_mut();
        for (name, value) in variables {
            top.insert(name.into(), value);
        }
    }

    /// Writes into the base frame, whatever the current depth.
    pub fn set_global(&mut self, name: impl Into<String>, value: Value) {
        self.base.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Result<&Value, ContextError> {
        self.frames_top_down()
            .find_map(|frame| frame.get(name))
            .ok_or_else(|| ContextError::NoSuchVariable(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.frames_top_down().any(|frame| frame.contains_key(name))
    }

    /// Removes `name` from the topmost frame that holds it. Absent names are ignored.
    pub fn delete(&mut self, name: &str) -> Option<Value> {
        for frame in self.scopes.iter_mut().rev() {
            if let Some(value) = frame.remove(name) {
                return Some(value);
            }
        }
        self.base.remove(name)
    }

    fn frames_top_down(&self) -> impl Iterator<Item = &Frame> {
        self.scopes.iter().rev().chain(std::iter::once(&self.base))
    }

    /// Drops frames until at most `depth` remain. The base frame always stays.
    pub fn restore_depth(&mut self, depth: usize) {
        if depth < self.depth() {
            self.scopes.truncate(depth.saturating_sub(1));
            log::trace!("Restored context depth {}", self.depth());
        }
    }
}

impl VariableSource for ContextStack {
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.get(name).ok()
    }
}

/// Pushes a frame on creation and restores the previous depth on drop.
pub struct ScopeGuard<'a> {
    stack: &'a mut ContextStack,
    restore_to: usize,
}

impl<'a> ScopeGuard<'a> {
    pub fn new(stack: &'a mut ContextStack) -> Self {
        let restore_to = stack.depth();
        stack.push();
        Self { stack, restore_to }
    }
}

impl Deref for ScopeGuard<'_> {
    type Target = ContextStack;

    fn deref(&self) -> &ContextStack {
        self.stack
    }
}

impl DerefMut for ScopeGuard<'_> {
    fn deref_mut(&mut self) -> &mut ContextStack {
        self.stack
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.stack.restore_depth(self.restore_to);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::panic::{AssertUnwindSafe, catch_unwind};

    #[test]
    fn lookup_searches_top_down() {
        let mut stack = ContextStack::new();
        stack.set("title", json!("base"));
        stack.set("user", json!("ann"));
        stack.push();
        stack.set("title", json!("inner"));

        assert_eq!(stack.get("title").unwrap(), &json!("inner"));
        assert_eq!(stack.get("user").unwrap(), &json!("ann"));
        assert_eq!(
            stack.get("missing"),
            Err(ContextError::NoSuchVariable("missing".into()))
        );

        stack.pop();
        assert_eq!(stack.get("title").unwrap(), &json!("base"));
    }

    #[test]
    fn base_frame_is_never_popped() {
        let mut stack = ContextStack::new();
        stack.set("kept", json!(1));
        assert!(stack.pop().is_none());
        assert_eq!(stack.depth(), 1);
        assert!(stack.contains("kept"));
    }

    #[test]
    fn set_global_targets_base_frame() {
        let mut stack = ContextStack::new();
        stack.push();
        stack.set_global("site", json!("vellum"));
        stack.set("local", json!(true));
        stack.pop();
        assert!(stack.contains("site"));
        assert!(!stack.contains("local"));
    }

    #[test]
    fn delete_removes_from_topmost_holder() {
        let mut stack = ContextStack::new();
        stack.set("x", json!("outer"));
        stack.push();
        stack.set("x", json!("inner"));

        assert_eq!(stack.delete("x"), Some(json!("inner")));
        assert_eq!(stack.get("x").unwrap(), &json!("outer"));
        assert_eq!(stack.delete("nope"), None);
    }

    #[test]
    fn scoped_restores_depth_on_error_and_panic() {
        let mut stack = ContextStack::new();
        let result: Result<(), &str> = stack.scoped(|inner| {
            inner.set("temp", json!(1));
            inner.push();
            Err("failed")
        });
        assert!(result.is_err());
        assert_eq!(stack.depth(), 1);
        assert!(!stack.contains("temp"));

        let unwound = catch_unwind(AssertUnwindSafe(|| {
            let _: () = stack.scoped(|_| panic!("boom"));
        }));
        assert!(unwound.is_err());
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn set_all_writes_top_frame() {
        let mut stack = ContextStack::new();
        stack.push();
        stack.set_all([("a", json!(1)), ("b", json!(2))]);
        assert_eq!(stack.get("b").unwrap(), &json!(2));
        stack.pop();
        assert!(!stack.contains("a"));
    }
}
