//! Defines helper routines and the set that generated code calls into.
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// The signature for a helper routine implementation.
///
/// Helpers report failures as a plain message; the engine attaches the helper name.
pub type HelperFn = fn(args: &[Value]) -> Result<Value, String>;

/// A named helper routine definition.
#[derive(Clone, Copy)]
pub struct Helper {
    pub name: &'static str,
    /// Parameter names, used for listings and diagnostics only.
    pub params: &'static [&'static str],
    pub func: HelperFn,
}

impl Helper {
    pub const fn new(name: &'static str, params: &'static [&'static str], func: HelperFn) -> Self {
        Self { name, params, func }
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, String> {
        (self.func)(args)
    }
}

impl fmt::Debug for Helper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Helper")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("func", &"<function>")
            .finish()
    }
}

impl fmt::Display for Helper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "helper {}({})", self.name, self.params.join(", "))
    }
}

/// A set of helpers keyed by name.
///
/// Registration never overwrites: the first definition for a name wins, so a
/// filter used many times in one template contributes exactly one definition.
#[derive(Debug, Clone, Default)]
pub struct HelperSet {
    helpers: BTreeMap<String, Helper>,
}

impl HelperSet {
    /// Creates a new, empty helper set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a helper. Returns `false` (and changes nothing) if the name is taken.
    pub fn register(&mut self, helper: Helper) -> bool {
        use std::collections::btree_map::Entry;
        match self.helpers.entry(helper.name.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(helper);
                true
            }
        }
    }

    /// Finds a helper by name.
    pub fn get(&self, name: &str) -> Option<&Helper> {
        self.helpers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.helpers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.helpers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.helpers.is_empty()
    }

    /// Iterates helpers in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Helper> {
        self.helpers.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first(args: &[Value]) -> Result<Value, String> {
        Ok(args.first().cloned().unwrap_or(Value::Null))
    }

    fn second(_args: &[Value]) -> Result<Value, String> {
        Ok(Value::from("second"))
    }

    #[test]
    fn register_is_idempotent_and_keeps_first_definition() {
        let mut set = HelperSet::new();
        assert!(set.register(Helper::new("pick", &["value"], first)));
        assert!(!set.register(Helper::new("pick", &["value"], first)));
        assert!(!set.register(Helper::new("pick", &[], second)));
        assert_eq!(set.len(), 1);

        let picked = set.get("pick").unwrap().call(&[Value::from(7)]).unwrap();
        assert_eq!(picked, Value::from(7));
    }

    #[test]
    fn display_shows_signature() {
        let helper = Helper::new("format_file_size", &["bytes"], first);
        assert_eq!(helper.to_string(), "helper format_file_size(bytes)");
    }
}
