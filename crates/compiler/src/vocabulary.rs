//! The registry of filters and tags a compiler resolves names against.

use crate::error::CompileError;
use crate::filter::Filter;
use crate::tag::Tag;
use crate::{filters, tags};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Filters and tags by name.
///
/// `Vocabulary::default()` holds the built-ins. Registering a name that is
/// already taken is an error rather than a silent override.
#[derive(Clone)]
pub struct Vocabulary {
    filters: HashMap<String, Arc<dyn Filter>>,
    tags: HashMap<String, Arc<dyn Tag>>,
}

impl Vocabulary {
    /// A vocabulary with no filters or tags at all.
    pub fn empty() -> Self {
        Self {
            filters: HashMap::new(),
            tags: HashMap::new(),
        }
    }

    pub fn register_filter(&mut self, filter: Arc<dyn Filter>) -> Result<(), CompileError> {
        let name = filter.name().to_string();
        if self.filters.contains_key(&name) {
            return Err(CompileError::DuplicateName { kind: "filter", name });
        }
        log::debug!("Registered filter '{}'", name);
        self.filters.insert(name, filter);
        Ok(())
    }

    pub fn register_tag(&mut self, tag: Arc<dyn Tag>) -> Result<(), CompileError> {
        let name = tag.name().to_string();
        if self.tags.contains_key(&name) {
            return Err(CompileError::DuplicateName { kind: "tag", name });
        }
        log::debug!("Registered tag '{}'", name);
        self.tags.insert(name, tag);
        Ok(())
    }

    pub fn filter(&self, name: &str) -> Option<Arc<dyn Filter>> {
        self.filters.get(name).cloned()
    }

    pub fn tag(&self, name: &str) -> Option<Arc<dyn Tag>> {
        self.tags.get(name).cloned()
    }

    pub fn filter_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.filters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn tag_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tags.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        let mut vocabulary = Self::empty();
        for filter in filters::builtins() {
            vocabulary.filters.insert(filter.name().to_string(), filter);
        }
        for tag in tags::builtins() {
            vocabulary.tags.insert(tag.name().to_string(), tag);
        }
        vocabulary
    }
}

impl fmt::Debug for Vocabulary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vocabulary")
            .field("filters", &self.filter_names())
            .field("tags", &self.tag_names())
            .finish()
    }
}
