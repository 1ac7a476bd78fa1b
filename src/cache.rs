// src/cache.rs
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::SystemTime;
use vellum_template_core::CodeUnit;

#[derive(Debug, Clone)]
struct CachedUnit {
    modified: Option<SystemTime>,
    unit: Arc<CodeUnit>,
}

/// Compiled units by view name, each tagged with the source file's
/// modification time when it was compiled.
///
/// Entries are replaced whole on recompile and never mutated in place.
#[derive(Debug, Default)]
pub struct UnitCache {
    entries: RwLock<HashMap<String, CachedUnit>>,
}

impl UnitCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached unit if it was compiled from a source with the same
    /// modification time.
    pub fn get_fresh(&self, name: &str, modified: Option<SystemTime>) -> Option<Arc<CodeUnit>> {
        let entries = self.entries.read().ok()?;
        let cached = entries.get(name)?;
        if modified.is_some() && cached.modified == modified {
            Some(cached.unit.clone())
        } else {
            None
        }
    }

    pub fn insert(&self, name: &str, modified: Option<SystemTime>, unit: Arc<CodeUnit>) {
        match self.entries.write() {
            Ok(mut entries) => {
                entries.insert(name.to_string(), CachedUnit { modified, unit });
            }
            Err(_) => log::warn!("Unit cache lock is poisoned; not caching '{}'", name),
        }
    }

    pub fn invalidate(&self, name: &str) {
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(name);
        }
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use vellum_template_core::CodeUnitBuilder;

    fn unit() -> Arc<CodeUnit> {
        Arc::new(CodeUnitBuilder::new().finish(Vec::new()).unwrap())
    }

    #[test]
    fn stale_entries_miss() {
        let cache = UnitCache::new();
        let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(10);
        let t1 = t0 + Duration::from_secs(1);
        cache.insert("home", Some(t0), unit());

        assert!(cache.get_fresh("home", Some(t0)).is_some());
        assert!(cache.get_fresh("home", Some(t1)).is_none());
        assert!(cache.get_fresh("other", Some(t0)).is_none());
    }

    #[test]
    fn unknown_modification_time_never_hits() {
        let cache = UnitCache::new();
        cache.insert("home", None, unit());
        assert!(cache.get_fresh("home", None).is_none());
        assert_eq!(cache.len(), 1);
        cache.invalidate("home");
        assert!(cache.is_empty());
    }

    #[test]
    fn clear_drops_every_entry() {
        let cache = UnitCache::new();
        let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(10);
        cache.insert("home", Some(t0), unit());
        cache.insert("about", Some(t0), unit());
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get_fresh("home", Some(t0)).is_none());
    }
}
