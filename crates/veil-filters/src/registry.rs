//! Filter registry
//!
//! Filters are a closed set registered by explicit construction at startup.
//! Registration order is stable and documented: it is the final tie-break
//! in overlap resolution, so it must never depend on discovery order or
//! hashing.

use std::sync::Arc;

use veil_accel::{AccelFlags, ScannerCache};

use crate::builtin;
use crate::Filter;

#[derive(Default)]
pub struct FilterRegistry {
    filters: Vec<Arc<dyn Filter>>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Registry with the built-in detector set, registered in priority-table
    /// order (direct identifiers first).
    pub fn with_defaults(flags: AccelFlags) -> Self {
        Self::with_defaults_cached(flags, &ScannerCache::default())
    }

    /// Like `with_defaults`, compiling multi-pattern automatons through a
    /// caller-owned `scanners` cache shared across registries.
    pub fn with_defaults_cached(flags: AccelFlags, scanners: &ScannerCache) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(builtin::ssn::SsnFilter::new()));
        registry.register(Arc::new(builtin::mrn::MrnFilter::new()));
        registry.register(Arc::new(builtin::email::EmailFilter::new()));
        registry.register(Arc::new(builtin::phone::PhoneFilter::new()));
        registry.register(Arc::new(builtin::ip::IpFilter::new()));
        registry.register(Arc::new(builtin::url::UrlFilter::new()));
        registry.register(Arc::new(builtin::date::DateFilter::new()));
        registry.register(Arc::new(builtin::zipcode::ZipCodeFilter::new()));
        registry.register(Arc::new(builtin::name::NameFilter::with_cache(flags, scanners)));
        registry
    }

    /// Append a filter. Its registration index is its position.
    pub fn register(&mut self, filter: Arc<dyn Filter>) {
        tracing::debug!(filter = filter.name(), index = self.filters.len(), "filter registered");
        self.filters.push(filter);
    }

    /// Filters in registration order.
    pub fn filters(&self) -> &[Arc<dyn Filter>] {
        &self.filters
    }

    /// Registration index for a source tag, used by overlap resolution.
    pub fn registration_index(&self, source: &str) -> Option<usize> {
        self.filters.iter().position(|f| f.name() == source)
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_ordered_and_unique() {
        let registry = FilterRegistry::with_defaults(AccelFlags::default());
        assert!(registry.len() >= 9);
        let names: Vec<_> = registry.filters().iter().map(|f| f.name()).collect();
        let unique: std::collections::HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
        // Direct identifiers come first.
        assert_eq!(names[0], "ssn");
        assert_eq!(names[1], "mrn");
    }

    #[test]
    fn test_shared_cache_compiles_one_trigger_automaton() {
        let cache = ScannerCache::default();
        let _a = FilterRegistry::with_defaults_cached(AccelFlags::default(), &cache);
        let _b = FilterRegistry::with_defaults_cached(AccelFlags::default(), &cache);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_registration_index_matches_insert_order() {
        let registry = FilterRegistry::with_defaults(AccelFlags::default());
        assert_eq!(registry.registration_index("ssn"), Some(0));
        assert_eq!(registry.registration_index("mrn"), Some(1));
        assert_eq!(registry.registration_index("nope"), None);
    }
}
