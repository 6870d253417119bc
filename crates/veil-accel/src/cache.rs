//! Bounded scanner cache
//!
//! Compiled automatons are expensive; the same pattern set is requested for
//! every document in a batch. The cache is an explicit, injected component
//! with a fixed capacity and insertion-order eviction — never an ambient
//! process-lifetime singleton.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use dashmap::DashMap;

use crate::{AccelFlags, MultiPatternScanner};

pub const DEFAULT_CAPACITY: usize = 64;

pub struct ScannerCache {
    scanners: DashMap<[u8; 32], Arc<MultiPatternScanner>>,
    insertion_order: Mutex<VecDeque<[u8; 32]>>,
    capacity: usize,
}

impl ScannerCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            scanners: DashMap::new(),
            insertion_order: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.scanners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scanners.is_empty()
    }

    /// Fetch the scanner for this pattern set, building it on first use.
    pub fn get_or_build(&self, patterns: &[String], flags: AccelFlags) -> Arc<MultiPatternScanner> {
        let key = cache_key(patterns, flags);
        if let Some(found) = self.scanners.get(&key) {
            return found.clone();
        }

        let scanner = Arc::new(MultiPatternScanner::new(patterns.to_vec(), flags));
        if self.scanners.insert(key, scanner.clone()).is_none() {
            let mut order = self
                .insertion_order
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            order.push_back(key);
            while order.len() > self.capacity {
                if let Some(evicted) = order.pop_front() {
                    self.scanners.remove(&evicted);
                    tracing::debug!("scanner cache full, evicted oldest entry");
                }
            }
        }
        scanner
    }

    pub fn clear(&self) {
        self.scanners.clear();
        self.insertion_order
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

impl Default for ScannerCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

fn cache_key(patterns: &[String], flags: AccelFlags) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    for pattern in patterns {
        hasher.update(&(pattern.len() as u64).to_le_bytes());
        hasher.update(pattern.as_bytes());
    }
    hasher.update(&[
        flags.force_reference_scan as u8,
        flags.force_reference_interval as u8,
        flags.force_reference_splice as u8,
    ]);
    *hasher.finalize().as_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_reuses_scanner_for_same_patterns() {
        let cache = ScannerCache::default();
        let a = cache.get_or_build(&patterns(&["dr", "mr"]), AccelFlags::default());
        let b = cache.get_or_build(&patterns(&["dr", "mr"]), AccelFlags::default());
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_flags_split_cache_entries() {
        let cache = ScannerCache::default();
        cache.get_or_build(&patterns(&["dr"]), AccelFlags::default());
        cache.get_or_build(&patterns(&["dr"]), AccelFlags::reference_only());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let cache = ScannerCache::new(2);
        cache.get_or_build(&patterns(&["a"]), AccelFlags::default());
        cache.get_or_build(&patterns(&["b"]), AccelFlags::default());
        cache.get_or_build(&patterns(&["c"]), AccelFlags::default());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_key_is_length_prefixed() {
        // ["ab"] and ["a", "b"] must not collide.
        let cache = ScannerCache::default();
        cache.get_or_build(&patterns(&["ab"]), AccelFlags::default());
        cache.get_or_build(&patterns(&["a", "b"]), AccelFlags::default());
        assert_eq!(cache.len(), 2);
    }
}
