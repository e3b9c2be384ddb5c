// src/services/dedup.rs

//! Process-lifetime set of visited website URLs.

use std::collections::HashSet;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// URLs already classified in this process.
///
/// Shared between the candidate source (pre-filtering) and the orchestrator
/// (membership after a successful analysis). `add` is an atomic
/// check-then-insert so concurrent analyses of the same URL cannot both claim it.
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: RwLock<HashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.read().contains(url)
    }

    /// Mark a URL visited. Returns true if it was not already present.
    pub fn add(&self, url: &str) -> bool {
        let mut urls = self.write();
        if urls.contains(url) {
            return false;
        }
        urls.insert(url.to_string())
    }

    /// Forget every URL so previously seen sites can be scanned again.
    pub fn clear(&self) {
        self.write().clear();
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // A panic while holding the lock cannot leave the set half-updated,
    // so poisoned guards are recovered.
    fn read(&self) -> RwLockReadGuard<'_, HashSet<String>> {
        self.urls.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashSet<String>> {
        self.urls.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_add_then_contains() {
        let visited = VisitedSet::new();
        assert!(!visited.contains("https://a.fr"));
        assert!(visited.add("https://a.fr"));
        assert!(visited.contains("https://a.fr"));
    }

    #[test]
    fn test_add_is_idempotent() {
        let visited = VisitedSet::new();
        assert!(visited.add("https://a.fr"));
        assert!(!visited.add("https://a.fr"));
        visited.add("https://b.fr");
        assert_eq!(visited.len(), 2);
    }

    #[test]
    fn test_clear_drops_membership() {
        let visited = VisitedSet::new();
        let urls = ["https://a.fr", "https://b.fr", "https://c.fr"];
        for url in urls {
            visited.add(url);
        }
        visited.clear();
        assert!(visited.is_empty());
        for url in urls {
            assert!(!visited.contains(url));
        }
    }

    #[test]
    fn test_concurrent_add_claims_once() {
        let visited = Arc::new(VisitedSet::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let visited = Arc::clone(&visited);
                std::thread::spawn(move || visited.add("https://same.fr"))
            })
            .collect();

        let claimed = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(claimed, 1);
        assert_eq!(visited.len(), 1);
    }
}
