//! # Render Cache
//!
//! Content-addressable store mapping (template id, document type,
//! canonical document hash) → finished HTML.
//!
//! ## Concurrency Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  16 shards, each its own RwLock<HashMap>. The shard is picked by       │
//! │  hashing the key, so concurrent renders for different templates or     │
//! │  documents almost never contend on the same lock.                      │
//! │                                                                         │
//! │  Writes are inserts only: the key is derived from the inputs, so a     │
//! │  second write for the same key carries identical HTML and is a no-op.  │
//! │  No entry is ever mutated in place; no transactional rollback needed.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Bounding
//! Entries are content-addressed and never stale, so eviction is purely a
//! memory bound: each shard holds at most `max_per_shard` entries and
//! evicts its oldest-inserted entry when full.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tracing::debug;

use docforge_core::DocumentType;

const SHARD_COUNT: usize = 16;

// =============================================================================
// Key & Entry
// =============================================================================

/// Cache key: the full addressing triple. The canonical hash already
/// covers template id and document type, but keeping them explicit makes
/// keys self-describing in logs and debuggers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub template_id: String,
    pub document_type: DocumentType,
    pub canonical_hash: String,
}

/// Immutable once written. `seq` is the global insertion order, used for
/// oldest-first eviction.
struct CacheEntry {
    html: Arc<str>,
    seq: u64,
}

/// Point-in-time cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

// =============================================================================
// Render Cache
// =============================================================================

/// Sharded, bounded, idempotent-write render-result cache.
pub struct RenderCache {
    shards: Vec<RwLock<HashMap<CacheKey, CacheEntry>>>,
    max_per_shard: usize,
    insert_seq: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl RenderCache {
    /// Creates a cache bounded at roughly `max_entries` total.
    pub fn new(max_entries: usize) -> Self {
        let max_per_shard = (max_entries / SHARD_COUNT).max(1);
        RenderCache {
            shards: (0..SHARD_COUNT)
                .map(|_| RwLock::new(HashMap::new()))
                .collect(),
            max_per_shard,
            insert_seq: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    fn shard_for(&self, key: &CacheKey) -> &RwLock<HashMap<CacheKey, CacheEntry>> {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        &self.shards[(hasher.finish() as usize) % SHARD_COUNT]
    }

    /// Looks up the finished HTML for a key.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<str>> {
        let shard = self.shard_for(key).read().unwrap_or_else(|e| e.into_inner());
        match shard.get(key) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(Arc::clone(&entry.html))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Inserts finished HTML for a key. Idempotent: if the key is already
    /// present the call is a no-op (content addressing guarantees the
    /// stored HTML is identical).
    pub fn put(&self, key: CacheKey, html: Arc<str>) {
        let mut shard = self
            .shard_for(&key)
            .write()
            .unwrap_or_else(|e| e.into_inner());

        if shard.contains_key(&key) {
            return;
        }

        if shard.len() >= self.max_per_shard {
            // Evict the oldest-inserted entry in this shard.
            if let Some(oldest) = shard
                .iter()
                .min_by_key(|(_, entry)| entry.seq)
                .map(|(k, _)| k.clone())
            {
                debug!(template_id = %oldest.template_id, "render cache evicting oldest entry");
                shard.remove(&oldest);
            }
        }

        shard.insert(
            key,
            CacheEntry {
                html,
                seq: self.insert_seq.fetch_add(1, Ordering::Relaxed),
            },
        );
    }

    /// Total number of cached entries.
    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|s| s.read().unwrap_or_else(|e| e.into_inner()).len())
            .sum()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every cached entry.
    pub fn clear(&self) {
        for shard in &self.shards {
            shard.write().unwrap_or_else(|e| e.into_inner()).clear();
        }
    }

    /// Current counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn key(template_id: &str, hash: &str) -> CacheKey {
        CacheKey {
            template_id: template_id.into(),
            document_type: DocumentType::Invoice,
            canonical_hash: hash.into(),
        }
    }

    #[test]
    fn test_get_put_roundtrip() {
        let cache = RenderCache::new(1024);
        assert!(cache.get(&key("classic", "h1")).is_none());

        cache.put(key("classic", "h1"), Arc::from("<html>1</html>"));
        let html = cache.get(&key("classic", "h1")).unwrap();
        assert_eq!(&*html, "<html>1</html>");

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn test_put_is_idempotent() {
        let cache = RenderCache::new(1024);
        cache.put(key("classic", "h1"), Arc::from("first"));
        cache.put(key("classic", "h1"), Arc::from("second"));

        // First write wins; the second is a no-op.
        assert_eq!(&*cache.get(&key("classic", "h1")).unwrap(), "first");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_distinct_hashes_are_distinct_entries() {
        let cache = RenderCache::new(1024);
        cache.put(key("classic", "h1"), Arc::from("a"));
        cache.put(key("classic", "h2"), Arc::from("b"));
        assert_eq!(cache.len(), 2);
        assert_eq!(&*cache.get(&key("classic", "h2")).unwrap(), "b");
    }

    #[test]
    fn test_bounded_eviction_drops_oldest() {
        // max_entries 16 → 1 entry per shard; the second insert into a
        // shard evicts the first.
        let cache = RenderCache::new(16);
        for i in 0..200 {
            cache.put(key("t", &format!("h{i}")), Arc::from("x"));
        }
        assert!(cache.len() <= SHARD_COUNT);
    }

    #[test]
    fn test_clear() {
        let cache = RenderCache::new(1024);
        cache.put(key("classic", "h1"), Arc::from("a"));
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_distinct_keys() {
        let cache = Arc::new(RenderCache::new(4096));
        let mut handles = Vec::new();
        for t in 0..8 {
            let cache = Arc::clone(&cache);
            handles.push(std::thread::spawn(move || {
                for i in 0..100 {
                    let k = key(&format!("tpl-{t}"), &format!("h{i}"));
                    cache.put(k.clone(), Arc::from("html"));
                    assert!(cache.get(&k).is_some());
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(cache.len(), 800);
    }
}
