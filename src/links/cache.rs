use super::types::CachedPreview;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Mutex, PoisonError};

/// Bounded least-recently-used cache of preview results keyed by URL.
///
/// `get` counts as a use. Inserting a new key into a full cache evicts the
/// least recently used entry. A capacity of zero stores nothing.
#[derive(Debug)]
pub struct PreviewCache {
    capacity: usize,
    inner: Option<Mutex<LruCache<String, CachedPreview>>>,
}

impl PreviewCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap))),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, url: &str) -> Option<CachedPreview> {
        self.inner
            .as_ref()?
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .cloned()
    }

    /// Store `preview` under `url`, returning the key evicted to make room.
    pub fn insert(&self, url: &str, preview: CachedPreview) -> Option<String> {
        let mut cache = self
            .inner
            .as_ref()?
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // `push` hands back the replaced pair when the key was already present.
        match cache.push(url.to_string(), preview) {
            Some((key, _)) if key != url => Some(key),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.as_ref().map_or(0, |cache| {
            cache.lock().unwrap_or_else(PoisonError::into_inner).len()
        })
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
