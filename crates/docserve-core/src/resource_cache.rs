//! Size-bounded cache of fetched module sources

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::loader::CachedResource;
use crate::lru::WeightedLru;

/// Default byte budget for cached sources.
pub const DEFAULT_MAX_BYTES: usize = 25_000_000;

/// Recency-ordered cache of fetched resources, bounded by total content size.
///
/// `put` never evicts by itself. Between a `put` and the next
/// [`evict_if_needed`](ResourceCache::evict_if_needed) the cache may sit
/// above its budget.
#[derive(Debug)]
pub struct ResourceCache {
    max_bytes: usize,
    entries: WeightedLru<Arc<CachedResource>>,
}

impl ResourceCache {
    pub fn new(max_bytes: usize) -> Self {
        ResourceCache {
            max_bytes,
            entries: WeightedLru::new(),
        }
    }

    /// Look up a specifier, marking it most recently used on a hit.
    pub fn get(&mut self, specifier: &str) -> Option<Arc<CachedResource>> {
        self.entries.get(specifier).cloned()
    }

    /// Insert or overwrite at the most recently used end.
    pub fn put(&mut self, specifier: impl Into<String>, resource: Arc<CachedResource>) {
        let size = resource.size_bytes();
        self.entries.insert(specifier.into(), resource, size);
    }

    /// Evict least recently used entries, whole entries at a time, until the
    /// cache fits its budget. Returns the evicted specifiers, oldest first.
    pub fn evict_if_needed(&mut self) -> Vec<String> {
        let mut evicted = Vec::new();
        while self.entries.total_weight() > self.max_bytes {
            match self.entries.pop_lru() {
                Some((specifier, _, _)) => evicted.push(specifier),
                None => break,
            }
        }
        evicted
    }

    pub fn contains(&self, specifier: &str) -> bool {
        self.entries.contains_key(specifier)
    }

    pub fn current_bytes(&self) -> usize {
        self.entries.total_weight()
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Specifiers from least to most recently used.
    pub fn specifiers(&self) -> Vec<String> {
        self.entries.keys().map(str::to_string).collect()
    }
}

impl Default for ResourceCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BYTES)
    }
}

/// Called with the specifiers removed by an eviction pass.
pub type EvictionHook = Arc<dyn Fn(&[String]) + Send + Sync>;

struct Shared {
    cache: Mutex<ResourceCache>,
    eviction_pending: AtomicBool,
    hook: Mutex<Option<EvictionHook>>,
}

/// Process-wide handle to a [`ResourceCache`].
///
/// Eviction after an insert is deferred onto the runtime so the caller that
/// just fetched a resource is handed its content before any bookkeeping runs.
#[derive(Clone)]
pub struct SharedResourceCache {
    inner: Arc<Shared>,
}

impl SharedResourceCache {
    pub fn new(max_bytes: usize) -> Self {
        SharedResourceCache {
            inner: Arc::new(Shared {
                cache: Mutex::new(ResourceCache::new(max_bytes)),
                eviction_pending: AtomicBool::new(false),
                hook: Mutex::new(None),
            }),
        }
    }

    /// Register a callback for evicted specifiers, replacing any previous one.
    pub fn set_eviction_hook(&self, hook: EvictionHook) {
        *self
            .inner
            .hook
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(hook);
    }

    pub fn get(&self, specifier: &str) -> Option<Arc<CachedResource>> {
        self.lock().get(specifier)
    }

    pub fn put(&self, specifier: impl Into<String>, resource: Arc<CachedResource>) {
        self.lock().put(specifier, resource);
        self.schedule_eviction();
    }

    /// Run an eviction pass now. Normally scheduled by `put`.
    pub fn evict_if_needed(&self) -> Vec<String> {
        self.inner.eviction_pending.store(false, Ordering::SeqCst);
        let evicted = self.lock().evict_if_needed();
        if !evicted.is_empty() {
            tracing::debug!(count = evicted.len(), "evicted cached resources");
            let hook = self
                .inner
                .hook
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone();
            if let Some(hook) = hook {
                hook(&evicted);
            }
        }
        evicted
    }

    pub fn contains(&self, specifier: &str) -> bool {
        self.lock().contains(specifier)
    }

    pub fn current_bytes(&self) -> usize {
        self.lock().current_bytes()
    }

    pub fn max_bytes(&self) -> usize {
        self.lock().max_bytes()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn specifiers(&self) -> Vec<String> {
        self.lock().specifiers()
    }

    fn schedule_eviction(&self) {
        if self.inner.eviction_pending.swap(true, Ordering::SeqCst) {
            return;
        }
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let pending = PendingEviction(self.clone());
                handle.spawn(async move {
                    drop(pending);
                });
            }
            Err(_) => {
                self.evict_if_needed();
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, ResourceCache> {
        self.inner
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Runs the deferred eviction pass when dropped, so a task discarded unpolled
/// by a shutting-down runtime still clears the pending flag.
struct PendingEviction(SharedResourceCache);

impl Drop for PendingEviction {
    fn drop(&mut self) {
        self.0.evict_if_needed();
    }
}

impl Default for SharedResourceCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BYTES)
    }
}

impl std::fmt::Debug for SharedResourceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cache = self.lock();
        f.debug_struct("SharedResourceCache")
            .field("entries", &cache.len())
            .field("current_bytes", &cache.current_bytes())
            .field("max_bytes", &cache.max_bytes())
            .finish()
    }
}
