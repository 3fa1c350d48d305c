//! Per-root cache of merged documentation graphs

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures_util::FutureExt;
use serde::Serialize;

use crate::error::DocError;
use crate::extract::DocExtractor;
use crate::loader::{CachedResource, Loader};
use crate::lru::WeightedLru;
use crate::merge::merge_entries;
use crate::model::DocNode;
use crate::resource_cache::SharedResourceCache;

/// Default number of graphs kept before the least recently used is dropped.
pub const DEFAULT_MAX_GRAPHS: usize = 512;

/// Wall-clock split of one graph build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildTimings {
    /// Until the last module load returned.
    pub graph_ms: u64,
    /// From the last module load to the end of extraction.
    pub doc_ms: u64,
}

/// Merged documentation for one root specifier. Immutable once cached.
#[derive(Debug, Clone, Serialize)]
pub struct DocGraph {
    pub root: String,
    pub entries: Vec<DocNode>,
    pub built_at: DateTime<Utc>,
    pub timings: BuildTimings,
}

/// Wraps the shared loader for a single build and remembers when the most
/// recent load finished.
struct TrackingLoader {
    inner: Arc<dyn Loader>,
    last_load: Mutex<Option<Instant>>,
    loads: AtomicUsize,
}

impl TrackingLoader {
    fn new(inner: Arc<dyn Loader>) -> Self {
        TrackingLoader {
            inner,
            last_load: Mutex::new(None),
            loads: AtomicUsize::new(0),
        }
    }

    fn last_load(&self) -> Option<Instant> {
        *self.last_load.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait::async_trait]
impl Loader for TrackingLoader {
    async fn load(&self, specifier: &str) -> Option<Arc<CachedResource>> {
        let resource = self.inner.load(specifier).await;
        self.loads.fetch_add(1, Ordering::Relaxed);
        *self.last_load.lock().unwrap_or_else(PoisonError::into_inner) = Some(Instant::now());
        resource
    }
}

/// Cache of documentation graphs keyed by the exact root specifier string.
///
/// Concurrent misses for the same root are not coalesced: each caller runs
/// its own build and the last one to finish is what stays cached.
pub struct GraphCache {
    extractor: Arc<dyn DocExtractor>,
    loader: Arc<dyn Loader>,
    max_graphs: usize,
    graphs: Mutex<WeightedLru<Arc<DocGraph>>>,
    builds: AtomicUsize,
}

impl GraphCache {
    pub fn new(extractor: Arc<dyn DocExtractor>, loader: Arc<dyn Loader>, max_graphs: usize) -> Self {
        GraphCache {
            extractor,
            loader,
            max_graphs,
            graphs: Mutex::new(WeightedLru::new()),
            builds: AtomicUsize::new(0),
        }
    }

    /// Cached graph for `root`, if any.
    pub fn get(&self, root: &str) -> Option<Arc<DocGraph>> {
        self.lock().get(root).cloned()
    }

    /// Return the cached graph for `root`, building and caching it on a miss.
    pub async fn get_or_build(&self, root: &str) -> Result<Arc<DocGraph>, DocError> {
        if let Some(graph) = self.get(root) {
            tracing::debug!(root, "graph cache hit");
            return Ok(graph);
        }
        tracing::debug!(root, "graph cache miss");

        let graph = Arc::new(self.build(root).await?);
        self.store(root, Arc::clone(&graph));
        Ok(graph)
    }

    /// Drop the cached graph for `root`. Returns whether one was cached.
    pub fn invalidate(&self, root: &str) -> bool {
        self.lock().remove(root).is_some()
    }

    /// Drop cached graphs whose root is evicted from `resources`.
    pub fn invalidate_on_eviction(self: &Arc<Self>, resources: &SharedResourceCache) {
        let graphs = Arc::downgrade(self);
        resources.set_eviction_hook(Arc::new(move |evicted: &[String]| {
            let Some(graphs) = graphs.upgrade() else {
                return;
            };
            for specifier in evicted {
                if graphs.invalidate(specifier) {
                    tracing::debug!(root = %specifier, "dropped graph with evicted root");
                }
            }
        }));
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn max_graphs(&self) -> usize {
        self.max_graphs
    }

    /// Number of extraction runs started so far.
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    pub fn extractor_name(&self) -> &str {
        self.extractor.name()
    }

    async fn build(&self, root: &str) -> Result<DocGraph, DocError> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        let tracker = TrackingLoader::new(Arc::clone(&self.loader));
        let start = Instant::now();

        let outcome = AssertUnwindSafe(self.extractor.extract(root, &tracker))
            .catch_unwind()
            .await;
        let end = Instant::now();

        let nodes = match outcome {
            Ok(Ok(nodes)) => nodes,
            Ok(Err(err)) => {
                let err = DocError::from_extract(root, err);
                tracing::warn!(root, error = %err, "documentation extraction failed");
                return Err(err);
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(root, panic = %message, "documentation extractor panicked");
                return Err(DocError::Internal(message));
            }
        };

        let last_load = tracker.last_load().unwrap_or(start).clamp(start, end);
        let timings = BuildTimings {
            graph_ms: millis(last_load - start),
            doc_ms: millis(end - last_load),
        };
        let entries = merge_entries(nodes);
        tracing::info!(
            root,
            graph_ms = timings.graph_ms,
            doc_ms = timings.doc_ms,
            loads = tracker.loads.load(Ordering::Relaxed),
            entries = entries.len(),
            "built documentation graph"
        );

        Ok(DocGraph {
            root: root.to_string(),
            entries,
            built_at: Utc::now(),
            timings,
        })
    }

    fn store(&self, root: &str, graph: Arc<DocGraph>) {
        let mut graphs = self.lock();
        graphs.insert(root.to_string(), graph, 1);
        while graphs.total_weight() > self.max_graphs {
            match graphs.pop_lru() {
                Some((evicted, _, _)) => {
                    tracing::debug!(root = %evicted, "evicted cached graph");
                }
                None => break,
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, WeightedLru<Arc<DocGraph>>> {
        self.graphs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for GraphCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphCache")
            .field("extractor", &self.extractor.name())
            .field("graphs", &self.len())
            .field("max_graphs", &self.max_graphs)
            .finish()
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::StaticLoader;
    use crate::test_utils::{Fixture, FixtureExtractor, function, namespace};

    const ROOT: &str = "https://example.com/mod.ts";

    fn cache_with(fixture: Fixture, loader: Arc<StaticLoader>) -> (GraphCache, Arc<FixtureExtractor>) {
        let extractor = Arc::new(FixtureExtractor::new(fixture));
        let cache = GraphCache::new(extractor.clone(), loader, DEFAULT_MAX_GRAPHS);
        (cache, extractor)
    }

    #[tokio::test]
    async fn test_second_call_reuses_graph() {
        let loader = Arc::new(StaticLoader::new().with_module(ROOT, "export {}"));
        let extractor = Arc::new(
            FixtureExtractor::new(Fixture::nodes(vec![function("a")])).loading(vec![ROOT.to_string()]),
        );
        let cache = GraphCache::new(extractor.clone(), loader.clone(), DEFAULT_MAX_GRAPHS);

        let first = cache.get_or_build(ROOT).await.unwrap();
        let second = cache.get_or_build(ROOT).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(extractor.calls(), 1);
        assert_eq!(loader.calls(), 1);
        assert_eq!(cache.builds(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_misses_each_build() {
        let loader = Arc::new(StaticLoader::new());
        let extractor = Arc::new(
            FixtureExtractor::new(Fixture::nodes(vec![function("a")]))
                .with_doc_delay(Duration::from_millis(10)),
        );
        let cache = GraphCache::new(extractor.clone(), loader, DEFAULT_MAX_GRAPHS);

        let (first, second) = tokio::join!(cache.get_or_build(ROOT), cache.get_or_build(ROOT));
        let (first, second) = (first.unwrap(), second.unwrap());

        assert_eq!(cache.builds(), 2);
        assert_eq!(extractor.calls(), 2);
        assert_eq!(first.entries, second.entries);
        assert_eq!(cache.len(), 1);
        let cached = cache.get(ROOT).unwrap();
        assert!(Arc::ptr_eq(&cached, &first) || Arc::ptr_eq(&cached, &second));
    }

    #[tokio::test]
    async fn test_key_is_exact_string() {
        let loader = Arc::new(StaticLoader::new());
        let (cache, extractor) = cache_with(Fixture::nodes(vec![]), loader);

        cache.get_or_build(ROOT).await.unwrap();
        cache.get_or_build("https://example.com/./mod.ts").await.unwrap();

        assert_eq!(extractor.calls(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_result_is_merged() {
        let loader = Arc::new(StaticLoader::new());
        let nodes = vec![
            namespace("Foo", vec![function("x")]),
            namespace("Foo", vec![function("y")]),
        ];
        let (cache, _) = cache_with(Fixture::nodes(nodes), loader);

        let graph = cache.get_or_build(ROOT).await.unwrap();

        assert_eq!(graph.entries.len(), 1);
        assert_eq!(graph.entries[0].namespace_elements().unwrap().len(), 2);
        assert_eq!(graph.root, ROOT);
    }

    #[tokio::test]
    async fn test_missing_root_is_not_cached() {
        let loader = Arc::new(StaticLoader::new());
        let (cache, extractor) = cache_with(Fixture::Unloadable, loader);

        let err = cache.get_or_build(ROOT).await.unwrap_err();
        assert!(matches!(err, DocError::UnresolvableRoot { .. }));

        let _ = cache.get_or_build(ROOT).await;
        assert_eq!(extractor.calls(), 2);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_syntax_error_is_invalid_graph() {
        let loader = Arc::new(StaticLoader::new());
        let (cache, _) = cache_with(Fixture::Syntax, loader);

        let err = cache.get_or_build(ROOT).await.unwrap_err();
        assert!(matches!(err, DocError::InvalidGraph { .. }));
    }

    #[tokio::test]
    async fn test_panicking_extractor_is_internal() {
        let loader = Arc::new(StaticLoader::new());
        let (cache, _) = cache_with(Fixture::Panic, loader);

        let err = cache.get_or_build(ROOT).await.unwrap_err();
        match err {
            DocError::Internal(message) => assert!(message.contains("fixture panic")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_bounded_by_entry_count() {
        let loader = Arc::new(StaticLoader::new());
        let extractor = Arc::new(FixtureExtractor::new(Fixture::nodes(vec![])));
        let cache = GraphCache::new(extractor, loader, 2);

        cache.get_or_build("https://a.test/mod.ts").await.unwrap();
        cache.get_or_build("https://b.test/mod.ts").await.unwrap();
        // touch a so b is the least recent
        assert!(cache.get("https://a.test/mod.ts").is_some());
        cache.get_or_build("https://c.test/mod.ts").await.unwrap();

        assert_eq!(cache.len(), 2);
        assert!(cache.get("https://b.test/mod.ts").is_none());
        assert!(cache.get("https://a.test/mod.ts").is_some());
    }

    #[tokio::test]
    async fn test_resource_eviction_invalidates_graph() {
        let loader = Arc::new(StaticLoader::new());
        let extractor = Arc::new(FixtureExtractor::new(Fixture::nodes(vec![])));
        let cache = Arc::new(GraphCache::new(extractor, loader, DEFAULT_MAX_GRAPHS));
        let resources = SharedResourceCache::new(10);
        cache.invalidate_on_eviction(&resources);

        cache.get_or_build(ROOT).await.unwrap();
        resources.put(
            ROOT,
            Arc::new(CachedResource::new(ROOT, ROOT, Default::default(), "0123456789abc")),
        );
        resources.evict_if_needed();

        assert!(cache.get(ROOT).is_none());
    }

    #[tokio::test]
    async fn test_timings_split_on_last_load() {
        let loader = Arc::new(StaticLoader::new().with_module(ROOT, "export {}"));
        let extractor = Arc::new(
            FixtureExtractor::new(Fixture::nodes(vec![]))
                .loading(vec![ROOT.to_string()])
                .with_doc_delay(Duration::from_millis(30)),
        );
        let cache = GraphCache::new(extractor, loader, DEFAULT_MAX_GRAPHS);

        let graph = cache.get_or_build(ROOT).await.unwrap();

        assert!(graph.timings.doc_ms >= 25, "doc time was {:?}", graph.timings);
    }
}
