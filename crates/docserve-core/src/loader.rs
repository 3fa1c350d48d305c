//! Module loading seam used while walking an import graph

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::Serialize;

/// Bytes fetched for one specifier. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CachedResource {
    /// The specifier that was requested.
    pub specifier: String,
    /// The URL the content was actually served from, after redirects.
    pub final_url: String,
    /// Response headers with lowercased names.
    pub headers: BTreeMap<String, String>,
    pub content: String,
}

impl CachedResource {
    pub fn new(
        specifier: impl Into<String>,
        final_url: impl Into<String>,
        headers: BTreeMap<String, String>,
        content: impl Into<String>,
    ) -> Self {
        CachedResource {
            specifier: specifier.into(),
            final_url: final_url.into(),
            headers,
            content: content.into(),
        }
    }

    /// Size charged against the resource cache budget.
    pub fn size_bytes(&self) -> usize {
        self.content.len()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type").map(String::as_str)
    }
}

/// Resolves a specifier to its source text.
///
/// Implementations never fail loudly: any problem resolving a specifier is
/// reported as `None`, meaning "this import cannot be resolved". Calls may
/// arrive concurrently, for the same or different specifiers.
#[async_trait::async_trait]
pub trait Loader: Send + Sync {
    async fn load(&self, specifier: &str) -> Option<Arc<CachedResource>>;
}

/// In-memory loader over a fixed set of modules.
///
/// Useful for documenting bundled sources and for exercising the graph
/// machinery without a network.
#[derive(Debug, Default)]
pub struct StaticLoader {
    modules: HashMap<String, Arc<CachedResource>>,
    calls: AtomicUsize,
}

impl StaticLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module served from its own specifier.
    pub fn with_module(self, specifier: &str, content: &str) -> Self {
        self.with_redirect(specifier, specifier, content)
    }

    /// Add a module whose content is reported as served from `final_url`.
    pub fn with_redirect(mut self, specifier: &str, final_url: &str, content: &str) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert(
            "content-type".to_string(),
            "application/typescript".to_string(),
        );
        let resource = CachedResource::new(specifier, final_url, headers, content);
        self.modules.insert(specifier.to_string(), Arc::new(resource));
        self
    }

    /// Number of `load` calls served so far, hits and misses alike.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Loader for StaticLoader {
    async fn load(&self, specifier: &str) -> Option<Arc<CachedResource>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.modules.get(specifier).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_loader_counts_calls() {
        let loader = StaticLoader::new().with_module("https://example.com/mod.ts", "export {};");

        let hit = loader.load("https://example.com/mod.ts").await;
        let miss = loader.load("https://example.com/other.ts").await;

        assert_eq!(hit.map(|r| r.content.clone()), Some("export {};".to_string()));
        assert!(miss.is_none());
        assert_eq!(loader.calls(), 2);
    }

    #[test]
    fn test_size_is_content_length() {
        let resource = CachedResource::new("a", "a", BTreeMap::new(), "12345");
        assert_eq!(resource.size_bytes(), 5);
        assert_eq!(resource.content_type(), None);
    }
}
