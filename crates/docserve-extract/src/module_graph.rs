//! Module dependency graph loaded through a [`Loader`]

use std::collections::{HashMap, HashSet};

use docserve_core::{ExtractError, Loader};
use futures_util::future::join_all;
use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use reqwest::Url;

use crate::docs::ModuleSummary;

/// How one module depends on another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    Import,
    ReExport,
}

/// Resolve `specifier` as written in the module at `base`.
///
/// Relative and root-relative specifiers join onto `base`; absolute URLs
/// pass through. Bare specifiers such as `"react"` have no absolute form.
pub fn resolve_specifier(base: &str, specifier: &str) -> Option<String> {
    if specifier.starts_with("./") || specifier.starts_with("../") || specifier.starts_with('/') {
        let base = Url::parse(base).ok()?;
        return base.join(specifier).ok().map(String::from);
    }
    Url::parse(specifier).ok().map(String::from)
}

/// Every module reachable from a root, keyed by requested specifier.
pub struct ModuleGraph {
    inner: StableDiGraph<ModuleSummary, DependencyKind>,
    index: HashMap<String, NodeIndex>,
    root: NodeIndex,
}

impl std::fmt::Debug for ModuleGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleGraph")
            .field("root", &self.root().specifier)
            .field("module_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .finish()
    }
}

impl ModuleGraph {
    /// Load `root` and everything it reaches, one breadth-first layer at a
    /// time. Loads within a layer run concurrently and each specifier is
    /// requested at most once.
    pub async fn load(root: &str, loader: &dyn Loader) -> Result<Self, ExtractError> {
        let Some(resource) = loader.load(root).await else {
            return Err(ExtractError::UnableToLoad(root.to_string()));
        };

        let mut inner = StableDiGraph::new();
        let mut index = HashMap::new();
        let summary = ModuleSummary::analyze(root, &resource.final_url, &resource.content)?;
        let root_idx = inner.add_node(summary);
        index.insert(root.to_string(), root_idx);

        let mut requested: HashSet<String> = HashSet::from([root.to_string()]);
        let mut layer = vec![root_idx];
        let mut unresolved = 0usize;

        while !layer.is_empty() {
            let mut pending: Vec<(NodeIndex, String, DependencyKind)> = Vec::new();
            for &idx in &layer {
                let summary = &inner[idx];
                let reexports = summary.reexport_sources();
                for dep in summary.dependencies() {
                    let kind = if reexports.contains(&dep) {
                        DependencyKind::ReExport
                    } else {
                        DependencyKind::Import
                    };
                    pending.push((idx, dep, kind));
                }
            }

            let to_load: Vec<String> = pending
                .iter()
                .map(|(_, dep, _)| dep.clone())
                .filter(|dep| requested.insert(dep.clone()))
                .collect();
            let loaded = join_all(to_load.iter().map(|dep| loader.load(dep))).await;

            let mut next = Vec::new();
            for (specifier, resource) in to_load.into_iter().zip(loaded) {
                let Some(resource) = resource else {
                    tracing::debug!(specifier = %specifier, "dependency not loadable");
                    unresolved += 1;
                    continue;
                };
                let summary =
                    ModuleSummary::analyze(&specifier, &resource.final_url, &resource.content)?;
                let idx = inner.add_node(summary);
                index.insert(specifier, idx);
                next.push(idx);
            }

            for (from, dep, kind) in pending {
                if let Some(&to) = index.get(&dep) {
                    inner.add_edge(from, to, kind);
                }
            }
            layer = next;
        }

        tracing::debug!(
            root,
            modules = inner.node_count(),
            unresolved,
            "loaded module graph"
        );
        Ok(ModuleGraph {
            inner,
            index,
            root: root_idx,
        })
    }

    pub fn root(&self) -> &ModuleSummary {
        &self.inner[self.root]
    }

    pub fn module(&self, specifier: &str) -> Option<&ModuleSummary> {
        self.index.get(specifier).map(|&idx| &self.inner[idx])
    }

    pub fn module_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Specifiers `specifier` depends on with the given kind.
    pub fn dependencies_of(&self, specifier: &str, kind: DependencyKind) -> Vec<&str> {
        let Some(&idx) = self.index.get(specifier) else {
            return Vec::new();
        };
        self.inner
            .edges_directed(idx, Direction::Outgoing)
            .filter(|edge| *edge.weight() == kind)
            .map(|edge| self.inner[edge.target()].specifier.as_str())
            .collect()
    }

    /// The root plus every module whose exports flow into it through
    /// re-exports, in breadth-first order.
    pub fn exported_modules(&self) -> Vec<&ModuleSummary> {
        let mut seen = HashSet::from([self.root]);
        let mut order = vec![self.root];
        let mut cursor = 0;
        while cursor < order.len() {
            let idx = order[cursor];
            cursor += 1;
            for edge in self.inner.edges_directed(idx, Direction::Outgoing) {
                if *edge.weight() == DependencyKind::ReExport && seen.insert(edge.target()) {
                    order.push(edge.target());
                }
            }
        }
        order.into_iter().map(|idx| &self.inner[idx]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docserve_core::StaticLoader;

    #[test]
    fn test_resolve_specifier() {
        let base = "https://example.com/lib/mod.ts";
        assert_eq!(
            resolve_specifier(base, "./util.ts").as_deref(),
            Some("https://example.com/lib/util.ts")
        );
        assert_eq!(
            resolve_specifier(base, "../types.d.ts").as_deref(),
            Some("https://example.com/types.d.ts")
        );
        assert_eq!(
            resolve_specifier(base, "/std/fmt.ts").as_deref(),
            Some("https://example.com/std/fmt.ts")
        );
        assert_eq!(
            resolve_specifier(base, "https://cdn.example.com/x.ts").as_deref(),
            Some("https://cdn.example.com/x.ts")
        );
        assert_eq!(resolve_specifier(base, "react"), None);
    }

    #[tokio::test]
    async fn test_loads_each_module_once() {
        let loader = StaticLoader::new()
            .with_module(
                "https://example.com/mod.ts",
                "import { a } from \"./a.ts\";\nexport * from \"./b.ts\";\n",
            )
            .with_module("https://example.com/a.ts", "import \"./b.ts\";\nexport const a = 1;\n")
            .with_module("https://example.com/b.ts", "import \"./a.ts\";\nexport const b = 2;\n");

        let graph = ModuleGraph::load("https://example.com/mod.ts", &loader).await.unwrap();

        assert_eq!(graph.module_count(), 3);
        assert_eq!(loader.calls(), 3);
        assert_eq!(
            graph.dependencies_of("https://example.com/mod.ts", DependencyKind::ReExport),
            vec!["https://example.com/b.ts"]
        );
        let exported: Vec<&str> = graph
            .exported_modules()
            .iter()
            .map(|m| m.specifier.as_str())
            .collect();
        assert_eq!(exported, vec!["https://example.com/mod.ts", "https://example.com/b.ts"]);
    }

    #[tokio::test]
    async fn test_relative_imports_follow_redirects() {
        let loader = StaticLoader::new()
            .with_redirect(
                "https://example.com/latest/mod.ts",
                "https://example.com/v2/mod.ts",
                "export * from \"./impl.ts\";\n",
            )
            .with_module("https://example.com/v2/impl.ts", "export const v = 2;\n");

        let graph = ModuleGraph::load("https://example.com/latest/mod.ts", &loader)
            .await
            .unwrap();

        assert!(graph.module("https://example.com/v2/impl.ts").is_some());
        assert_eq!(graph.module_count(), 2);
    }

    #[tokio::test]
    async fn test_missing_root() {
        let loader = StaticLoader::new();
        let err = ModuleGraph::load("https://example.com/mod.ts", &loader)
            .await
            .unwrap_err();
        assert!(err.to_string().contains(docserve_core::UNABLE_TO_LOAD));
    }

    #[tokio::test]
    async fn test_missing_dependency_is_tolerated() {
        let loader = StaticLoader::new().with_module(
            "https://example.com/mod.ts",
            "import { x } from \"./gone.ts\";\nimport React from \"react\";\nexport const y = 1;\n",
        );

        let graph = ModuleGraph::load("https://example.com/mod.ts", &loader).await.unwrap();

        assert_eq!(graph.module_count(), 1);
        assert_eq!(loader.calls(), 2);
    }
}
