//! TypeScript documentation extractor

use std::collections::{HashMap, HashSet};

use docserve_core::model::{DocNodeKind, ImportDef, Location, NamespaceDef};
use docserve_core::{DocExtractor, DocNode, DocNodeDef, ExtractError, Loader};

use crate::docs::{ExportItem, ImportBinding, ModuleRef, ModuleSummary};
use crate::module_graph::ModuleGraph;

/// Documents the public surface of a TypeScript or JavaScript module graph.
#[derive(Debug, Default, Clone, Copy)]
pub struct TypeScriptDocExtractor;

impl TypeScriptDocExtractor {
    pub fn new() -> Self {
        TypeScriptDocExtractor
    }
}

#[async_trait::async_trait]
impl DocExtractor for TypeScriptDocExtractor {
    async fn extract(&self, root: &str, loader: &dyn Loader) -> Result<Vec<DocNode>, ExtractError> {
        let graph = ModuleGraph::load(root, loader).await?;

        for module in graph.exported_modules() {
            if let Some((line, col)) = module.syntax_error {
                return Err(ExtractError::Syntax {
                    specifier: module.specifier.clone(),
                    line,
                    col,
                });
            }
        }

        let root_module = graph.root();
        let mut nodes = Vec::new();
        nodes.extend(root_module.module_doc.clone());
        nodes.extend(root_module.imports.iter().map(import_node));
        nodes.extend(Exports::new(&graph).of(root_module));

        tracing::debug!(
            root,
            modules = graph.module_count(),
            nodes = nodes.len(),
            "extracted documentation"
        );
        Ok(nodes)
    }

    fn name(&self) -> &str {
        "typescript"
    }
}

fn import_node(binding: &ImportBinding) -> DocNode {
    DocNode::new(
        binding.local.as_str(),
        DocNodeDef::Import {
            import_def: ImportDef {
                src: binding.src.display().to_string(),
                imported: binding.imported.clone(),
            },
        },
    )
    .with_location(binding.location.clone())
}

/// Walks export items across modules. Modules already on the stack yield
/// nothing so circular re-exports terminate. A module's exports are computed
/// once per walk, and a declaration reached along several re-export paths is
/// emitted once per exported name.
struct Exports<'g> {
    graph: &'g ModuleGraph,
    stack: Vec<String>,
    done: HashMap<String, Vec<DocNode>>,
    cuts: usize,
}

/// A declaration's identity: exported name, kind and where it was declared.
type Origin = (String, DocNodeKind, Option<Location>);

impl<'g> Exports<'g> {
    fn new(graph: &'g ModuleGraph) -> Self {
        Exports {
            graph,
            stack: Vec::new(),
            done: HashMap::new(),
            cuts: 0,
        }
    }

    fn of(&mut self, module: &ModuleSummary) -> Vec<DocNode> {
        if let Some(nodes) = self.done.get(&module.specifier) {
            return nodes.clone();
        }
        if self.stack.contains(&module.specifier) {
            self.cuts += 1;
            return Vec::new();
        }
        self.stack.push(module.specifier.clone());
        let cuts_before = self.cuts;

        let mut out = Unique::default();
        for node in &module.declarations {
            out.push(node.clone());
        }
        for export in &module.exports {
            match export {
                ExportItem::Local { local, exported } => {
                    let mut found = module.locals_named(local);
                    if found.is_empty() {
                        if let Some(binding) = module.import_binding(local) {
                            found = self.imported(binding);
                        }
                    }
                    out.extend(found.into_iter().map(|n| renamed(n, exported)));
                }
                ExportItem::All { src } => {
                    let nodes = self.from(src);
                    out.extend(
                        nodes
                            .into_iter()
                            .filter(|n| n.kind() != DocNodeKind::Import && n.name != "default"),
                    );
                }
                ExportItem::Namespace {
                    src,
                    name,
                    location,
                    js_doc,
                } => {
                    let elements = self.from(src);
                    out.push(
                        namespace(name, elements)
                            .with_js_doc(js_doc.clone())
                            .with_location(location.clone()),
                    );
                }
                ExportItem::Named {
                    src,
                    imported,
                    exported,
                } => {
                    let nodes = self.from(src);
                    out.extend(
                        nodes
                            .into_iter()
                            .filter(|n| &n.name == imported && n.kind() != DocNodeKind::Import)
                            .map(|n| renamed(n, exported)),
                    );
                }
            }
        }

        self.stack.pop();
        let out = out.nodes;
        // Results cut short by a cycle depend on the path taken; keep only
        // complete ones.
        if self.cuts == cuts_before {
            self.done.insert(module.specifier.clone(), out.clone());
        }
        out
    }

    fn from(&mut self, src: &ModuleRef) -> Vec<DocNode> {
        let graph = self.graph;
        match src.resolved.as_deref().and_then(|s| graph.module(s)) {
            Some(module) => self.of(module),
            None => Vec::new(),
        }
    }

    fn imported(&mut self, binding: &ImportBinding) -> Vec<DocNode> {
        let nodes = self.from(&binding.src);
        match &binding.imported {
            Some(name) => nodes
                .into_iter()
                .filter(|n| &n.name == name && n.kind() != DocNodeKind::Import)
                .collect(),
            None => vec![namespace(&binding.local, nodes)],
        }
    }
}

/// Output nodes in order, dropping repeats of the same origin.
#[derive(Default)]
struct Unique {
    seen: HashSet<Origin>,
    nodes: Vec<DocNode>,
}

impl Unique {
    fn push(&mut self, node: DocNode) {
        let origin = (node.name.clone(), node.kind(), node.location.clone());
        if self.seen.insert(origin) {
            self.nodes.push(node);
        }
    }

    fn extend(&mut self, nodes: impl IntoIterator<Item = DocNode>) {
        for node in nodes {
            self.push(node);
        }
    }
}

fn renamed(mut node: DocNode, name: &str) -> DocNode {
    node.name = name.to_string();
    node
}

fn namespace(name: &str, elements: Vec<DocNode>) -> DocNode {
    let elements = elements
        .into_iter()
        .filter(|n| n.kind() != DocNodeKind::Import)
        .collect();
    DocNode::new(name, DocNodeDef::Namespace {
        namespace_def: NamespaceDef { elements },
    })
}
