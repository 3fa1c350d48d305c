//! Dotted item path resolution into a documentation graph

use serde::Serialize;

use crate::error::ResolveError;
use crate::model::{DocNode, DocNodeKind};

/// Nodes sharing one name and kind. More than one node only happens for
/// function overloads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryGroup<'a> {
    pub name: String,
    pub kind: DocNodeKind,
    /// Namespace segments preceding the name, as requested.
    pub path: Vec<String>,
    pub nodes: Vec<&'a DocNode>,
}

impl EntryGroup<'_> {
    pub fn is_overload_set(&self) -> bool {
        self.nodes.len() > 1
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<'a> {
    Found(EntryGroup<'a>),
    NotFound,
}

/// Resolve `path` such as `Deno.Listener.close` against `entries`.
///
/// Every segment but the last names a namespace to descend into. A segment
/// with no matching namespace does not fail the lookup: the search simply
/// stays in the last list reached. The last segment is then matched by name
/// among non-import nodes.
pub fn resolve<'a>(path: &str, entries: &'a [DocNode]) -> Result<Resolution<'a>, ResolveError> {
    let mut segments: Vec<&str> = path.split('.').collect();
    let name = segments.pop().unwrap_or_default();

    let mut current = entries;
    for segment in &segments {
        let namespace = current
            .iter()
            .find(|n| n.kind() == DocNodeKind::Namespace && n.name == *segment);
        match namespace.and_then(DocNode::namespace_elements) {
            Some(elements) => current = elements,
            None => {
                tracing::debug!(segment, path, "namespace not found, staying at current level");
            }
        }
    }

    let nodes: Vec<&DocNode> = current
        .iter()
        .filter(|n| n.name == name && n.kind() != DocNodeKind::Import)
        .collect();

    let Some(first) = nodes.first() else {
        return Ok(Resolution::NotFound);
    };
    let kind = first.kind();

    let all_functions = nodes.iter().all(|n| n.kind() == DocNodeKind::Function);
    if !all_functions && nodes.len() != 1 {
        return Err(ResolveError::AmbiguousEntry {
            name: name.to_string(),
            count: nodes.len(),
        });
    }

    Ok(Resolution::Found(EntryGroup {
        name: name.to_string(),
        kind,
        path: segments.iter().map(|s| s.to_string()).collect(),
        nodes,
    }))
}
