//! Collapse duplicate top-level namespace and interface declarations
//!
//! A module graph often declares the same namespace or interface in several
//! places (declaration merging). Documentation shows one entry per name, so
//! later declarations are folded into the first one seen.

use std::collections::HashMap;

use crate::model::{DocNode, DocNodeDef, DocNodeKind};

/// Merge duplicate namespaces and interfaces in a single left-to-right pass.
///
/// The first declaration of a name is canonical and keeps its position.
/// Later declarations of the same name and kind append their members to it
/// and are dropped; the canonical `js_doc` is only filled in when it had
/// none. Other kinds pass through untouched, duplicates included. Nested
/// namespace elements are not merged.
pub fn merge_entries(nodes: Vec<DocNode>) -> Vec<DocNode> {
    let mut merged: Vec<DocNode> = Vec::with_capacity(nodes.len());
    let mut namespaces: HashMap<String, usize> = HashMap::new();
    let mut interfaces: HashMap<String, usize> = HashMap::new();

    for node in nodes {
        let canonical = match node.kind() {
            DocNodeKind::Namespace => &mut namespaces,
            DocNodeKind::Interface => &mut interfaces,
            _ => {
                merged.push(node);
                continue;
            }
        };

        match canonical.get(&node.name) {
            Some(&idx) => absorb(&mut merged[idx], node),
            None => {
                canonical.insert(node.name.clone(), merged.len());
                merged.push(node);
            }
        }
    }

    merged
}

fn absorb(canonical: &mut DocNode, duplicate: DocNode) {
    let DocNode { js_doc, def, .. } = duplicate;

    if canonical.js_doc.is_none() {
        canonical.js_doc = js_doc;
    }

    match (&mut canonical.def, def) {
        (
            DocNodeDef::Namespace { namespace_def },
            DocNodeDef::Namespace {
                namespace_def: other,
            },
        ) => {
            namespace_def.elements.extend(other.elements);
        }
        (
            DocNodeDef::Interface { interface_def },
            DocNodeDef::Interface {
                interface_def: other,
            },
        ) => {
            interface_def.call_signatures.extend(other.call_signatures);
            interface_def.index_signatures.extend(other.index_signatures);
            interface_def.methods.extend(other.methods);
            interface_def.properties.extend(other.properties);
        }
        // Canonical maps are keyed per kind.
        (def, other) => unreachable!("absorbing {:?} into {:?}", other.kind(), def.kind()),
    }
}
