//! Test utilities for docserve-core

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::extract::{DocExtractor, ExtractError};
use crate::loader::Loader;
use crate::model::{
    ClassDef, DocNode, DocNodeDef, FunctionDef, InterfaceDef, NamespaceDef, VariableDef,
};

pub fn namespace(name: &str, elements: Vec<DocNode>) -> DocNode {
    DocNode::new(
        name,
        DocNodeDef::Namespace {
            namespace_def: NamespaceDef { elements },
        },
    )
}

pub fn function(name: &str) -> DocNode {
    DocNode::new(
        name,
        DocNodeDef::Function {
            function_def: FunctionDef::default(),
        },
    )
}

pub fn class(name: &str) -> DocNode {
    DocNode::new(
        name,
        DocNodeDef::Class {
            class_def: ClassDef::default(),
        },
    )
}

pub fn variable(name: &str) -> DocNode {
    DocNode::new(
        name,
        DocNodeDef::Variable {
            variable_def: VariableDef::default(),
        },
    )
}

pub fn interface(name: &str) -> DocNode {
    DocNode::new(
        name,
        DocNodeDef::Interface {
            interface_def: InterfaceDef::default(),
        },
    )
}

/// What a [`FixtureExtractor`] does when asked to extract.
pub enum Fixture {
    Nodes(Vec<DocNode>),
    Unloadable,
    Syntax,
    Panic,
}

impl Fixture {
    pub fn nodes(nodes: Vec<DocNode>) -> Self {
        Fixture::Nodes(nodes)
    }
}

/// Extractor returning canned results, optionally loading some specifiers
/// first so loader traffic can be observed.
pub struct FixtureExtractor {
    fixture: Fixture,
    loads: Vec<String>,
    doc_delay: Option<Duration>,
    calls: AtomicUsize,
}

impl FixtureExtractor {
    pub fn new(fixture: Fixture) -> Self {
        FixtureExtractor {
            fixture,
            loads: Vec::new(),
            doc_delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn loading(mut self, specifiers: Vec<String>) -> Self {
        self.loads = specifiers;
        self
    }

    pub fn with_doc_delay(mut self, delay: Duration) -> Self {
        self.doc_delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl DocExtractor for FixtureExtractor {
    async fn extract(&self, root: &str, loader: &dyn Loader) -> Result<Vec<DocNode>, ExtractError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        for specifier in &self.loads {
            let _ = loader.load(specifier).await;
        }
        if let Some(delay) = self.doc_delay {
            tokio::time::sleep(delay).await;
        }
        match &self.fixture {
            Fixture::Nodes(nodes) => Ok(nodes.clone()),
            Fixture::Unloadable => Err(ExtractError::UnableToLoad(root.to_string())),
            Fixture::Syntax => Err(ExtractError::Syntax {
                specifier: root.to_string(),
                line: 1,
                col: 1,
            }),
            Fixture::Panic => panic!("fixture panic"),
        }
    }

    fn name(&self) -> &str {
        "fixture"
    }
}
