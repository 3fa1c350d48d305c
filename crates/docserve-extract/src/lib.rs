//! TypeScript documentation extraction using tree-sitter
//!
//! [`TypeScriptDocExtractor`] loads a module graph through a
//! [`docserve_core::Loader`], parses every module with tree-sitter and
//! documents what the root module exports.

pub mod docs;
pub mod extractor;
pub mod jsdoc;
pub mod module_graph;
pub mod parser;


pub use extractor::TypeScriptDocExtractor;
pub use module_graph::{DependencyKind, ModuleGraph, resolve_specifier};
pub use parser::Dialect;
