//! Documentation extraction seam

use thiserror::Error;

use crate::loader::Loader;
use crate::model::DocNode;

/// Message fragment extractors use when the root specifier cannot be loaded.
pub const UNABLE_TO_LOAD: &str = "Unable to load specifier";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unable to load specifier \"{0}\"")]
    UnableToLoad(String),

    #[error("{specifier}:{line}:{col}: syntax error")]
    Syntax {
        specifier: String,
        line: u32,
        col: u32,
    },

    #[error("invalid specifier \"{0}\"")]
    InvalidSpecifier(String),

    /// The extractor itself failed, e.g. its parser could not be set up.
    #[error("extractor failure: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Produces the flat list of documentation nodes for a root module, loading
/// the module and its imports through `loader`.
///
/// The extractor decides the order and concurrency of `loader` calls. An
/// import the loader cannot resolve must not fail the whole extraction; a
/// root it cannot resolve is reported as [`ExtractError::UnableToLoad`].
#[async_trait::async_trait]
pub trait DocExtractor: Send + Sync {
    async fn extract(&self, root: &str, loader: &dyn Loader) -> Result<Vec<DocNode>, ExtractError>;

    fn name(&self) -> &str;
}
