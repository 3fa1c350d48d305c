//! Error taxonomy for building and resolving documentation

use thiserror::Error;

use crate::extract::{ExtractError, UNABLE_TO_LOAD};

/// Failure to produce a documentation graph for a root specifier.
#[derive(Debug, Error)]
pub enum DocError {
    /// The root module itself could not be loaded.
    #[error("The module \"{specifier}\" cannot be found.")]
    UnresolvableRoot { specifier: String },

    /// The module graph was loaded but could not be documented.
    #[error("Bad request: {message}")]
    InvalidGraph { message: String },

    /// Anything unexpected. The payload is for logs, never for clients.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DocError {
    /// Classify an extraction failure for `root`.
    ///
    /// Extractors signal a missing root only through the text of their
    /// error, so an opaque error mentioning [`UNABLE_TO_LOAD`] counts too.
    pub fn from_extract(root: &str, err: ExtractError) -> Self {
        match err {
            ExtractError::UnableToLoad(_) => DocError::UnresolvableRoot {
                specifier: root.to_string(),
            },
            ExtractError::Internal(message) => DocError::Internal(message),
            other => {
                let message = other.to_string();
                if message.contains(UNABLE_TO_LOAD) {
                    DocError::UnresolvableRoot {
                        specifier: root.to_string(),
                    }
                } else {
                    DocError::InvalidGraph { message }
                }
            }
        }
    }
}

/// A documentation graph broke an invariant path resolution depends on.
///
/// This is a programming error in whatever produced the graph, not a user
/// error, and must surface as an internal failure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("entry \"{name}\" matched {count} declarations that are not overloads")]
    AmbiguousEntry { name: String, count: usize },
}

impl From<ResolveError> for DocError {
    fn from(err: ResolveError) -> Self {
        DocError::Internal(err.to_string())
    }
}
