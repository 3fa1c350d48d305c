//! Docserve Core — resource cache, graph cache, entry merging and path resolution

pub mod config;
pub mod error;
pub mod extract;
pub mod graph_cache;
pub mod loader;
pub mod lru;
pub mod merge;
pub mod model;
pub mod registry;
pub mod resolve;
pub mod resource_cache;


#[cfg(test)]
pub mod test_utils;

pub use config::{CacheSettings, ConfigError, FetchSettings, ServerSettings, Settings};
pub use error::{DocError, ResolveError};
pub use extract::{DocExtractor, ExtractError, UNABLE_TO_LOAD};
pub use graph_cache::{BuildTimings, DEFAULT_MAX_GRAPHS, DocGraph, GraphCache};
pub use loader::{CachedResource, Loader, StaticLoader};
pub use lru::WeightedLru;
pub use merge::merge_entries;
pub use model::{DocNode, DocNodeDef, DocNodeKind, Location};
pub use registry::{RegistryUrl, parse_registry_url};
pub use resolve::{EntryGroup, Resolution, resolve};
pub use resource_cache::{DEFAULT_MAX_BYTES, EvictionHook, ResourceCache, SharedResourceCache};
