//! Service configuration
//!
//! Settings come from an optional TOML file; the binary layers command-line
//! flags and environment variables on top.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//!
//! [cache]
//! resource_max_bytes = 25000000
//! graph_max_entries = 512
//!
//! [fetch]
//! user_agent = "docserve"
//! max_redirects = 10
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graph_cache::DEFAULT_MAX_GRAPHS;
use crate::resource_cache::DEFAULT_MAX_BYTES;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub server: ServerSettings,
    pub cache: CacheSettings,
    pub fetch: FetchSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheSettings {
    /// Byte budget for fetched module sources.
    pub resource_max_bytes: usize,
    /// Number of documentation graphs kept in memory.
    pub graph_max_entries: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchSettings {
    pub user_agent: String,
    pub max_redirects: usize,
    /// Connect timeout in seconds. Unset means fetches never time out.
    pub connect_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            server: ServerSettings::default(),
            cache: CacheSettings::default(),
            fetch: FetchSettings::default(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        CacheSettings {
            resource_max_bytes: DEFAULT_MAX_BYTES,
            graph_max_entries: DEFAULT_MAX_GRAPHS,
        }
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        FetchSettings {
            user_agent: format!("docserve/{}", env!("CARGO_PKG_VERSION")),
            max_redirects: 10,
            connect_timeout_secs: None,
        }
    }
}

impl Settings {
    /// Load settings from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Settings::default());
        };
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_toml(&text)?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(settings)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.graph_max_entries == 0 {
            return Err(ConfigError::Invalid(
                "cache.graph_max_entries must be at least 1".to_string(),
            ));
        }
        if self.server.host.is_empty() {
            return Err(ConfigError::Invalid("server.host must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.cache.resource_max_bytes, 25_000_000);
        assert_eq!(settings.cache.graph_max_entries, 512);
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.fetch.max_redirects, 10);
        assert_eq!(settings.fetch.connect_timeout_secs, None);
    }

    #[test]
    fn test_connect_timeout_is_opt_in() {
        let settings = Settings::from_toml("[fetch]\nconnect_timeout_secs = 5\n").unwrap();
        assert_eq!(settings.fetch.connect_timeout_secs, Some(5));
        assert_eq!(settings.fetch.max_redirects, 10);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[cache]\nresource_max_bytes = 1000\n\n[server]\nport = 9000").unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();

        assert_eq!(settings.cache.resource_max_bytes, 1000);
        assert_eq!(settings.cache.graph_max_entries, 512);
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.server.host, "127.0.0.1");
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = Settings::from_toml("[cache]\nmax = 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_zero_graph_entries_rejected() {
        let err = Settings::from_toml("[cache]\ngraph_max_entries = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
