//! Remote module loading through the shared resource cache
//!
//! [`HttpLoader`] is the production [`Loader`]: `http:` and `https:`
//! specifiers are served from the [`SharedResourceCache`] when present and
//! fetched otherwise. Every failure degrades to "not loadable".

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use docserve_core::{CachedResource, FetchSettings, Loader, SharedResourceCache};
use reqwest::{StatusCode, Url, redirect};
use thiserror::Error;


#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

pub struct HttpLoader {
    client: reqwest::Client,
    cache: SharedResourceCache,
}

impl HttpLoader {
    pub fn new(cache: SharedResourceCache, settings: &FetchSettings) -> Result<Self, LoaderError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .redirect(redirect::Policy::limited(settings.max_redirects));
        if let Some(secs) = settings.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;
        Ok(HttpLoader { client, cache })
    }

    pub fn cache(&self) -> &SharedResourceCache {
        &self.cache
    }

    async fn fetch(&self, specifier: &str, url: Url) -> reqwest::Result<Option<Arc<CachedResource>>> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            tracing::debug!(specifier, %status, "module fetch returned non-200");
            // Drain so the connection goes back to the pool.
            response.bytes().await?;
            return Ok(None);
        }

        let final_url = response.url().to_string();
        let headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                let value = value.to_str().ok()?;
                Some((name.as_str().to_ascii_lowercase(), value.to_string()))
            })
            .collect();
        let content = response.text().await?;

        let resource = Arc::new(CachedResource::new(specifier, final_url, headers, content));
        tracing::debug!(
            specifier,
            final_url = %resource.final_url,
            bytes = resource.size_bytes(),
            "fetched module"
        );
        self.cache.put(specifier, Arc::clone(&resource));
        Ok(Some(resource))
    }
}

#[async_trait::async_trait]
impl Loader for HttpLoader {
    async fn load(&self, specifier: &str) -> Option<Arc<CachedResource>> {
        let url = match Url::parse(specifier) {
            Ok(url) => url,
            Err(err) => {
                tracing::debug!(specifier, error = %err, "unparseable specifier");
                return None;
            }
        };

        match url.scheme() {
            "file" => {
                tracing::warn!(specifier, "local specifier requested");
                None
            }
            "http" | "https" => {
                if let Some(resource) = self.cache.get(specifier) {
                    return Some(resource);
                }
                match self.fetch(specifier, url).await {
                    Ok(resource) => resource,
                    Err(err) => {
                        tracing::debug!(specifier, error = %err, "module fetch failed");
                        None
                    }
                }
            }
            _ => None,
        }
    }
}
