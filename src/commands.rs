//! CLI command implementations

use std::sync::Arc;

use docserve_core::{GraphCache, Settings, SharedResourceCache};
use docserve_extract::TypeScriptDocExtractor;
use docserve_loader::HttpLoader;
use docserve_server::{DocServer, ServerConfig, ServerState};

/// Wire the resource cache, loader, extractor and graph cache together.
fn build_state(settings: &Settings) -> anyhow::Result<ServerState> {
    let resources = SharedResourceCache::new(settings.cache.resource_max_bytes);
    let loader = HttpLoader::new(resources.clone(), &settings.fetch)?;
    let graphs = Arc::new(GraphCache::new(
        Arc::new(TypeScriptDocExtractor::new()),
        Arc::new(loader),
        settings.cache.graph_max_entries,
    ));
    graphs.invalidate_on_eviction(&resources);

    tracing::debug!(
        resource_max_bytes = settings.cache.resource_max_bytes,
        graph_max_entries = settings.cache.graph_max_entries,
        "caches ready"
    );
    Ok(ServerState::new(graphs, resources))
}

pub async fn serve(settings: Settings, open: bool) -> anyhow::Result<()> {
    let host = settings.server.host.clone();
    let port = settings.server.port;
    tracing::info!("Starting Docserve server on {}:{}", host, port);

    let state = build_state(&settings)?;
    let server = DocServer::new(state, ServerConfig { host: host.clone(), port });

    if open {
        let browse_host = if host == "0.0.0.0" { "127.0.0.1" } else { host.as_str() };
        let url = format!("http://{}:{}/", browse_host, port);
        if let Err(e) = open::that(&url) {
            tracing::warn!("Could not open browser at {}: {}", url, e);
        }
    }

    server.start().await
}

pub async fn doc(settings: Settings, url: String, item: Option<String>) -> anyhow::Result<()> {
    let state = build_state(&settings)?;

    let body = docserve_server::document(&state.graphs, &url, item.as_deref()).await?;
    println!("{}", serde_json::to_string_pretty(&body)?);

    let timings = state.graphs.get(&url).map(|graph| graph.timings);
    tracing::debug!(?timings, resources = state.resources.len(), "document built");
    Ok(())
}
