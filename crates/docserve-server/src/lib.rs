//! HTTP server for module documentation

pub mod error;
pub mod handlers;
pub mod router;
pub mod target;


use std::net::SocketAddr;
use std::sync::Arc;

use docserve_core::{GraphCache, SharedResourceCache};
use tokio::net::TcpListener;

pub use error::ApiError;
pub use handlers::{DocResponse, document};
pub use router::create_router;
pub use target::DocTarget;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// State shared by every request handler.
pub struct ServerState {
    pub graphs: Arc<GraphCache>,
    pub resources: SharedResourceCache,
}

impl ServerState {
    pub fn new(graphs: Arc<GraphCache>, resources: SharedResourceCache) -> Self {
        ServerState { graphs, resources }
    }
}

pub struct DocServer {
    config: ServerConfig,
    state: Arc<ServerState>,
}

impl DocServer {
    pub fn new(state: ServerState, config: ServerConfig) -> Self {
        DocServer {
            config,
            state: Arc::new(state),
        }
    }

    pub fn state(&self) -> Arc<ServerState> {
        Arc::clone(&self.state)
    }

    /// Bind the configured address and serve until the process exits.
    pub async fn start(self) -> anyhow::Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener.
    pub async fn serve(self, listener: TcpListener) -> anyhow::Result<()> {
        let local: SocketAddr = listener.local_addr()?;
        tracing::info!("listening on http://{}/", local);
        let app = create_router(self.state);
        axum::serve(listener, app).await?;
        Ok(())
    }
}
