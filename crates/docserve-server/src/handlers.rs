//! REST handlers for documentation requests

use std::sync::Arc;

use axum::extract::{Path, Query, RawQuery, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Json, Response};
use docserve_core::{
    DocError, DocNode, GraphCache, RegistryUrl, Resolution, parse_registry_url, resolve,
};
use serde::{Deserialize, Serialize};

use crate::ServerState;
use crate::error::ApiError;
use crate::target::DocTarget;

/// Body of a successful documentation request.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DocResponse<'a> {
    Module {
        url: &'a str,
        registry: Option<RegistryUrl>,
        entries: &'a [DocNode],
    },
    Entry {
        url: &'a str,
        item: &'a str,
        path: Vec<String>,
        nodes: Vec<&'a DocNode>,
    },
    EntryNotFound { url: &'a str, item: &'a str },
}

/// Build or reuse the graph for `url` and describe it, or the entry at
/// `item` within it.
pub async fn document(
    graphs: &GraphCache,
    url: &str,
    item: Option<&str>,
) -> Result<serde_json::Value, DocError> {
    let graph = graphs.get_or_build(url).await?;

    let response = match item {
        None => DocResponse::Module {
            url,
            registry: parse_registry_url(url),
            entries: &graph.entries,
        },
        Some(item) => match resolve(item, &graph.entries)? {
            Resolution::Found(group) => DocResponse::Entry {
                url,
                item,
                path: group.path,
                nodes: group.nodes,
            },
            Resolution::NotFound => {
                tracing::debug!(url, item, "entry not found");
                DocResponse::EntryNotFound { url, item }
            }
        },
    };
    serde_json::to_value(&response).map_err(|e| DocError::Internal(e.to_string()))
}

async fn respond(state: &ServerState, target: DocTarget, headers: &HeaderMap) -> Response {
    match document(&state.graphs, &target.url, target.item.as_deref()).await {
        Ok(body) => Json(body).into_response(),
        Err(err) => ApiError::from(err).negotiate(headers),
    }
}

#[derive(Debug, Deserialize)]
pub struct DocQuery {
    pub url: Option<String>,
    pub item: Option<String>,
}

/// `GET /doc?url=<specifier>&item=<path>`
pub async fn doc_query(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Query(query): Query<DocQuery>,
) -> Response {
    match DocTarget::from_query(query.url, query.item) {
        Ok(target) => respond(&state, target, &headers).await,
        Err(err) => err.negotiate(&headers),
    }
}

/// `GET /https://host/path[/~/item]`
pub async fn doc_path(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
) -> Response {
    match DocTarget::from_path(&path, query.as_deref()) {
        Some(target) => respond(&state, target, &headers).await,
        None => ApiError::not_found(format!("The requested URL \"/{path}\" was not found."))
            .negotiate(&headers),
    }
}

/// Service description
#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub usage: Vec<&'static str>,
}

pub async fn index() -> impl IntoResponse {
    Json(IndexResponse {
        name: "docserve",
        version: env!("CARGO_PKG_VERSION"),
        usage: vec![
            "/doc?url=<module url>[&item=<dotted.path>]",
            "/<module url>[/~/<dotted.path>]",
        ],
    })
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    let health = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    Json(health)
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub resources: usize,
    pub resource_bytes: usize,
    pub resource_max_bytes: usize,
    pub graphs: usize,
    pub graph_max_entries: usize,
    pub builds: usize,
    pub extractor: String,
}

pub async fn stats(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    Json(StatsResponse {
        resources: state.resources.len(),
        resource_bytes: state.resources.current_bytes(),
        resource_max_bytes: state.resources.max_bytes(),
        graphs: state.graphs.len(),
        graph_max_entries: state.graphs.max_graphs(),
        builds: state.graphs.builds(),
        extractor: state.graphs.extractor_name().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check() {
        let response = health_check().await.into_response();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }

    #[test]
    fn test_response_shapes() {
        let node = DocNode::new("x", docserve_core::DocNodeDef::ModuleDoc);
        let entries = vec![node];

        let module = serde_json::to_value(DocResponse::Module {
            url: "https://deno.land/x/oak@v10.0.0/mod.ts",
            registry: parse_registry_url("https://deno.land/x/oak@v10.0.0/mod.ts"),
            entries: &entries,
        })
        .unwrap();
        assert_eq!(module["kind"], "module");
        assert_eq!(module["registry"]["package"], "oak");
        assert_eq!(module["entries"][0]["name"], "x");

        let missing = serde_json::to_value(DocResponse::EntryNotFound {
            url: "https://example.com/mod.ts",
            item: "nope",
        })
        .unwrap();
        insta::assert_json_snapshot!(missing, @r###"
        {
          "item": "nope",
          "kind": "entryNotFound",
          "url": "https://example.com/mod.ts"
        }
        "###);
    }
}
