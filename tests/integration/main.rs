//! Integration tests for Docserve
//!
//! These tests wire the real HTTP loader, extractor, caches and router
//! together against a local module host, and drive the CLI binary.

use std::net::SocketAddr;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use docserve_core::{FetchSettings, GraphCache, SharedResourceCache};
use docserve_extract::TypeScriptDocExtractor;
use docserve_loader::HttpLoader;
use docserve_server::{ServerState, create_router};
use serde_json::Value;
use tokio::process::Command;
use tokio::time::sleep;

const MOD_TS: &str = r#"/** Greeting helpers. */
import { Tone } from "./tone.ts";
export * from "./shout.ts";

/** Say hello. */
export function greet(name: string, tone?: Tone): string {
  return `hello ${name}`;
}
"#;

const TONE_TS: &str = "export type Tone = \"calm\" | \"loud\";\n";

const SHOUT_TS: &str = r#"/** Say it loudly. */
export function shout(text: string): string {
  return text.toUpperCase();
}
"#;

const A_TS: &str = "export function a(): void {}\n";
const B_TS: &str = "export function b(): void {}\n";

fn typescript(source: &'static str) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/typescript")], source)
}

/// Host the fixture modules on an ephemeral port.
async fn spawn_module_host() -> SocketAddr {
    let app = Router::new()
        .route("/mod.ts", get(|| async { typescript(MOD_TS) }))
        .route("/tone.ts", get(|| async { typescript(TONE_TS) }))
        .route("/shout.ts", get(|| async { typescript(SHOUT_TS) }))
        .route("/a.ts", get(|| async { typescript(A_TS) }))
        .route("/b.ts", get(|| async { typescript(B_TS) }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn wire(max_bytes: usize) -> (Arc<GraphCache>, SharedResourceCache) {
    let resources = SharedResourceCache::new(max_bytes);
    let loader = HttpLoader::new(resources.clone(), &FetchSettings::default()).unwrap();
    let graphs = Arc::new(GraphCache::new(
        Arc::new(TypeScriptDocExtractor::new()),
        Arc::new(loader),
        16,
    ));
    graphs.invalidate_on_eviction(&resources);
    (graphs, resources)
}

/// A module graph is fetched over HTTP, documented, and cached.
#[tokio::test]
async fn test_remote_module_graph() {
    let host = spawn_module_host().await;
    let (graphs, resources) = wire(1_000_000);
    let root = format!("http://{host}/mod.ts");

    let graph = graphs.get_or_build(&root).await.unwrap();

    let names: Vec<&str> = graph.entries.iter().map(|n| n.name.as_str()).collect();
    assert!(names.contains(&"greet"));
    assert!(names.contains(&"shout"));
    assert!(resources.contains(&root));
    assert!(resources.contains(&format!("http://{host}/shout.ts")));
    assert!(resources.contains(&format!("http://{host}/tone.ts")));

    let again = graphs.get_or_build(&root).await.unwrap();
    assert!(Arc::ptr_eq(&graph, &again));
    assert_eq!(graphs.builds(), 1);
}

/// Evicting a root resource drops the graph built from it.
#[tokio::test]
async fn test_eviction_invalidates_graph() {
    let host = spawn_module_host().await;
    let (graphs, resources) = wire(A_TS.len() + 8);
    let a = format!("http://{host}/a.ts");
    let b = format!("http://{host}/b.ts");

    graphs.get_or_build(&a).await.unwrap();
    graphs.get_or_build(&b).await.unwrap();
    sleep(Duration::from_millis(50)).await;

    assert!(!resources.contains(&a));
    assert!(resources.contains(&b));
    assert!(graphs.get(&a).is_none());
    assert!(graphs.get(&b).is_some());

    graphs.get_or_build(&a).await.unwrap();
    assert_eq!(graphs.builds(), 3);
}

/// The router serves documentation loaded through the real loader.
#[tokio::test]
async fn test_server_over_http_loader() {
    let host = spawn_module_host().await;
    let (graphs, resources) = wire(1_000_000);
    let app = create_router(Arc::new(ServerState::new(graphs, resources)));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = reqwest::Client::new();
    let body: Value = client
        .get(format!("http://{addr}/http://{host}/mod.ts/~/shout"))
        .header("accept", "application/json")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["kind"], "entry");
    assert_eq!(body["nodes"][0]["jsDoc"], "Say it loudly.");

    let missing = client
        .get(format!("http://{addr}/doc?url=http://{host}/nope.ts"))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);
    assert!(missing.text().await.unwrap().starts_with("Error: [404 Not Found]"));
}

fn docserve() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_docserve"));
    command
        .env_remove("DOCSERVE_CONFIG")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    command
}

/// Test that the CLI can be invoked
#[tokio::test]
async fn test_cli_invocation() {
    let output = docserve().arg("--help").output().await.unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("Documentation server for remote TypeScript modules"));

    let output = docserve().arg("version").output().await.unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Docserve v"));
}

/// `docserve doc` prints the same JSON the server answers with.
#[tokio::test]
async fn test_cli_doc_command() {
    let host = spawn_module_host().await;

    let output = docserve()
        .args(["doc", &format!("http://{host}/mod.ts"), "greet"])
        .output()
        .await
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let body: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["kind"], "entry");
    assert_eq!(body["item"], "greet");
    assert_eq!(body["nodes"][0]["kind"], "function");

    let output = docserve()
        .args(["doc", &format!("http://{host}/missing.ts")])
        .output()
        .await
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("cannot be found"));
}

/// Unknown configuration keys are rejected before anything starts.
#[tokio::test]
async fn test_cli_rejects_bad_config() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("docserve.toml");
    std::fs::write(&path, "[cache]\nresource_max_bytes = 1024\nbogus = true\n").unwrap();

    let output = docserve()
        .arg("--config")
        .arg(&path)
        .arg("version")
        .output()
        .await
        .unwrap();
    assert!(!output.status.success());
}
