//! HTTP mode end to end: read-only endpoints, the `/ws` channel and shutdown.

mod common;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, Stream, StreamExt};
use serde_json::{json, Value};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

use common::{default_backend, dispatcher_with};
use websearch_mcp::stats::StatsRegistry;
use websearch_mcp::transport::{http, TransportError, MAX_MESSAGE_BYTES};

struct TestServer {
    addr: SocketAddr,
    stats: Arc<StatsRegistry>,
    stop: oneshot::Sender<()>,
    task: JoinHandle<Result<(), TransportError>>,
}

async fn start() -> TestServer {
    let (dispatcher, stats) = dispatcher_with(default_backend());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stop_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(http::serve(listener, Arc::new(dispatcher), async move {
        let _ = stop_rx.await;
    }));

    TestServer { addr, stats, stop, task }
}

async fn get_json(addr: SocketAddr, path: &str) -> (u16, Value) {
    let resp = reqwest::get(format!("http://{addr}{path}")).await.unwrap();
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap();
    (status, serde_json::from_str(&body).unwrap())
}

async fn recv_json<S>(ws: &mut S) -> Value
where
    S: Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        match ws.next().await.unwrap().unwrap() {
            Message::Text(text) => return serde_json::from_str(&text).unwrap(),
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("unexpected frame: {other:?}"),
        }
    }
}

async fn wait_for<F>(mut cond: F)
where
    F: FnMut() -> bool,
{
    for _ in 0..100 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("condition not reached in time");
}

#[tokio::test]
async fn health_reports_service_and_build_info() {
    let server = start().await;

    let (status, body) = get_json(server.addr, "/health").await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "websearch-mcp");
    assert!(body["version"].is_string());
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
    assert!(body["build_info"]["git_commit"].is_string());

    server.stop.send(()).unwrap();
    server.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn stats_and_version_are_served() {
    let server = start().await;
    server.stats.increment_searches();

    let (status, stats) = get_json(server.addr, "/stats").await;
    assert_eq!(status, 200);
    assert_eq!(stats["search_count"], 1);
    assert_eq!(stats["request_count"], 0);
    assert!(stats["uptime_human"].is_string());
    assert!(stats.get("memory").is_some());
    assert!(stats.get("runtime").is_some());

    let (status, version) = get_json(server.addr, "/version").await;
    assert_eq!(status, 200);
    assert!(version["version"].is_string());
    assert!(version["os"].is_string());
    assert!(version["arch"].is_string());

    server.stop.send(()).unwrap();
    server.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let server = start().await;

    let resp = reqwest::get(format!("http://{}/mcp", server.addr)).await.unwrap();
    assert_eq!(resp.status().as_u16(), 404);

    server.stop.send(()).unwrap();
    server.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn websocket_round_trips_and_tracks_connections() {
    let server = start().await;
    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{}/ws", server.addr))
        .await
        .unwrap();

    ws.send(Message::Text(
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}).to_string(),
    ))
    .await
    .unwrap();
    let resp = recv_json(&mut ws).await;
    assert_eq!(resp["id"], 1);
    assert_eq!(resp["result"]["serverInfo"]["name"], "websearch-mcp");

    ws.send(Message::Text(
        json!({
            "jsonrpc": "2.0",
            "id": "search-1",
            "method": "tools/call",
            "params": {"name": "web_search", "arguments": {"query": "rust", "max_results": 1}}
        })
        .to_string(),
    ))
    .await
    .unwrap();
    let resp = recv_json(&mut ws).await;
    assert_eq!(resp["id"], "search-1");
    let text = resp["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.starts_with("Search results for: rust\nFound 1 results:"));

    let snapshot = server.stats.snapshot();
    assert_eq!(snapshot.connection_count, 1);
    assert_eq!(snapshot.active_connections, 1);
    assert_eq!(snapshot.search_count, 1);

    ws.close(None).await.unwrap();
    let stats = Arc::clone(&server.stats);
    wait_for(|| stats.snapshot().active_connections == 0).await;
    assert_eq!(server.stats.snapshot().connection_count, 1);

    server.stop.send(()).unwrap();
    server.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn malformed_frame_is_dropped_and_connection_survives() {
    let server = start().await;
    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{}/ws", server.addr))
        .await
        .unwrap();

    ws.send(Message::Text("{definitely not json".into())).await.unwrap();
    ws.send(Message::Text(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#.into()))
        .await
        .unwrap();
    ws.send(Message::Text(r#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#.into()))
        .await
        .unwrap();

    let resp = recv_json(&mut ws).await;
    assert_eq!(resp["id"], 2);
    assert_eq!(resp["result"], "pong");

    let snapshot = server.stats.snapshot();
    assert_eq!(snapshot.errors, 1);
    assert_eq!(snapshot.request_count, 2);

    ws.close(None).await.unwrap();
    server.stop.send(()).unwrap();
    server.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn oversized_frame_is_dropped_and_connection_survives() {
    let server = start().await;
    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{}/ws", server.addr))
        .await
        .unwrap();

    let padded = format!(
        r#"{{"jsonrpc":"2.0","id":1,"method":"ping","params":{{"pad":"{}"}}}}"#,
        "x".repeat(MAX_MESSAGE_BYTES)
    );
    ws.send(Message::Text(padded)).await.unwrap();
    ws.send(Message::Text(r#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#.into()))
        .await
        .unwrap();

    let resp = recv_json(&mut ws).await;
    assert_eq!(resp["id"], 2);
    assert_eq!(resp["result"], "pong");

    let snapshot = server.stats.snapshot();
    assert_eq!(snapshot.errors, 1);
    assert_eq!(snapshot.request_count, 1);
    assert_eq!(snapshot.active_connections, 1);

    ws.close(None).await.unwrap();
    server.stop.send(()).unwrap();
    server.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn connections_are_independent() {
    let server = start().await;
    let url = format!("ws://{}/ws", server.addr);
    let (mut a, _) = tokio_tungstenite::connect_async(&url).await.unwrap();
    let (mut b, _) = tokio_tungstenite::connect_async(&url).await.unwrap();

    a.send(Message::Text(r#"{"jsonrpc":"2.0","id":"a","method":"ping"}"#.into()))
        .await
        .unwrap();
    b.send(Message::Text(r#"{"jsonrpc":"2.0","id":"b","method":"ping"}"#.into()))
        .await
        .unwrap();

    assert_eq!(recv_json(&mut b).await["id"], "b");
    assert_eq!(recv_json(&mut a).await["id"], "a");
    assert_eq!(server.stats.snapshot().active_connections, 2);

    drop(a);
    let stats = Arc::clone(&server.stats);
    wait_for(|| stats.snapshot().active_connections == 1).await;

    b.send(Message::Text(r#"{"jsonrpc":"2.0","id":"b2","method":"ping"}"#.into()))
        .await
        .unwrap();
    assert_eq!(recv_json(&mut b).await["id"], "b2");

    b.close(None).await.unwrap();
    server.stop.send(()).unwrap();
    server.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn shutdown_stops_accepting_connections() {
    let server = start().await;
    let addr = server.addr;

    server.stop.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(10), server.task)
        .await
        .expect("server did not stop within the grace period")
        .unwrap()
        .unwrap();

    assert!(reqwest::get(format!("http://{addr}/health")).await.is_err());
}
