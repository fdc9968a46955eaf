//! Throwaway upstream servers for forwarding tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use tokio::net::TcpListener;

/// Chat-completion bodies received by a recording upstream.
pub type Recorded = Arc<Mutex<Vec<Value>>>;

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn spawn_upstream(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Base URL of a port nothing listens on.
pub async fn closed_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Upstream answering every chat completion with `reply` and recording the
/// request bodies. `/v1/models` answers `{"object":"list","data":[]}`.
pub async fn recording_upstream(reply: Value) -> (String, Recorded) {
    let recorded: Recorded = Arc::default();
    let state = (recorded.clone(), reply);

    let router = Router::new()
        .route(
            "/v1/chat/completions",
            post(
                |State((recorded, reply)): State<(Recorded, Value)>, Json(body): Json<Value>| async move {
                    recorded.lock().unwrap().push(body);
                    Json(reply)
                },
            ),
        )
        .route(
            "/v1/models",
            get(|| async { Json(serde_json::json!({"object": "list", "data": []})) }),
        )
        .with_state(state);

    (spawn_upstream(router).await, recorded)
}

/// A chat-completion response carrying `content`.
pub fn completion(content: &str) -> Value {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
    })
}
