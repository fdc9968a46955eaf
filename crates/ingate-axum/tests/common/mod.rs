//! Shared helpers for gateway HTTP tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request, StatusCode, header};
use axum::routing::{get, post};
use http_body_util::BodyExt;
use ingate_axum::{GatewayContext, create_router};
use ingate_core::{AudioConfig, GatewayConfig};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower::ServiceExt;

pub const BOUNDARY: &str = "ingate-test-boundary";

/// Bodies received by a recording upstream.
pub type Recorded = Arc<Mutex<Vec<Value>>>;

/// Router over `config`, validated the same way the binary does.
pub fn app(config: GatewayConfig) -> Router {
    let ctx = GatewayContext::new(config.validated().unwrap()).unwrap();
    create_router(Arc::new(ctx))
}

/// Router over `config` without validation, for exercising runtime
/// configuration failures.
pub fn app_unchecked(config: GatewayConfig) -> Router {
    create_router(Arc::new(GatewayContext::new(config).unwrap()))
}

/// Config forwarding everything to `base` with audio passed through untouched.
pub fn passthrough_config(base: &str) -> GatewayConfig {
    GatewayConfig {
        audio: AudioConfig {
            preprocess_enabled: false,
            ..AudioConfig::default()
        },
        ..GatewayConfig::single(base)
    }
}

pub async fn spawn_upstream(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Base URL of a local port with nothing listening.
pub async fn closed_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Upstream replying `reply` to chat completions (recording each body) and a
/// one-model list to `/v1/models`.
pub async fn recording_upstream(reply: Value) -> (String, Recorded) {
    let recorded: Recorded = Arc::default();

    let router = Router::new()
        .route(
            "/v1/chat/completions",
            post(
                |State((recorded, reply)): State<(Recorded, Value)>,
                 axum::Json(body): axum::Json<Value>| async move {
                    recorded.lock().unwrap().push(body);
                    axum::Json(reply)
                },
            ),
        )
        .route(
            "/v1/models",
            get(|| async {
                axum::Json(json!({"object": "list", "data": [{"id": "test-model"}]}))
            }),
        )
        .with_state((recorded.clone(), reply));

    (spawn_upstream(router).await, recorded)
}

pub fn completion(content: &str) -> Value {
    json!({"choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]})
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn json_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Multipart form request. Each part is `(name, filename, bytes)`.
pub fn multipart_request(uri: &str, parts: &[(&str, Option<&str>, &[u8])]) -> Request<Body> {
    let body = multipart_body(parts);
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap()
}

/// Multipart form request without a `Content-Length`, as a chunked upload
/// would arrive.
pub fn unsized_multipart_request(
    uri: &str,
    parts: &[(&str, Option<&str>, &[u8])],
) -> Request<Body> {
    let mut request = multipart_request(uri, parts);
    request.headers_mut().remove(header::CONTENT_LENGTH);
    request
}

pub fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, data) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match filename {
            Some(filename) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
            }
        }
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Drive one request through `app` and collect status, headers and raw body.
pub async fn send_raw(app: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, body.to_vec())
}

/// Like [`send_raw`] but parses the body as JSON.
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let (status, headers, body) = send_raw(app, request).await;
    let json = serde_json::from_slice(&body)
        .unwrap_or_else(|e| panic!("non-JSON body ({e}): {}", String::from_utf8_lossy(&body)));
    (status, headers, json)
}
