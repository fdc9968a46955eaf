//! Transparent relay of upstream responses.

use axum::body::Body;
use axum::http::{HeaderValue, header};
use axum::response::Response;
use ingate_proxy::UpstreamResponse;
use serde_json::Value;

/// Headers describing the upstream framing; the relayed body is re-framed.
const STRIPPED_HEADERS: [header::HeaderName; 3] = [
    header::CONTENT_LENGTH,
    header::CONTENT_ENCODING,
    header::TRANSFER_ENCODING,
];

/// Relay an upstream answer with its status and remaining headers.
///
/// A JSON body is re-serialized and labelled `application/json`; anything
/// else is passed through byte-for-byte under the upstream's content type
/// (`application/octet-stream` when it declared none).
pub fn relay(upstream: UpstreamResponse) -> Response {
    let UpstreamResponse {
        status,
        mut headers,
        body,
    } = upstream;

    for name in &STRIPPED_HEADERS {
        headers.remove(name);
    }

    let body = match serde_json::from_slice::<Value>(&body) {
        Ok(document) => {
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
            Body::from(document.to_string())
        }
        Err(_) => {
            if !headers.contains_key(header::CONTENT_TYPE) {
                headers.insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/octet-stream"),
                );
            }
            Body::from(body)
        }
    };

    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
