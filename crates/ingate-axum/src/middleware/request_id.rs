//! Request-id tagging and access logging.

use std::time::Instant;

use axum::extract::Request;
use axum::http::{HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use ingate_core::{REQUEST_ID_HEADER, RequestId};
use tracing::{Instrument, info, info_span};

/// Per-request context stored in request extensions.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: RequestId,
}

/// Outermost layer: tag the request, log its start and end, and set
/// `X-Request-ID` on whatever response comes back.
///
/// Everything downstream runs inside a `request` span carrying the id, so
/// forwarder and normalizer logs are attributed to the right request. The
/// span is bound to this request's future and ends with it.
pub async fn tag_request(mut req: Request, next: Next) -> Response {
    let request_id = RequestId::generate();
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    req.extensions_mut().insert(RequestContext {
        request_id: request_id.clone(),
    });

    let span = info_span!("request", request_id = %request_id, %method, %path);
    async move {
        let started = Instant::now();
        info!("{method} {path}");

        let mut response = next.run(req).await;

        info!(
            "{method} {path} -> {} ({} ms)",
            response.status().as_u16(),
            started.elapsed().as_millis()
        );
        if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
            response
                .headers_mut()
                .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
        }
        response
    }
    .instrument(span)
    .await
}
