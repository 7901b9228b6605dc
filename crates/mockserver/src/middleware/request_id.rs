//! Request ID middleware.
//!
//! A storefront under development usually talks to this server directly,
//! with no proxy in front to stamp requests. The server therefore mints the
//! id itself unless the client sent a usable one, and always returns it in
//! `x-request-id` so a failing call in the browser's network tab can be
//! found in the server log by that value.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest client-supplied id that is reused as-is.
const MAX_REQUEST_ID_LEN: usize = 128;

/// The client's request id, if it is short, non-empty, visible ASCII.
#[must_use]
pub fn accept_request_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|id| {
            !id.is_empty()
                && id.len() <= MAX_REQUEST_ID_LEN
                && id.bytes().all(|b| b.is_ascii_graphic())
        })
}

/// Tag the request with an id and echo it on the response.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = accept_request_id(request.headers())
        .map_or_else(|| Uuid::new_v4().to_string(), str::to_owned);

    Span::current().record("request_id", request_id.as_str());
    sentry::configure_scope(|scope| scope.set_tag("request_id", &request_id));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
