//! Request correlation middleware.

use axum::extract::Request;
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use rand::Rng;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest caller-supplied id we keep. Longer ones are replaced.
const MAX_REQUEST_ID_LEN: usize = 64;

/// Request correlation ID, extractable via `Extension<RequestId>`.
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

impl RequestId {
    /// The dashboard's id when it sent a usable one.
    fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|s| !s.is_empty() && s.len() <= MAX_REQUEST_ID_LEN)
            .map(|s| Self(s.to_string()))
    }

    fn generate() -> Self {
        Self(format!("cms-{:016x}", rand::thread_rng().gen::<u64>()))
    }
}

/// Propagate or generate `x-request-id`, and echo it on the response.
pub async fn inject_request_id(mut request: Request, next: Next) -> Response {
    let id = RequestId::from_headers(request.headers()).unwrap_or_else(RequestId::generate);
    let header = HeaderValue::from_str(&id.0).ok();
    request.extensions_mut().insert(id);

    let mut response = next.run(request).await;
    if let Some(value) = header {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
