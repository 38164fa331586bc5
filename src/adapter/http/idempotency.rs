//! Idempotency middleware.
//!
//! Wraps the downstream handler as an operation for
//! [`IdempotencyCache::execute`](crate::application::idempotency::IdempotencyCache::execute):
//! lookup, or execute then record. Only 2xx responses are captured, so a
//! failed attempt can be retried under the same key.

use axum::body::{to_bytes, Body, Bytes};
use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::{debug, warn};

use crate::application::idempotency::{is_valid_key, Outcome};

use super::error::ApiError;
use super::HttpState;

/// Request header carrying the client's key.
pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

/// Response header set to `true` on replays.
pub const REPLAYED_HEADER: &str = "idempotent-replayed";

/// A successful response captured for replay.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

impl CachedResponse {
    /// Buffer a response body. On failure the error response to send instead
    /// is returned.
    async fn capture(response: Response) -> Result<Self, Response> {
        let (parts, body) = response.into_parts();
        let body = to_bytes(body, usize::MAX).await.map_err(|e| {
            warn!(error = %e, "Failed to buffer response body");
            ApiError::Internal.into_response()
        })?;

        Ok(Self {
            status: parts.status,
            content_type: parts.headers.get(header::CONTENT_TYPE).cloned(),
            body,
        })
    }

    fn respond(self, replayed: bool) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;

        let headers = response.headers_mut();
        if let Some(content_type) = self.content_type {
            headers.insert(header::CONTENT_TYPE, content_type);
        }
        if replayed {
            headers.insert(REPLAYED_HEADER, HeaderValue::from_static("true"));
        }
        response
    }
}

fn is_mutating(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

/// Lookup-or-execute-then-record around the rest of the stack.
pub(super) async fn guard(
    State(state): State<HttpState>,
    request: Request,
    next: Next,
) -> Response {
    if !is_mutating(request.method()) {
        return next.run(request).await;
    }

    let key = match request.headers().get(IDEMPOTENCY_KEY_HEADER) {
        None => return next.run(request).await,
        Some(value) => match value.to_str() {
            Ok(key) if !key.is_empty() => key.to_owned(),
            _ => return ApiError::invalid("Invalid idempotency key").into_response(),
        },
    };

    if state.require_uuid_keys && !is_valid_key(&key) {
        return ApiError::invalid("Invalid idempotency key").into_response();
    }

    let result = state
        .idempotency
        .execute(Some(&key), || async move {
            let response = next.run(request).await;
            if !response.status().is_success() {
                return Err(response);
            }
            CachedResponse::capture(response).await
        })
        .await;

    match result {
        Ok(Outcome::Executed(cached)) => cached.respond(false),
        Ok(Outcome::Replayed(cached)) => {
            debug!(key = %key, status = %cached.status, "Replayed idempotent response");
            cached.respond(true)
        }
        Err(response) => response,
    }
}
