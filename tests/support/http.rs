//! Request builders and response decoding for router tests.

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

pub const MARKETS: &str = "/api/v1/markets";

/// Status, headers and decoded JSON body of a response.
#[derive(Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl Reply {
    pub fn replayed(&self) -> bool {
        self.headers
            .get("idempotent-replayed")
            .is_some_and(|v| v == "true")
    }

    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }

    pub fn id(&self) -> &str {
        self.body["id"].as_str().expect("body has an id")
    }
}

pub async fn send(router: &Router, request: Request<Body>) -> Reply {
    let response = router.clone().oneshot(request).await.expect("infallible");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };

    Reply {
        status,
        headers,
        body,
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .expect("valid request")
}

pub fn json_request(method: Method, uri: &str, body: &Value, key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(key) = key {
        builder = builder.header("Idempotency-Key", key);
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("valid request")
}

pub fn post_market(body: &Value, key: Option<&str>) -> Request<Body> {
    json_request(Method::POST, MARKETS, body, key)
}

pub fn patch_odds(market_id: &str, updates: &Value, key: Option<&str>) -> Request<Body> {
    json_request(
        Method::PATCH,
        &format!("{MARKETS}/{market_id}/odds"),
        &json!({ "updates": updates }),
        key,
    )
}

/// The canonical single-selection market on the seeded football event.
pub fn win_market_body() -> Value {
    json!({
        "eventId": "event1",
        "name": "Win Market",
        "selections": [{ "name": "Team A", "odds": 2.0 }]
    })
}
