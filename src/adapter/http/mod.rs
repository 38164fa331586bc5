//! HTTP adapter (axum).
//!
//! Routes live under `/api/{version}/markets`; every route in that tree is
//! wrapped by the idempotency middleware, which only acts on mutating
//! methods carrying an `Idempotency-Key` header.

mod dto;
mod error;
mod idempotency;
mod routes;

use std::sync::Arc;

use crate::application::idempotency::IdempotencyCache;
use crate::application::market::MarketService;

pub use dto::{CreateMarketRequest, ListMarketsQuery, UpdateOddsRequest, UpdateStatusRequest};
pub use error::ApiError;
pub use idempotency::{CachedResponse, IDEMPOTENCY_KEY_HEADER, REPLAYED_HEADER};
pub use routes::router;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct HttpState {
    pub markets: Arc<MarketService>,
    pub idempotency: Arc<IdempotencyCache<CachedResponse>>,
    pub require_uuid_keys: bool,
}
