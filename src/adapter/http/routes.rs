//! Router and handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderValue, StatusCode};
use axum::routing::{get, patch};
use axum::{middleware, Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::application::market::NewMarket;
use crate::domain::{Market, MarketId};

use super::dto::{CreateMarketRequest, ListMarketsQuery, UpdateOddsRequest, UpdateStatusRequest};
use super::error::ApiError;
use super::{idempotency, HttpState};

/// Build the full router: `/health` plus the versioned markets tree.
pub fn router(state: HttpState, api_version: &str, cors_origins: &[String]) -> Router {
    let markets = Router::new()
        .route("/", get(list_markets).post(create_market))
        .route("/:id", get(get_market))
        .route("/:id/odds", patch(update_odds))
        .route("/:id/status", patch(update_status))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            idempotency::guard,
        ))
        .with_state(state);

    Router::new()
        .route("/health", get(health))
        .nest(&format!("/api/{api_version}/markets"), markets)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            origins
                .iter()
                .filter_map(|o| o.parse::<HeaderValue>().ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn list_markets(
    State(state): State<HttpState>,
    Query(query): Query<ListMarketsQuery>,
) -> Json<Vec<Market>> {
    Json(state.markets.filter_markets(&query.into_filter()))
}

async fn get_market(
    State(state): State<HttpState>,
    Path(id): Path<String>,
) -> Result<Json<Market>, ApiError> {
    let market = state.markets.get_market(&MarketId::from(id))?;
    Ok(Json(market))
}

async fn create_market(
    State(state): State<HttpState>,
    body: Result<Json<CreateMarketRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Market>), ApiError> {
    let Json(request) = body.map_err(|_| ApiError::invalid("Invalid market data"))?;
    let input = NewMarket::try_from(request)?;

    let market = state.markets.create_market(input)?;
    Ok((StatusCode::CREATED, Json(market)))
}

async fn update_odds(
    State(state): State<HttpState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateOddsRequest>, JsonRejection>,
) -> Result<Json<Market>, ApiError> {
    let Json(request) = body.map_err(|_| ApiError::invalid("Invalid odds updates"))?;
    let updates = request.into_updates()?;

    let market = state
        .markets
        .update_odds(&MarketId::from(id), &updates)?;
    Ok(Json(market))
}

async fn update_status(
    State(state): State<HttpState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<Market>, ApiError> {
    let Json(request) = body.map_err(|_| ApiError::invalid("Invalid market status"))?;

    let market = state
        .markets
        .update_status(&MarketId::from(id), request.status)?;
    Ok(Json(market))
}
