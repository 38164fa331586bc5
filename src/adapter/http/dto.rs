//! Request payloads and their boundary validation.
//!
//! Shape checks happen here so the service only ever sees well-typed input.

use serde::Deserialize;

use crate::application::market::NewMarket;
use crate::domain::{EventId, MarketFilter, MarketStatus, NewSelection, OddsUpdate, SportId};

use super::error::ApiError;

/// Query string for `GET /markets`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMarketsQuery {
    pub sport_id: Option<String>,
    pub event_id: Option<String>,
    pub status: Option<String>,
}

impl ListMarketsQuery {
    /// Build a filter. Empty values and unrecognized statuses are dropped.
    #[must_use]
    pub fn into_filter(self) -> MarketFilter {
        MarketFilter {
            sport_id: self.sport_id.filter(|s| !s.is_empty()).map(SportId::from),
            event_id: self.event_id.filter(|s| !s.is_empty()).map(EventId::from),
            status: self.status.and_then(|s| s.parse::<MarketStatus>().ok()),
        }
    }
}

/// Body of `POST /markets`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMarketRequest {
    pub event_id: String,
    pub name: String,
    pub selections: Vec<NewSelection>,
}

impl TryFrom<CreateMarketRequest> for NewMarket {
    type Error = ApiError;

    fn try_from(req: CreateMarketRequest) -> Result<Self, Self::Error> {
        let valid = !req.event_id.is_empty()
            && !req.name.is_empty()
            && req
                .selections
                .iter()
                .all(|s| !s.name.is_empty() && is_valid_odds(s.odds));
        if !valid {
            return Err(ApiError::invalid("Invalid market data"));
        }

        Ok(NewMarket {
            event_id: EventId::from(req.event_id),
            name: req.name,
            selections: req.selections,
        })
    }
}

/// Body of `PATCH /markets/{id}/odds`.
#[derive(Debug, Deserialize)]
pub struct UpdateOddsRequest {
    pub updates: Vec<OddsUpdate>,
}

impl UpdateOddsRequest {
    /// Validate and unwrap the update list. An empty list is allowed.
    pub fn into_updates(self) -> Result<Vec<OddsUpdate>, ApiError> {
        if self.updates.iter().all(|u| is_valid_odds(u.odds)) {
            Ok(self.updates)
        } else {
            Err(ApiError::invalid("Invalid odds updates"))
        }
    }
}

/// Body of `PATCH /markets/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: MarketStatus,
}

fn is_valid_odds(odds: f64) -> bool {
    odds.is_finite() && odds > 0.0
}
