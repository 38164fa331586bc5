//! Builders for domain primitives used across tests.
//!
//! Concise factories so tests focus on assertions rather than
//! construction boilerplate.

use crate::application::market::NewMarket;
use crate::domain::{EventId, MarketId, NewSelection, OddsUpdate, SelectionId};

/// Create a [`MarketId`] from a string.
pub fn market_id(id: &str) -> MarketId {
    MarketId::from(id)
}

/// Create a [`SelectionId`] from a string.
pub fn selection_id(id: &str) -> SelectionId {
    SelectionId::from(id)
}

/// A creation request on `event_id` with the given `(name, odds)` selections.
pub fn new_market(event_id: &str, name: &str, selections: &[(&str, f64)]) -> NewMarket {
    NewMarket {
        event_id: EventId::from(event_id),
        name: name.to_string(),
        selections: selections
            .iter()
            .map(|(name, odds)| NewSelection::new(*name, *odds))
            .collect(),
    }
}

/// The canonical "Win Market" on `event1` with one selection at 2.0.
pub fn win_market() -> NewMarket {
    new_market("event1", "Win Market", &[("Team A", 2.0)])
}

/// A single odds update.
pub fn odds(selection: &SelectionId, value: f64) -> OddsUpdate {
    OddsUpdate::new(selection.clone(), value)
}
