//! Market-related domain types.
//!
//! - [`Market`] - A bettable proposition tied to an event, with ordered selections
//! - [`Selection`] - A single outcome option carrying current odds
//! - [`MarketStatus`] - Lifecycle state, assigned directly
//! - [`OddsUpdate`] / [`OddsChange`] - Requested and observed odds transitions
//! - [`MarketFilter`] - Query predicate over event, sport and status

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{EventId, MarketId, SelectionId, SportId};

/// Lifecycle state of a market.
///
/// No transition rules are enforced; any status may be assigned directly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketStatus {
    #[default]
    Open,
    Suspended,
    Closed,
    Settled,
}

impl MarketStatus {
    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Suspended => "suspended",
            Self::Closed => "closed",
            Self::Settled => "settled",
        }
    }
}

impl fmt::Display for MarketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "suspended" => Ok(Self::Suspended),
            "closed" => Ok(Self::Closed),
            "settled" => Ok(Self::Settled),
            other => Err(format!("unknown market status '{other}'")),
        }
    }
}

/// A single outcome option within a market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    id: SelectionId,
    name: String,
    odds: f64,
}

impl Selection {
    /// Create a selection with an explicit ID.
    pub fn new(id: SelectionId, name: impl Into<String>, odds: f64) -> Self {
        Self {
            id,
            name: name.into(),
            odds,
        }
    }

    #[must_use]
    pub const fn id(&self) -> &SelectionId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn odds(&self) -> f64 {
        self.odds
    }
}

/// Selection payload for market creation; the ID is assigned on creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSelection {
    pub name: String,
    pub odds: f64,
}

impl NewSelection {
    pub fn new(name: impl Into<String>, odds: f64) -> Self {
        Self {
            name: name.into(),
            odds,
        }
    }
}

/// A requested odds value for one selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OddsUpdate {
    pub selection_id: SelectionId,
    pub odds: f64,
}

impl OddsUpdate {
    pub fn new(selection_id: impl Into<SelectionId>, odds: f64) -> Self {
        Self {
            selection_id: selection_id.into(),
            odds,
        }
    }
}

/// An observed odds transition on one selection.
///
/// Only produced when the new value differs from the old one.
#[derive(Debug, Clone, PartialEq)]
pub struct OddsChange {
    pub selection_id: SelectionId,
    pub old_odds: f64,
    pub new_odds: f64,
}

/// A bettable proposition tied to an event.
///
/// Selections keep their creation order for the lifetime of the market.
/// `updated_at` moves forward on every mutation that reaches the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    id: MarketId,
    event_id: EventId,
    name: String,
    status: MarketStatus,
    selections: Vec<Selection>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Market {
    /// Create an open market, assigning fresh IDs to the market and each selection.
    pub fn create(
        event_id: EventId,
        name: impl Into<String>,
        selections: Vec<NewSelection>,
        now: DateTime<Utc>,
    ) -> Self {
        let selections = selections
            .into_iter()
            .map(|s| Selection::new(SelectionId::generate(), s.name, s.odds))
            .collect();

        Self {
            id: MarketId::generate(),
            event_id,
            name: name.into(),
            status: MarketStatus::Open,
            selections,
            created_at: now,
            updated_at: now,
        }
    }

    /// Assemble a market from existing parts.
    pub fn from_parts(
        id: MarketId,
        event_id: EventId,
        name: impl Into<String>,
        status: MarketStatus,
        selections: Vec<Selection>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            event_id,
            name: name.into(),
            status,
            selections,
            created_at,
            updated_at: created_at,
        }
    }

    #[must_use]
    pub const fn id(&self) -> &MarketId {
        &self.id
    }

    #[must_use]
    pub const fn event_id(&self) -> &EventId {
        &self.event_id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn status(&self) -> MarketStatus {
        self.status
    }

    #[must_use]
    pub fn selections(&self) -> &[Selection] {
        &self.selections
    }

    /// Look up a selection by ID.
    #[must_use]
    pub fn selection(&self, id: &SelectionId) -> Option<&Selection> {
        self.selections.iter().find(|s| s.id() == id)
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Compute the market that results from applying `updates` in order.
    ///
    /// Updates naming a selection this market does not have are skipped.
    /// Updates whose odds equal the current value are skipped. Each update
    /// is compared against the list as modified by earlier updates in the
    /// same batch.
    ///
    /// Returns `None` when nothing changed, otherwise the new market (with
    /// `updated_at = now`) and the changes in the order they were supplied.
    #[must_use]
    pub fn apply_odds(
        &self,
        updates: &[OddsUpdate],
        now: DateTime<Utc>,
    ) -> Option<(Market, Vec<OddsChange>)> {
        let mut selections = self.selections.clone();
        let mut changes = Vec::new();

        for update in updates {
            let Some(selection) = selections
                .iter_mut()
                .find(|s| s.id == update.selection_id)
            else {
                continue;
            };

            if selection.odds != update.odds {
                changes.push(OddsChange {
                    selection_id: selection.id.clone(),
                    old_odds: selection.odds,
                    new_odds: update.odds,
                });
                selection.odds = update.odds;
            }
        }

        if changes.is_empty() {
            return None;
        }

        let market = Market {
            selections,
            updated_at: now,
            ..self.clone()
        };
        Some((market, changes))
    }

    /// Return a copy with `status` assigned and `updated_at = now`.
    #[must_use]
    pub fn with_status(&self, status: MarketStatus, now: DateTime<Utc>) -> Market {
        Market {
            status,
            updated_at: now,
            ..self.clone()
        }
    }
}

/// Query predicate for listing markets.
///
/// Every populated field must match. Sport matching goes through the
/// market's event, so it needs a resolver from event to sport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarketFilter {
    pub sport_id: Option<SportId>,
    pub event_id: Option<EventId>,
    pub status: Option<MarketStatus>,
}

impl MarketFilter {
    /// True when no criteria are set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.sport_id.is_none() && self.event_id.is_none() && self.status.is_none()
    }

    /// Check a market against this filter.
    ///
    /// `sport_of` maps an event to its sport; an unknown event never
    /// matches a sport criterion.
    pub fn matches<F>(&self, market: &Market, sport_of: F) -> bool
    where
        F: Fn(&EventId) -> Option<SportId>,
    {
        if let Some(event_id) = &self.event_id {
            if market.event_id() != event_id {
                return false;
            }
        }

        if let Some(status) = self.status {
            if market.status() != status {
                return false;
            }
        }

        if let Some(sport_id) = &self.sport_id {
            match sport_of(market.event_id()) {
                Some(sport) if &sport == sport_id => {}
                _ => return false,
            }
        }

        true
    }
}
