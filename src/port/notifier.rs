//! Odds change notification port.
//!
//! This module defines the event published for each individual odds
//! transition and the trait that observers implement to receive it.

use chrono::{DateTime, Utc};

use crate::domain::{MarketId, OddsChange, SelectionId};

/// One selection's odds moved from `old_odds` to `new_odds`.
///
/// Never produced when the two values are equal.
#[derive(Debug, Clone, PartialEq)]
pub struct OddsChangeEvent {
    pub market_id: MarketId,
    pub selection_id: SelectionId,
    pub old_odds: f64,
    pub new_odds: f64,
    pub timestamp: DateTime<Utc>,
}

impl OddsChangeEvent {
    /// Attach market and time context to a domain-level change.
    #[must_use]
    pub fn new(market_id: &MarketId, change: OddsChange, timestamp: DateTime<Utc>) -> Self {
        Self {
            market_id: market_id.clone(),
            selection_id: change.selection_id,
            old_odds: change.old_odds,
            new_odds: change.new_odds,
            timestamp,
        }
    }
}

/// Receiver of odds change events.
///
/// Observers are side channels (logging, downstream fan-out). The market
/// store has already been updated when they run, and they must not write
/// back to it.
///
/// # Implementation Notes
///
/// - Implementations must be thread-safe (`Send + Sync`)
/// - `on_odds_change` runs inline on the publishing request; keep it fast
///   and spawn a task for slow I/O
/// - A returned error is logged and swallowed by the notifier
pub trait OddsObserver: Send + Sync {
    /// Handle one odds change.
    fn on_odds_change(&self, event: &OddsChangeEvent) -> anyhow::Result<()>;

    /// Name used in logs when this observer fails.
    fn name(&self) -> &'static str {
        "observer"
    }
}
