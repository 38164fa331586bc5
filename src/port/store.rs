//! Storage ports for markets and the event directory.

use crate::domain::{Event, EventId, Market, MarketFilter, MarketId, Sport, SportId};

/// Authoritative market state.
///
/// Every call sees a consistent snapshot. Writes replace the whole market
/// record; there is no field-level merge.
///
/// # Implementation Notes
///
/// - Implementations must be thread-safe (`Send + Sync`)
/// - [`MarketStore::modify`] must hold exclusive access to the record for
///   the whole read-compute-write so concurrent modifications cannot lose
///   each other's writes
pub trait MarketStore: Send + Sync {
    /// Get a snapshot of a market.
    fn get(&self, id: &MarketId) -> Option<Market>;

    /// Insert or replace a market keyed by its ID.
    fn put(&self, market: Market);

    /// All markets, in no particular order.
    fn list(&self) -> Vec<Market>;

    /// Markets matching every populated criterion of `filter`.
    fn filter(&self, filter: &MarketFilter) -> Vec<Market>;

    /// Atomically read, transform and conditionally replace one market.
    ///
    /// `apply` receives the current record. Returning `Some(next)` stores
    /// `next`; returning `None` leaves the record untouched.
    ///
    /// Returns `None` if the market does not exist, otherwise the record as
    /// it stands after the call.
    fn modify(
        &self,
        id: &MarketId,
        apply: &mut dyn FnMut(&Market) -> Option<Market>,
    ) -> Option<Market>;
}

/// Read access to sporting events and sports owned elsewhere.
pub trait EventDirectory: Send + Sync {
    /// Look up an event.
    fn event(&self, id: &EventId) -> Option<Event>;

    /// All known events.
    fn events(&self) -> Vec<Event>;

    /// Look up a sport.
    fn sport(&self, id: &SportId) -> Option<Sport>;
}
