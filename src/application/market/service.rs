//! Market service.
//!
//! Owns the odds update pipeline: read the market, compute which selections
//! actually moved, write the result back as one atomic replacement, then
//! publish one [`OddsChangeEvent`] per moved selection.
//!
//! ```text
//! update_odds ──> MarketStore::modify ──(changes)──> ChangeNotifier::publish
//!                   (exclusive)                        (after the write)
//! ```

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info};

use crate::adapter::notifier::ChangeNotifier;
use crate::domain::{
    EventId, Market, MarketFilter, MarketId, MarketStatus, NewSelection, OddsChange, OddsUpdate,
};
use crate::error::{Error, Result};
use crate::port::{Clock, EventDirectory, MarketStore, OddsChangeEvent};

/// Input for [`MarketService::create_market`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMarket {
    pub event_id: EventId,
    pub name: String,
    pub selections: Vec<NewSelection>,
}

/// Market use cases over injected store, directory, notifier and clock.
pub struct MarketService {
    markets: Arc<dyn MarketStore>,
    events: Arc<dyn EventDirectory>,
    notifier: Arc<ChangeNotifier>,
    clock: Arc<dyn Clock>,
}

impl MarketService {
    pub fn new(
        markets: Arc<dyn MarketStore>,
        events: Arc<dyn EventDirectory>,
        notifier: Arc<ChangeNotifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            markets,
            events,
            notifier,
            clock,
        }
    }

    /// All markets.
    #[must_use]
    pub fn list_markets(&self) -> Vec<Market> {
        self.markets.list()
    }

    /// Markets matching `filter`; an empty filter lists everything.
    #[must_use]
    pub fn filter_markets(&self, filter: &MarketFilter) -> Vec<Market> {
        if filter.is_empty() {
            return self.markets.list();
        }
        self.markets.filter(filter)
    }

    /// Fetch one market.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MarketNotFound`] if no market has this ID.
    pub fn get_market(&self, id: &MarketId) -> Result<Market> {
        self.markets
            .get(id)
            .ok_or_else(|| Error::MarketNotFound(id.clone()))
    }

    /// Create an open market on an existing event.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EventNotFound`] if the event is not in the directory.
    pub fn create_market(&self, input: NewMarket) -> Result<Market> {
        if self.events.event(&input.event_id).is_none() {
            return Err(Error::EventNotFound(input.event_id));
        }

        let market = Market::create(
            input.event_id,
            input.name,
            input.selections,
            self.clock.now(),
        );
        self.markets.put(market.clone());

        info!(
            market_id = %market.id(),
            event_id = %market.event_id(),
            selections = market.selections().len(),
            "Market created"
        );
        Ok(market)
    }

    /// Apply odds updates to a market.
    ///
    /// Unknown selection IDs are ignored and equal values are no-ops. When
    /// nothing moves the stored market is returned untouched, with no write
    /// and no events. Otherwise the new selections and `updated_at` replace
    /// the record atomically and one event per change is published, in the
    /// order the updates were given.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MarketNotFound`] if no market has this ID.
    pub fn update_odds(&self, id: &MarketId, updates: &[OddsUpdate]) -> Result<Market> {
        let now = self.clock.now();
        let mut changes: Vec<OddsChange> = Vec::new();

        let market = self
            .markets
            .modify(id, &mut |current| {
                let (next, moved) = current.apply_odds(updates, now)?;
                changes = moved;
                Some(next)
            })
            .ok_or_else(|| Error::MarketNotFound(id.clone()))?;

        if changes.is_empty() {
            debug!(market_id = %id, updates = updates.len(), "No odds changed");
            return Ok(market);
        }

        debug!(market_id = %id, changed = changes.len(), "Odds updated");
        for change in changes {
            self.notifier
                .publish(&OddsChangeEvent::new(market.id(), change, now));
        }

        Ok(market)
    }

    /// Assign a status directly.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MarketNotFound`] if no market has this ID.
    pub fn update_status(&self, id: &MarketId, status: MarketStatus) -> Result<Market> {
        let now = self.clock.now();

        let market = self
            .markets
            .modify(id, &mut |current| Some(current.with_status(status, now)))
            .ok_or_else(|| Error::MarketNotFound(id.clone()))?;

        info!(market_id = %id, status = %status, "Market status updated");
        Ok(market)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::store::MemoryStore;
    use crate::domain::SelectionId;
    use crate::testkit::domain::win_market;
    use crate::testkit::{ManualClock, RecordingObserver};
    use chrono::Duration;

    struct Fixture {
        service: MarketService,
        store: Arc<MemoryStore>,
        clock: Arc<ManualClock>,
        observer: RecordingObserver,
    }

    fn fixture() -> Fixture {
        let clock = Arc::new(ManualClock::default());
        let store = Arc::new(MemoryStore::seeded(clock.now()));
        let observer = RecordingObserver::new();
        let mut notifier = ChangeNotifier::new();
        notifier.register(Box::new(observer.clone()));

        let service = MarketService::new(
            store.clone(),
            store.clone(),
            Arc::new(notifier),
            clock.clone(),
        );

        Fixture {
            service,
            store,
            clock,
            observer,
        }
    }

    #[test]
    fn create_market_requires_known_event() {
        let fx = fixture();
        let input = NewMarket {
            event_id: EventId::from("nonexistent"),
            ..win_market()
        };

        let err = fx.service.create_market(input).unwrap_err();

        assert!(matches!(err, Error::EventNotFound(ref id) if id.as_str() == "nonexistent"));
        assert!(fx.store.is_empty());
    }

    #[test]
    fn update_odds_scenario() {
        let fx = fixture();
        let market = fx.service.create_market(win_market()).unwrap();
        let sel1 = market.selections()[0].id().clone();
        fx.clock.advance(Duration::seconds(10));

        let updated = fx
            .service
            .update_odds(market.id(), &[OddsUpdate::new(sel1.clone(), 2.5)])
            .unwrap();

        assert_eq!(updated.selections()[0].odds(), 2.5);
        assert!(updated.updated_at() > market.updated_at());

        let events = fx.observer.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].market_id, *market.id());
        assert_eq!(events[0].selection_id, sel1);
        assert_eq!(events[0].old_odds, 2.0);
        assert_eq!(events[0].new_odds, 2.5);
        assert_eq!(events[0].timestamp, fx.clock.now());
    }

    #[test]
    fn reapplying_same_odds_is_a_noop() {
        let fx = fixture();
        let market = fx.service.create_market(win_market()).unwrap();
        let sel1 = market.selections()[0].id().clone();
        let updates = [OddsUpdate::new(sel1, 3.0)];

        let first = fx.service.update_odds(market.id(), &updates).unwrap();
        fx.clock.advance(Duration::seconds(5));
        let second = fx.service.update_odds(market.id(), &updates).unwrap();

        assert_eq!(first, second);
        assert_eq!(second.updated_at(), first.updated_at());
        assert_eq!(fx.observer.len(), 1);
    }

    #[test]
    fn unknown_selection_is_ignored() {
        let fx = fixture();
        let market = fx.service.create_market(win_market()).unwrap();

        let result = fx
            .service
            .update_odds(market.id(), &[OddsUpdate::new(SelectionId::from("ghost"), 9.0)])
            .unwrap();

        assert_eq!(result, market);
        assert_eq!(fx.observer.len(), 0);
    }

    #[test]
    fn empty_update_list_is_success() {
        let fx = fixture();
        let market = fx.service.create_market(win_market()).unwrap();

        let result = fx.service.update_odds(market.id(), &[]).unwrap();

        assert_eq!(result.updated_at(), market.updated_at());
        assert!(fx.observer.is_empty());
    }

    #[test]
    fn update_odds_missing_market() {
        let fx = fixture();

        let err = fx
            .service
            .update_odds(&MarketId::from("missing"), &[OddsUpdate::new("sel1", 2.0)])
            .unwrap_err();

        assert!(err.is_not_found());
        assert!(fx.observer.is_empty());
    }

    #[test]
    fn events_follow_supplied_order() {
        let fx = fixture();
        let market = fx
            .service
            .create_market(NewMarket {
                selections: vec![
                    NewSelection::new("Home", 2.0),
                    NewSelection::new("Draw", 3.2),
                    NewSelection::new("Away", 4.0),
                ],
                ..win_market()
            })
            .unwrap();
        let ids: Vec<_> = market.selections().iter().map(|s| s.id().clone()).collect();

        fx.service
            .update_odds(
                market.id(),
                &[
                    OddsUpdate::new(ids[2].clone(), 3.8),
                    OddsUpdate::new(ids[1].clone(), 3.2),
                    OddsUpdate::new(ids[0].clone(), 2.1),
                ],
            )
            .unwrap();

        let seen: Vec<_> = fx
            .observer
            .events()
            .into_iter()
            .map(|e| e.selection_id)
            .collect();
        assert_eq!(seen, vec![ids[2].clone(), ids[0].clone()]);
    }

    #[test]
    fn update_status_assigns_and_touches() {
        let fx = fixture();
        let market = fx.service.create_market(win_market()).unwrap();
        fx.clock.advance(Duration::seconds(1));

        let suspended = fx
            .service
            .update_status(market.id(), MarketStatus::Suspended)
            .unwrap();

        assert_eq!(suspended.status(), MarketStatus::Suspended);
        assert!(suspended.updated_at() > market.updated_at());
        assert_eq!(
            fx.service.get_market(market.id()).unwrap().status(),
            MarketStatus::Suspended
        );
    }

    #[test]
    fn filter_markets_by_sport_and_status() {
        let fx = fixture();
        fx.service.create_market(win_market()).unwrap();
        let race = fx
            .service
            .create_market(NewMarket {
                event_id: EventId::from("event2"),
                name: "Winner".into(),
                selections: vec![NewSelection::new("Horse 1", 5.0)],
            })
            .unwrap();
        fx.service
            .update_status(race.id(), MarketStatus::Closed)
            .unwrap();

        let racing = fx.service.filter_markets(&MarketFilter {
            sport_id: Some("sport_hr".into()),
            ..Default::default()
        });
        assert_eq!(racing.len(), 1);

        let open = fx.service.filter_markets(&MarketFilter {
            status: Some(MarketStatus::Open),
            ..Default::default()
        });
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].event_id().as_str(), "event1");

        assert_eq!(fx.service.filter_markets(&MarketFilter::default()).len(), 2);
        assert_eq!(fx.service.list_markets().len(), 2);
    }
}
