//! In-memory market store and event directory.
//!
//! Markets, events and sports each sit behind their own `RwLock`. The only
//! place two locks are held together is [`MarketStore::filter`], which
//! always takes markets before events.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use tracing::debug;

use crate::domain::{Event, EventId, Market, MarketFilter, MarketId, Sport, SportId};
use crate::port::{EventDirectory, MarketStore};

/// Process-local store for markets plus the reference data they point at.
#[derive(Debug, Default)]
pub struct MemoryStore {
    markets: RwLock<HashMap<MarketId, Market>>,
    events: RwLock<HashMap<EventId, Event>>,
    sports: RwLock<HashMap<SportId, Sport>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store preloaded with the demo sports and events.
    #[must_use]
    pub fn seeded(now: DateTime<Utc>) -> Self {
        let store = Self::new();
        store.seed(now);
        store
    }

    /// Load the demo sports and events, relative to `now`.
    pub fn seed(&self, now: DateTime<Utc>) {
        let football = Sport::new("sport_fb", "Football");
        let horse_racing = Sport::new("sport_hr", "Horse Racing");

        let match_day = Event::upcoming(
            "event1",
            "Liverpool vs Manchester United",
            football.id.clone(),
            now + Duration::hours(24),
        );
        let race = Event::upcoming(
            "event2",
            "Ascot 15:30",
            horse_racing.id.clone(),
            now + Duration::hours(1),
        );

        self.insert_sport(football);
        self.insert_sport(horse_racing);
        self.insert_event(match_day);
        self.insert_event(race);

        debug!(events = self.events.read().len(), "Seeded event directory");
    }

    /// Add or replace a sport.
    pub fn insert_sport(&self, sport: Sport) {
        self.sports.write().insert(sport.id.clone(), sport);
    }

    /// Add or replace an event.
    pub fn insert_event(&self, event: Event) {
        self.events.write().insert(event.id.clone(), event);
    }

    /// Number of markets held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.markets.read().len()
    }

    /// Returns true if no markets are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MarketStore for MemoryStore {
    fn get(&self, id: &MarketId) -> Option<Market> {
        self.markets.read().get(id).cloned()
    }

    fn put(&self, market: Market) {
        self.markets.write().insert(market.id().clone(), market);
    }

    fn list(&self) -> Vec<Market> {
        self.markets.read().values().cloned().collect()
    }

    fn filter(&self, filter: &MarketFilter) -> Vec<Market> {
        let markets = self.markets.read();
        let events = self.events.read();

        markets
            .values()
            .filter(|market| {
                filter.matches(market, |event_id| {
                    events.get(event_id).map(|e| e.sport_id.clone())
                })
            })
            .cloned()
            .collect()
    }

    fn modify(
        &self,
        id: &MarketId,
        apply: &mut dyn FnMut(&Market) -> Option<Market>,
    ) -> Option<Market> {
        let mut markets = self.markets.write();
        let current = markets.get_mut(id)?;

        if let Some(next) = apply(&*current) {
            *current = next;
        }
        Some(current.clone())
    }
}

impl EventDirectory for MemoryStore {
    fn event(&self, id: &EventId) -> Option<Event> {
        self.events.read().get(id).cloned()
    }

    fn events(&self) -> Vec<Event> {
        self.events.read().values().cloned().collect()
    }

    fn sport(&self, id: &SportId) -> Option<Sport> {
        self.sports.read().get(id).cloned()
    }
}
