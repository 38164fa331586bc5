//! Market-service domain: identifiers, markets, selections and events.
//!
//! Everything here is plain data plus pure logic. Storage, time and
//! notification live behind the traits in [`crate::port`].

pub mod event;
pub mod id;
pub mod market;

pub use event::{Event, EventStatus, Sport};
pub use id::{EventId, MarketId, SelectionId, SportId};
pub use market::{
    Market, MarketFilter, MarketStatus, NewSelection, OddsChange, OddsUpdate, Selection,
};
