//! Market use cases: creation, odds updates, status changes and queries.

mod service;

pub use service::{MarketService, NewMarket};
