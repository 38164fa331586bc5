//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! # Available Ports
//!
//! - [`MarketStore`], [`EventDirectory`] - In-process state
//! - [`OddsObserver`] - Odds change notifications
//! - [`Clock`] - Time source

mod clock;
mod notifier;
mod store;

pub use clock::{Clock, SystemClock};
pub use notifier::{OddsChangeEvent, OddsObserver};
pub use store::{EventDirectory, MarketStore};
