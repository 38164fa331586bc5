//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`clock`] - [`ManualClock`], a clock that only moves when told to.
//! - [`observer`] - [`RecordingObserver`], collects published odds changes.
//! - [`domain`] - Builders for markets, selections and odds updates.

pub mod clock;
pub mod domain;
pub mod observer;

pub use clock::ManualClock;
pub use observer::RecordingObserver;
