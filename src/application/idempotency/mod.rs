//! Idempotent execution of mutating operations.
//!
//! A client-supplied key identifies one logical attempt. The first attempt
//! under a key runs the operation and records its successful outcome; later
//! attempts inside the validity window replay that outcome without running
//! anything.
//!
//! - [`IdempotencyCache`] - key to outcome map with expiry and per-key gates
//! - [`Outcome`] - whether a result was produced now or replayed
//! - [`spawn_sweeper`] - background removal of expired records
//! - [`generate_key`], [`is_valid_key`] - key helpers for clients and the HTTP layer

mod cache;
mod key;
mod sweeper;

pub use cache::{IdempotencyCache, IdempotencyRecord, Outcome};
pub use key::{generate_key, is_valid_key};
pub use sweeper::spawn_sweeper;
