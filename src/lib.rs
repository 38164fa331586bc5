//! Oddsdesk - In-memory betting markets with idempotent writes.
//!
//! This crate keeps sports, events and their betting markets in memory,
//! applies odds updates atomically and tells registered observers about every
//! price that moved. Mutating HTTP requests may carry an `Idempotency-Key`
//! header; a retried request within the replay window gets the original
//! response back instead of running twice.
//!
//! # Architecture
//!
//! - **`domain`** - Markets, selections, events and the pure odds-update rule
//! - **`port`** - Store, clock and observer traits
//! - **`adapter`** - In-memory store, change notifier and the axum HTTP surface
//! - **`application`** - Market use cases and the idempotency cache
//!
//! # Modules
//!
//! - [`app`] - Composition root and server lifecycle
//! - [`config`] - Configuration loading from TOML with env overrides
//! - [`error`] - Error types for the crate
//!
//! # Features
//!
//! - `testkit` - Manual clock, recording observer and market builders for tests
//!
//! # Example
//!
//! ```no_run
//! use oddsdesk::app::App;
//! use oddsdesk::config::Config;
//!
//! let app = App::builder(Config::default()).build();
//! let router = app.router();
//! ```

pub mod adapter;
pub mod app;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
