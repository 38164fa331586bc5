//! Key to outcome cache with expiry and at-most-once execution.
//!
//! Records live in a [`DashMap`] so lookups, records and sweeps on different
//! keys never contend on a single lock. Execution of a first-time key is
//! serialized through a per-key async gate: whoever holds the gate re-checks
//! the cache before running the operation, so concurrent first attempts run
//! it once and the rest replay the recorded outcome.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;

use crate::port::Clock;

/// A recorded outcome and the instant it stops being honored.
#[derive(Debug, Clone)]
pub struct IdempotencyRecord<T> {
    pub outcome: T,
    pub expires_at: DateTime<Utc>,
}

impl<T> IdempotencyRecord<T> {
    /// Live records satisfy `now < expires_at`.
    #[must_use]
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Result of an idempotent execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The operation ran during this call.
    Executed(T),
    /// A previously recorded outcome was returned; nothing ran.
    Replayed(T),
}

impl<T> Outcome<T> {
    #[must_use]
    pub const fn is_replayed(&self) -> bool {
        matches!(self, Self::Replayed(_))
    }

    #[must_use]
    pub const fn get(&self) -> &T {
        match self {
            Self::Executed(value) | Self::Replayed(value) => value,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Self::Executed(value) | Self::Replayed(value) => value,
        }
    }
}

/// Idempotency cache keyed by client-supplied strings.
///
/// `T` is whatever the wrapped operation produces on success; the HTTP
/// layer stores status, content type and body bytes.
pub struct IdempotencyCache<T> {
    records: DashMap<String, IdempotencyRecord<T>>,
    gates: DashMap<String, Arc<Mutex<()>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<T> IdempotencyCache<T>
where
    T: Clone + Send + Sync,
{
    /// Create a cache whose [`execute`](Self::execute) records for `ttl`.
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            records: DashMap::new(),
            gates: DashMap::new(),
            ttl,
            clock,
        }
    }

    /// Validity window applied by [`execute`](Self::execute).
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Stored outcome for `key`, if one exists and has not expired.
    ///
    /// Expired records are treated as absent whether or not a sweep has
    /// removed them yet.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<T> {
        self.lookup_at(key, self.clock.now())
    }

    /// [`lookup`](Self::lookup) against an explicit instant.
    #[must_use]
    pub fn lookup_at(&self, key: &str, now: DateTime<Utc>) -> Option<T> {
        self.records
            .get(key)
            .filter(|record| record.is_live(now))
            .map(|record| record.outcome.clone())
    }

    /// Store `outcome` under `key` until `now + ttl`, replacing any existing
    /// record for the key.
    ///
    /// Callers outside [`execute`](Self::execute) must not record a key that
    /// is still live; `execute` guarantees this for its own callers.
    pub fn record(&self, key: &str, outcome: T, ttl: Duration) {
        let expires_at = self.clock.now() + ttl;
        self.records.insert(
            key.to_owned(),
            IdempotencyRecord {
                outcome,
                expires_at,
            },
        );
    }

    /// Remove every record with `expires_at < now`, and any gate nobody is
    /// waiting on. Returns the number of records removed.
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        let before = self.records.len();
        self.records.retain(|_, record| record.expires_at >= now);
        self.gates.retain(|_, gate| Arc::strong_count(gate) > 1);
        before.saturating_sub(self.records.len())
    }

    /// [`sweep`](Self::sweep) at the clock's current time.
    pub fn sweep_now(&self) -> usize {
        self.sweep(self.clock.now())
    }

    /// Number of records held, live or expired.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no records are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Run `op` at most once per live key.
    ///
    /// - No key: `op` runs and nothing is recorded.
    /// - Live record: the recorded outcome is replayed and `op` never runs.
    /// - Otherwise: the caller takes the key's gate, re-checks the cache, and
    ///   only then runs `op`. Concurrent callers with the same key wait on
    ///   the gate and replay whatever the first caller recorded.
    ///
    /// Only `Ok` outcomes are recorded. An `Err` is returned as is and the
    /// key stays free, so the client may retry with it.
    ///
    /// # Errors
    ///
    /// Passes through the error produced by `op`.
    pub async fn execute<F, Fut, E>(&self, key: Option<&str>, op: F) -> Result<Outcome<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let Some(key) = key else {
            return op().await.map(Outcome::Executed);
        };

        if let Some(hit) = self.lookup(key) {
            debug!(key, "Replaying idempotent outcome");
            return Ok(Outcome::Replayed(hit));
        }

        let gate = self.gates.entry(key.to_owned()).or_default().clone();
        let result = {
            let _held = gate.lock().await;

            if let Some(hit) = self.lookup(key) {
                debug!(key, "Replaying outcome recorded while waiting");
                Ok(Outcome::Replayed(hit))
            } else {
                match op().await {
                    Ok(outcome) => {
                        self.record(key, outcome.clone(), self.ttl);
                        Ok(Outcome::Executed(outcome))
                    }
                    Err(e) => {
                        debug!(key, "Operation failed; outcome not recorded");
                        Err(e)
                    }
                }
            }
        };

        drop(gate);
        self.gates
            .remove_if(key, |_, gate| Arc::strong_count(gate) == 1);

        result
    }
}
