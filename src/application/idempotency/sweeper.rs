//! Periodic removal of expired idempotency records.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::cache::IdempotencyCache;

/// Run [`IdempotencyCache::sweep`] every `every` until `shutdown` flips to
/// `true` or its sender is dropped.
///
/// Runs independently of request traffic so memory stays bounded even when
/// no lookups happen.
pub fn spawn_sweeper<T>(
    cache: Arc<IdempotencyCache<T>>,
    every: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()>
where
    T: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        info!("Idempotency sweeper stopping");
                        break;
                    }
                }
                _ = ticker.tick() => {
                    let removed = cache.sweep_now();
                    if removed > 0 {
                        debug!(removed, remaining = cache.len(), "Swept expired idempotency records");
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::ManualClock;

    #[tokio::test(start_paused = true)]
    async fn sweeper_removes_expired_records_on_interval() {
        let clock = Arc::new(ManualClock::default());
        let cache = Arc::new(IdempotencyCache::<u32>::new(
            chrono::Duration::seconds(30),
            clock.clone(),
        ));
        cache.record("k1", 1, chrono::Duration::seconds(30));
        clock.advance(chrono::Duration::seconds(31));

        let (tx, rx) = watch::channel(false);
        let handle = spawn_sweeper(Arc::clone(&cache), Duration::from_secs(60), rx);

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(cache.len(), 0);

        tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn sweeper_stops_when_sender_dropped() {
        let cache = Arc::new(IdempotencyCache::<u32>::new(
            chrono::Duration::seconds(30),
            Arc::new(ManualClock::default()),
        ));
        let (tx, rx) = watch::channel(false);
        let handle = spawn_sweeper(cache, Duration::from_secs(60), rx);

        drop(tx);
        handle.await.unwrap();
    }
}
