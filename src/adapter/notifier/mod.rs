//! Odds change notification adapters.
//!
//! [`ChangeNotifier`] fans each [`OddsChangeEvent`] out to every registered
//! [`OddsObserver`]. Observers are registered by the composition root; the
//! notifier starts with none.

use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::{info, warn};

use crate::port::{OddsChangeEvent, OddsObserver};

/// Registry of odds observers (composite pattern).
///
/// Delivery is synchronous: every observer has run by the time
/// [`publish`](Self::publish) returns. There is no queue and no replay for
/// observers registered later.
#[derive(Default)]
pub struct ChangeNotifier {
    observers: Vec<Box<dyn OddsObserver>>,
}

impl ChangeNotifier {
    /// Create an empty notifier.
    #[must_use]
    pub fn new() -> Self {
        Self { observers: vec![] }
    }

    /// Register an observer.
    pub fn register(&mut self, observer: Box<dyn OddsObserver>) {
        self.observers.push(observer);
    }

    /// Deliver `event` to all observers.
    ///
    /// A failing observer, whether it returns an error or panics, is logged
    /// and skipped. The remaining observers still run and the publisher
    /// never sees the failure.
    pub fn publish(&self, event: &OddsChangeEvent) {
        for observer in &self.observers {
            match catch_unwind(AssertUnwindSafe(|| observer.on_odds_change(event))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!(
                        observer = observer.name(),
                        market_id = %event.market_id,
                        error = %e,
                        "Odds observer failed"
                    );
                }
                Err(_) => {
                    warn!(
                        observer = observer.name(),
                        market_id = %event.market_id,
                        "Odds observer panicked"
                    );
                }
            }
        }
    }

    /// Number of registered observers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Check if no observers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

/// A no-op observer for testing or when notifications are disabled.
pub struct NullObserver;

impl OddsObserver for NullObserver {
    fn on_odds_change(&self, _event: &OddsChangeEvent) -> anyhow::Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "null"
    }
}

/// Logs each odds change via tracing.
pub struct LogObserver;

impl OddsObserver for LogObserver {
    fn on_odds_change(&self, event: &OddsChangeEvent) -> anyhow::Result<()> {
        info!(
            market_id = %event.market_id,
            selection_id = %event.selection_id,
            old_odds = event.old_odds,
            new_odds = event.new_odds,
            at = %event.timestamp.to_rfc3339(),
            "Odds changed"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MarketId, SelectionId};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingObserver {
        count: Arc<AtomicUsize>,
    }

    impl OddsObserver for CountingObserver {
        fn on_odds_change(&self, _event: &OddsChangeEvent) -> anyhow::Result<()> {
            self.count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingObserver;

    impl OddsObserver for FailingObserver {
        fn on_odds_change(&self, _event: &OddsChangeEvent) -> anyhow::Result<()> {
            anyhow::bail!("downstream unavailable")
        }
    }

    struct PanickingObserver;

    impl OddsObserver for PanickingObserver {
        fn on_odds_change(&self, _event: &OddsChangeEvent) -> anyhow::Result<()> {
            panic!("observer bug");
        }
    }

    fn sample_event() -> OddsChangeEvent {
        OddsChangeEvent {
            market_id: MarketId::from("m1"),
            selection_id: SelectionId::from("sel1"),
            old_odds: 2.0,
            new_odds: 2.5,
            timestamp: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_publish_reaches_all_observers() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut notifier = ChangeNotifier::new();

        notifier.register(Box::new(CountingObserver {
            count: count.clone(),
        }));
        notifier.register(Box::new(CountingObserver {
            count: count.clone(),
        }));

        notifier.publish(&sample_event());

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_failing_observers_are_isolated() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut notifier = ChangeNotifier::new();

        notifier.register(Box::new(FailingObserver));
        notifier.register(Box::new(PanickingObserver));
        notifier.register(Box::new(CountingObserver {
            count: count.clone(),
        }));

        notifier.publish(&sample_event());
        notifier.publish(&sample_event());

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_publish_without_observers_is_noop() {
        let notifier = ChangeNotifier::new();
        assert!(notifier.is_empty());
        notifier.publish(&sample_event());
    }

    #[test]
    fn test_builtin_observers_succeed() {
        let mut notifier = ChangeNotifier::new();
        notifier.register(Box::new(NullObserver));
        notifier.register(Box::new(LogObserver));
        assert_eq!(notifier.len(), 2);

        assert!(LogObserver.on_odds_change(&sample_event()).is_ok());
        assert!(NullObserver.on_odds_change(&sample_event()).is_ok());
    }
}
