//! Composition root.
//!
//! Builds the store, notifier, services and idempotency cache once and hands
//! out shared handles. Nothing in the crate is a global; tests build their
//! own [`App`] with a manual clock and recording observers.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::adapter::http::{self, CachedResponse, HttpState};
use crate::adapter::notifier::ChangeNotifier;
use crate::adapter::store::MemoryStore;
use crate::application::idempotency::{spawn_sweeper, IdempotencyCache};
use crate::application::market::MarketService;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::port::{Clock, OddsObserver, SystemClock};

/// Collects the pieces that vary between production and tests.
pub struct AppBuilder {
    config: Config,
    clock: Arc<dyn Clock>,
    observers: Vec<Box<dyn OddsObserver>>,
}

impl AppBuilder {
    /// Use `clock` for market timestamps and idempotency expiry.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Register an odds observer.
    #[must_use]
    pub fn observer(mut self, observer: Box<dyn OddsObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    #[must_use]
    pub fn build(self) -> App {
        let store = Arc::new(if self.config.server.seed {
            MemoryStore::seeded(self.clock.now())
        } else {
            MemoryStore::new()
        });

        let mut notifier = ChangeNotifier::new();
        for observer in self.observers {
            notifier.register(observer);
        }

        let markets = Arc::new(MarketService::new(
            store.clone(),
            store.clone(),
            Arc::new(notifier),
            self.clock.clone(),
        ));
        let idempotency = Arc::new(IdempotencyCache::new(
            self.config.idempotency.ttl(),
            self.clock,
        ));

        App {
            config: self.config,
            store,
            markets,
            idempotency,
        }
    }
}

/// The assembled service.
pub struct App {
    config: Config,
    store: Arc<MemoryStore>,
    markets: Arc<MarketService>,
    idempotency: Arc<IdempotencyCache<CachedResponse>>,
}

impl App {
    /// Start building an app with the system clock and no observers.
    #[must_use]
    pub fn builder(config: Config) -> AppBuilder {
        AppBuilder {
            config,
            clock: Arc::new(SystemClock),
            observers: Vec::new(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }

    #[must_use]
    pub fn markets(&self) -> &Arc<MarketService> {
        &self.markets
    }

    #[must_use]
    pub fn idempotency(&self) -> &Arc<IdempotencyCache<CachedResponse>> {
        &self.idempotency
    }

    /// The HTTP router over this app's state.
    #[must_use]
    pub fn router(&self) -> Router {
        let state = HttpState {
            markets: self.markets.clone(),
            idempotency: self.idempotency.clone(),
            require_uuid_keys: self.config.idempotency.require_uuid_keys,
        };
        http::router(
            state,
            &self.config.server.api_version,
            &self.config.server.cors_origins,
        )
    }

    /// Bind the configured address and serve until `signal` resolves.
    ///
    /// # Errors
    ///
    /// Fails if the address cannot be bound, the server errors, or in-flight
    /// requests outlast `shutdown_grace_secs` after the signal.
    pub async fn serve<F>(self, signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.server.bind_addr()).await?;
        self.serve_on(listener, signal).await
    }

    /// Serve on an already-bound listener.
    ///
    /// The idempotency sweeper runs for as long as the server does.
    ///
    /// # Errors
    ///
    /// See [`serve`](Self::serve).
    pub async fn serve_on<F>(self, listener: TcpListener, signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!(
            addr = %listener.local_addr()?,
            environment = %self.config.server.environment,
            api_version = %self.config.server.api_version,
            "Server listening"
        );

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let sweeper = spawn_sweeper(
            self.idempotency.clone(),
            self.config.idempotency.sweep_interval(),
            shutdown_rx.clone(),
        );

        let grace_secs = self.config.server.shutdown_grace_secs;
        let server = axum::serve(listener, self.router()).with_graceful_shutdown(async move {
            signal.await;
            info!("Shutdown signal received, draining connections");
            let _ = shutdown_tx.send(true);
        });

        let mut drain_rx = shutdown_rx;
        let deadline = async move {
            // Only start the grace timer once shutdown has begun.
            while drain_rx.changed().await.is_ok() {
                if *drain_rx.borrow() {
                    tokio::time::sleep(Duration::from_secs(grace_secs)).await;
                    return;
                }
            }
            std::future::pending::<()>().await;
        };

        let result = tokio::select! {
            result = async move { server.await } => result.map_err(Error::from),
            () = deadline => {
                warn!(grace_secs, "Could not close connections in time");
                Err(Error::ShutdownTimeout { grace_secs })
            }
        };

        sweeper.abort();
        info!("HTTP server closed");
        result
    }
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::EventDirectory;
    use crate::testkit::ManualClock;

    #[test]
    fn seeding_follows_config() {
        let app = App::builder(Config::default()).build();
        assert_eq!(app.store().events().len(), 2);

        let mut config = Config::default();
        config.server.seed = false;
        let bare = App::builder(config).build();
        assert!(bare.store().events().is_empty());
    }

    #[test]
    fn idempotency_window_comes_from_config() {
        let mut config = Config::default();
        config.idempotency.ttl_secs = 42;
        let app = App::builder(config)
            .clock(Arc::new(ManualClock::default()))
            .build();

        assert_eq!(app.idempotency().ttl(), chrono::Duration::seconds(42));
    }

    #[tokio::test]
    async fn serve_on_stops_when_signalled() {
        let app = App::builder(Config::default()).build();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let server = tokio::spawn(app.serve_on(listener, async move {
            let _ = rx.await;
        }));
        tx.send(()).unwrap();

        assert!(server.await.unwrap().is_ok());
    }
}
