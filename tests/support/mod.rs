#![allow(dead_code)]

pub mod http;

use std::sync::Arc;

use oddsdesk::app::App;
use oddsdesk::config::Config;
use oddsdesk::testkit::{ManualClock, RecordingObserver};

/// A seeded app on a manual clock with a recording observer attached.
pub struct TestApp {
    pub app: App,
    pub clock: Arc<ManualClock>,
    pub observer: RecordingObserver,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let clock = Arc::new(ManualClock::default());
        let observer = RecordingObserver::new();
        let app = App::builder(config)
            .clock(clock.clone())
            .observer(Box::new(observer.clone()))
            .build();

        Self {
            app,
            clock,
            observer,
        }
    }
}
