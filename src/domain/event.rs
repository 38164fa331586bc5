//! Sporting events and sports.
//!
//! Events are reference data: markets point at them, but this service never
//! creates or mutates them outside of seeding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{EventId, SportId};

/// Lifecycle state of a sporting event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Upcoming,
    Live,
    Finished,
    Cancelled,
}

/// A sport that events are grouped under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sport {
    pub id: SportId,
    pub name: String,
}

impl Sport {
    pub fn new(id: impl Into<SportId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A fixture that markets are offered on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub sport_id: SportId,
    pub status: EventStatus,
    pub start_time: DateTime<Utc>,
}

impl Event {
    /// Create an upcoming event.
    pub fn upcoming(
        id: impl Into<EventId>,
        name: impl Into<String>,
        sport_id: impl Into<SportId>,
        start_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            sport_id: sport_id.into(),
            status: EventStatus::Upcoming,
            start_time,
        }
    }
}
