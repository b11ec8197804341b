//! Tracks when the access token was last refreshed

use crate::config::SessionConfig;
use crate::storage::KeyValueStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Answers whether the access token is old enough to refresh before use
///
/// The refresh time is kept in a [`KeyValueStore`] so it survives restarts.
/// A missing or unreadable value always means "refresh".
#[derive(Clone)]
pub struct TokenFreshness {
    store: Arc<dyn KeyValueStore>,
    key: String,
    stale_after: Duration,
}

impl TokenFreshness {
    pub fn new(store: Arc<dyn KeyValueStore>, config: &SessionConfig) -> Self {
        Self {
            store,
            key: config.timestamp_key.clone(),
            stale_after: config.stale_after(),
        }
    }

    pub fn should_refresh(&self) -> bool {
        self.should_refresh_at(Utc::now())
    }

    pub fn should_refresh_at(&self, now: DateTime<Utc>) -> bool {
        let Some(refreshed_at) = self.last_refresh() else {
            return true;
        };
        // A timestamp from the future cannot be trusted
        if refreshed_at > now {
            return true;
        }
        let elapsed_ms = (now - refreshed_at).num_milliseconds();
        let stale_after_ms = i64::try_from(self.stale_after.as_millis()).unwrap_or(i64::MAX);
        elapsed_ms > stale_after_ms
    }

    /// Time of the last recorded refresh, if a valid one is stored
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!(error = %err, "failed to read refresh timestamp");
                return None;
            }
        };
        match DateTime::parse_from_rfc3339(raw.trim()) {
            Ok(at) => Some(at.with_timezone(&Utc)),
            Err(err) => {
                debug!(error = %err, "ignoring malformed refresh timestamp");
                None
            }
        }
    }

    pub fn record_refresh(&self, now: DateTime<Utc>) {
        if let Err(err) = self.store.set(&self.key, &now.to_rfc3339()) {
            warn!(error = %err, "failed to persist refresh timestamp");
        }
    }

    pub fn clear(&self) {
        if let Err(err) = self.store.remove(&self.key) {
            warn!(error = %err, "failed to clear refresh timestamp");
        }
    }
}
