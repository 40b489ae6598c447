//! Process-wide gate state for the relay.
//!
//! Two pieces of bookkeeping, both process-memory only (a restart resets
//! them): a per-channel cooldown map and a bounded set of already-notified
//! message identities.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Minimum elapsed time between processing two events from the same channel.
pub const CHANNEL_COOLDOWN: Duration = Duration::from_secs(30);

/// Once the notified-set grows past this many entries it is cleared entirely.
pub const NOTIFIED_SET_CAP: usize = 1000;

/// Composite dedup key for a message.
pub fn message_identity(channel_id: &str, ts: &str) -> String {
    format!("{channel_id}_{ts}")
}

/// Cooldown and dedup bookkeeping shared by all handlers.
///
/// Trivially cloneable; all clones observe the same state.
#[derive(Clone, Default)]
pub struct RelayState {
    inner: Arc<RelayStateInner>,
}

#[derive(Default)]
struct RelayStateInner {
    cooldowns: Mutex<HashMap<String, Instant>>,
    notified: Mutex<HashSet<String>>,
}

impl RelayState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rate-limit gate: returns `false` if the channel was processed within
    /// the cooldown window; otherwise stamps the channel with the current
    /// time and returns `true`.
    ///
    /// The stamp is written as soon as the gate passes, even though the
    /// event may not ultimately produce a notification.
    pub fn try_acquire_channel(&self, channel_id: &str) -> bool {
        self.try_acquire_channel_at(channel_id, Instant::now())
    }

    fn try_acquire_channel_at(&self, channel_id: &str, now: Instant) -> bool {
        let mut cooldowns = self.inner.cooldowns.lock().unwrap();

        if let Some(last) = cooldowns.get(channel_id)
            && now.duration_since(*last) < CHANNEL_COOLDOWN
        {
            return false;
        }

        cooldowns.insert(channel_id.to_string(), now);

        true
    }

    /// Whether the channel's last processed event is within the cooldown window.
    pub fn channel_on_cooldown(&self, channel_id: &str) -> bool {
        let cooldowns = self.inner.cooldowns.lock().unwrap();

        cooldowns.get(channel_id).is_some_and(|last| last.elapsed() < CHANNEL_COOLDOWN)
    }

    /// Whether this message identity has already been notified.
    pub fn is_notified(&self, identity: &str) -> bool {
        self.inner.notified.lock().unwrap().contains(identity)
    }

    /// Record a notified identity.
    ///
    /// When the set grows past [`NOTIFIED_SET_CAP`] it is cleared entirely,
    /// not evicted incrementally. Old identities may notify again after a
    /// clear; that is the documented tradeoff.
    pub fn record_notified(&self, identity: &str) {
        let mut notified = self.inner.notified.lock().unwrap();

        notified.insert(identity.to_string());

        if notified.len() > NOTIFIED_SET_CAP {
            notified.clear();
        }
    }
}

// Tests.
