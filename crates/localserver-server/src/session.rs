//! In-memory session store.
//!
//! Sessions are keyed by random UUIDs and carry a visit counter. Entries idle
//! longer than the configured TTL are treated as absent and removed by the
//! sweeper task.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::task::JoinHandle;
use uuid::Uuid;

#[derive(Debug)]
struct SessionEntry {
    visits: u64,
    last_seen: Instant,
}

/// Result of recording one visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit {
    pub session_id: String,
    pub visits: u64,
    /// True when the session was created by this visit.
    pub created: bool,
}

#[derive(Debug)]
pub struct SessionStore {
    sessions: DashMap<String, SessionEntry>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    /// Create an empty session and return its id.
    pub fn create(&self) -> String {
        self.insert_new(0)
    }

    fn insert_new(&self, visits: u64) -> String {
        let id = Uuid::new_v4().to_string();
        self.sessions.insert(
            id.clone(),
            SessionEntry { visits, last_seen: Instant::now() },
        );
        id
    }

    /// Count a visit for `id`, starting a new session when `id` is absent,
    /// unknown, or expired.
    pub fn visit(&self, id: Option<&str>) -> Visit {
        let now = Instant::now();

        if let Some(id) = id {
            if let Some(mut entry) = self.sessions.get_mut(id) {
                if now.duration_since(entry.last_seen) <= self.ttl {
                    entry.visits += 1;
                    entry.last_seen = now;
                    return Visit {
                        session_id: id.to_string(),
                        visits: entry.visits,
                        created: false,
                    };
                }
            }
            self.sessions.remove_if(id, |_, e| now.duration_since(e.last_seen) > self.ttl);
        }

        let session_id = self.insert_new(1);
        Visit { session_id, visits: 1, created: true }
    }

    pub fn visits(&self, id: &str) -> Option<u64> {
        self.sessions.get(id).map(|e| e.visits)
    }

    /// Remove a session. Returns whether it existed.
    pub fn invalidate(&self, id: &str) -> bool {
        self.sessions.remove(id).is_some()
    }

    /// Drop sessions idle for longer than the TTL as of `now`.
    pub fn sweep(&self, now: Instant) -> usize {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, e| now.saturating_duration_since(e.last_seen) <= self.ttl);
        before.saturating_sub(self.sessions.len())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Periodically evict expired sessions.
pub fn spawn_sweeper(store: Arc<SessionStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(every);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tick.tick().await;
            let evicted = store.sweep(Instant::now());
            if evicted > 0 {
                tracing::debug!(evicted, live = store.len(), "expired sessions swept");
            }
        }
    })
}
