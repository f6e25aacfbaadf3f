//! Shared application state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::Config;
use crate::obs::ServerMetrics;
use crate::session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: Config,
    sessions: Arc<SessionStore>,
    metrics: ServerMetrics,
    draining: AtomicBool,
}

impl AppState {
    pub fn new(cfg: Config) -> Self {
        let sessions = Arc::new(SessionStore::new(cfg.session.ttl()));
        Self {
            inner: Arc::new(AppStateInner {
                cfg,
                sessions,
                metrics: ServerMetrics::default(),
                draining: AtomicBool::new(false),
            }),
        }
    }

    pub fn cfg(&self) -> &Config {
        &self.inner.cfg
    }

    pub fn sessions(&self) -> Arc<SessionStore> {
        Arc::clone(&self.inner.sessions)
    }

    pub fn metrics(&self) -> &ServerMetrics {
        &self.inner.metrics
    }

    /// Gauges computed at render time.
    pub fn metrics_extra(&self) -> Vec<(&'static str, u64)> {
        vec![("localserver_sessions_live", self.inner.sessions.len() as u64)]
    }

    pub fn set_draining(&self) {
        self.inner.draining.store(true, Ordering::Relaxed);
    }

    pub fn is_draining(&self) -> bool {
        self.inner.draining.load(Ordering::Relaxed)
    }
}
