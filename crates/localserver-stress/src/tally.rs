use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

/// Counters shared by all workers.
#[derive(Debug, Default)]
pub struct Tally {
    success: AtomicU64,
    fail: AtomicU64,
    first_error: OnceLock<String>,
}

impl Tally {
    pub fn record_success(&self) {
        self.success.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a failure. Only the first error message is kept.
    pub fn record_failure(&self, error: Option<String>) {
        if let Some(msg) = error {
            if self.first_error.set(msg).is_ok() {
                tracing::warn!(error = ?self.first_error(), "first request error");
            }
        }
        self.fail.fetch_add(1, Ordering::Relaxed);
    }

    pub fn success(&self) -> u64 {
        self.success.load(Ordering::Relaxed)
    }

    pub fn fail(&self) -> u64 {
        self.fail.load(Ordering::Relaxed)
    }

    pub fn first_error(&self) -> Option<&str> {
        self.first_error.get().map(String::as_str)
    }
}
