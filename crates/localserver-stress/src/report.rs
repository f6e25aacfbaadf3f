use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::tally::Tally;

/// Summary of one stress run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub total_requests: u64,
    pub success: u64,
    pub fail: u64,
    /// Percent of requests that succeeded; 0 when nothing ran.
    pub availability: f64,
    pub elapsed_secs: f64,
    /// Requests per second; absent when no time elapsed.
    pub rps: Option<f64>,
    pub threshold: f64,
    pub passed: bool,
    pub first_error: Option<String>,
}

impl Report {
    pub fn from_counts(
        success: u64,
        fail: u64,
        elapsed: Duration,
        threshold: f64,
        first_error: Option<String>,
    ) -> Self {
        let total = success + fail;
        let availability = if total > 0 {
            success as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        let elapsed_secs = elapsed.as_secs_f64();
        let rps = (elapsed_secs > 0.0).then(|| total as f64 / elapsed_secs);

        Self {
            total_requests: total,
            success,
            fail,
            availability,
            elapsed_secs,
            rps,
            threshold,
            passed: availability >= threshold,
            first_error,
        }
    }

    pub fn from_tally(tally: &Tally, elapsed: Duration, threshold: f64) -> Self {
        Self::from_counts(
            tally.success(),
            tally.fail(),
            elapsed,
            threshold,
            tally.first_error().map(str::to_string),
        )
    }

    /// Process exit status: 0 on pass, 1 on fail.
    pub fn exit_code(&self) -> u8 {
        if self.passed {
            0
        } else {
            1
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total Requests: {}", self.total_requests)?;
        writeln!(f, "Success: {}", self.success)?;
        writeln!(f, "Fail: {}", self.fail)?;
        writeln!(f, "Availability: {:.2}%", self.availability)?;
        writeln!(f, "Time: {:.2}s", self.elapsed_secs)?;
        if let Some(rps) = self.rps {
            writeln!(f, "RPS: {:.2}", rps)?;
        }
        writeln!(f, "{}", if self.passed { "PASS" } else { "FAIL" })
    }
}
