use std::time::Duration;

use clap::{Parser, ValueEnum};
use serde::Serialize;

use crate::error::StressError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

/// Load test parameters.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "localserver-stress",
    version,
    about = "Availability check for an HTTP/1.1 server"
)]
pub struct StressConfig {
    /// Target host (IP or name).
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    /// Value of the `Host` header.
    #[arg(long, default_value = "localhost")]
    pub host_header: String,

    /// Request path.
    #[arg(long, default_value = "/")]
    pub path: String,

    /// Total number of requests.
    #[arg(short = 'n', long, default_value_t = 1000)]
    pub requests: u64,

    /// Number of concurrent workers.
    #[arg(short, long, default_value_t = 10)]
    pub concurrency: usize,

    /// Per-operation socket timeout in milliseconds.
    #[arg(long, default_value_t = 2000)]
    pub timeout_ms: u64,

    /// A response counts as a success when it contains this marker.
    #[arg(long, default_value = "HTTP/1.1 200 OK")]
    pub expect: String,

    /// Minimum availability (percent) for a passing run.
    #[arg(long, default_value_t = 99.5)]
    pub threshold: f64,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            host_header: "localhost".into(),
            path: "/".into(),
            requests: 1000,
            concurrency: 10,
            timeout_ms: 2000,
            expect: "HTTP/1.1 200 OK".into(),
            threshold: 99.5,
            format: OutputFormat::Text,
        }
    }
}

impl StressConfig {
    pub fn validate(&self) -> Result<(), StressError> {
        if self.concurrency == 0 {
            return Err(StressError::Config("concurrency must be at least 1".into()));
        }
        if self.timeout_ms == 0 {
            return Err(StressError::Config("timeout_ms must be at least 1".into()));
        }
        if !(0.0..=100.0).contains(&self.threshold) {
            return Err(StressError::Config("threshold must be between 0 and 100".into()));
        }
        if self.expect.is_empty() {
            return Err(StressError::Config("expect marker must not be empty".into()));
        }
        if !self.path.starts_with('/') || self.path.contains(char::is_whitespace) {
            return Err(StressError::Config(format!("invalid request path: {:?}", self.path)));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The exact bytes sent for every request.
    pub fn request_bytes(&self) -> Vec<u8> {
        format!(
            "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
            self.path, self.host_header
        )
        .into_bytes()
    }

    /// Requests assigned to worker `i`; the remainder goes to the first workers.
    pub fn share(&self, i: usize) -> u64 {
        let workers = self.concurrency.max(1) as u64;
        let base = self.requests / workers;
        let extra = u64::from((i as u64) < self.requests % workers);
        base + extra
    }
}
