use std::io;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StressError {
    #[error("invalid config: {0}")]
    Config(String),
    #[error("connect {addr}: {source}")]
    Connect { addr: String, source: io::Error },
    #[error("{phase} timed out after {after:?}")]
    Timeout { phase: &'static str, after: Duration },
    #[error("{phase}: {source}")]
    Io { phase: &'static str, source: io::Error },
}
