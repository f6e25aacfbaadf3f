//! localserver stress tool.
//!
//! Opens `concurrency` workers against one HTTP endpoint, each performing its
//! share of sequential one-shot requests (`Connection: close`, read to EOF),
//! and reports availability and throughput. A run passes when availability
//! meets the threshold (99.5% by default).

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod config;
pub mod error;
pub mod probe;
pub mod report;
pub mod runner;
pub mod tally;

pub use config::{OutputFormat, StressConfig};
pub use error::StressError;
pub use report::Report;
pub use runner::run;
