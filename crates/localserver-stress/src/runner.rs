use std::sync::Arc;
use std::time::Instant;

use futures_util::future::join_all;

use crate::config::StressConfig;
use crate::error::StressError;
use crate::probe::{probe, Outcome};
use crate::report::Report;
use crate::tally::Tally;

async fn worker(id: usize, cfg: Arc<StressConfig>, tally: Arc<Tally>, requests: u64) {
    for _ in 0..requests {
        match probe(&cfg).await {
            Outcome::Success => tally.record_success(),
            Outcome::Unexpected => tally.record_failure(None),
            Outcome::Failed(e) => tally.record_failure(Some(e.to_string())),
        }
    }
    tracing::debug!(worker = id, requests, "worker done");
}

/// Run the whole load test and summarize it.
pub async fn run(cfg: &StressConfig) -> Result<Report, StressError> {
    cfg.validate()?;

    let cfg = Arc::new(cfg.clone());
    let tally = Arc::new(Tally::default());

    tracing::info!(
        target_addr = %cfg.addr(),
        requests = cfg.requests,
        concurrency = cfg.concurrency,
        "stress run starting"
    );

    let started = Instant::now();
    let handles = (0..cfg.concurrency).map(|i| {
        tokio::spawn(worker(i, Arc::clone(&cfg), Arc::clone(&tally), cfg.share(i)))
    });
    for joined in join_all(handles).await {
        if let Err(e) = joined {
            tracing::error!(error = %e, "worker task failed");
        }
    }
    let elapsed = started.elapsed();

    let report = Report::from_tally(&tally, elapsed, cfg.threshold);
    tracing::info!(
        success = report.success,
        fail = report.fail,
        availability = report.availability,
        "stress run finished"
    );
    Ok(report)
}
