//! localserver-stress
//!
//! Fires `--requests` one-shot GETs at `--host:--port` over `--concurrency`
//! workers, prints the availability summary, and exits 0 on PASS, 1 on FAIL,
//! 2 on invalid arguments.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use localserver_stress::{run, OutputFormat, StressConfig};

#[tokio::main]
async fn main() -> ExitCode {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cfg = StressConfig::parse();

    let report = match run(&cfg).await {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(error = %e, "stress run aborted");
            return ExitCode::from(2);
        }
    };

    match cfg.format {
        OutputFormat::Text => {
            if let Some(e) = &report.first_error {
                println!("Error: {e}");
            }
            print!("{report}");
        }
        OutputFormat::Json => match serde_json::to_string_pretty(&report) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                tracing::error!(error = %e, "report serialization failed");
                return ExitCode::from(2);
            }
        },
    }

    ExitCode::from(report.exit_code())
}
