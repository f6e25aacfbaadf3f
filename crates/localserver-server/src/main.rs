//! localserver
//!
//! Static files, CGI scripts, a cookie session demo, and PUT uploads over
//! plain HTTP/1.1, one request per connection.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio::sync::watch;
use tracing_subscriber::{fmt, EnvFilter};

use localserver_server::{app_state::AppState, config, ops, server::Server};

#[derive(Debug, Parser)]
#[command(name = "localserver", version, about = "Small HTTP/1.1 server with CGI support")]
struct Cli {
    /// Path to the YAML config file.
    #[arg(short, long, default_value = "localserver.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let cfg = match config::load_from_file(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(config = %cli.config.display(), error = %e, "config load failed");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(
        config = %cli.config.display(),
        servers = cfg.servers.len(),
        "configuration loaded"
    );

    let state = AppState::new(cfg);
    let server = match Server::bind(state.clone()).await {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "failed to start server");
            return ExitCode::FAILURE;
        }
    };

    let (stop_tx, stop_rx) = watch::channel(false);

    if let Some(ops_cfg) = state.cfg().ops.clone() {
        let listen = match ops_cfg.addr() {
            Ok(a) => a,
            Err(e) => {
                tracing::error!(error = %e, "invalid ops address");
                return ExitCode::FAILURE;
            }
        };
        let mut rx = stop_rx.clone();
        let ops_state = state.clone();
        tokio::spawn(async move {
            let stopped = async move {
                let _ = rx.wait_for(|stop| *stop).await;
            };
            if let Err(e) = ops::serve(listen, ops_state, stopped).await {
                tracing::error!(error = %e, "ops endpoints failed");
            }
        });
    }

    server
        .run(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
            }
            let _ = stop_tx.send(true);
        })
        .await;

    drop(stop_rx);
    ExitCode::SUCCESS
}
