//! Listener lifecycle.
//!
//! One TCP listener per configured server section, each routing with its own
//! section. Connections are served on their own task; shutdown stops the
//! accept loops, marks the state as draining, and waits (bounded) for
//! in-flight connections to finish.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::Instrument;

use localserver_core::error::{LocalServerError, Result};

use crate::app_state::AppState;
use crate::router::Router;
use crate::session::spawn_sweeper;
use crate::transport::serve_connection;

/// Pause after a failed `accept` (e.g. EMFILE) before trying again.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// How long shutdown waits for in-flight connections.
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

pub struct Server {
    state: AppState,
    listeners: Vec<(TcpListener, Arc<Router>)>,
}

impl Server {
    /// Bind every configured listener. Fails if any address is unavailable.
    pub async fn bind(state: AppState) -> Result<Self> {
        let mut listeners = Vec::with_capacity(state.cfg().servers.len());
        for section in &state.cfg().servers {
            let addr = section.addr()?;
            let listener = TcpListener::bind(addr)
                .await
                .map_err(|e| LocalServerError::Internal(format!("bind {addr} failed: {e}")))?;
            let router = Arc::new(Router::new(section.clone(), state.clone()));
            tracing::info!(%addr, root = %section.root.display(), "listening");
            listeners.push((listener, router));
        }
        Ok(Self { state, listeners })
    }

    /// Actual bound addresses, in config order.
    pub fn local_addrs(&self) -> Vec<SocketAddr> {
        self.listeners
            .iter()
            .filter_map(|(l, _)| l.local_addr().ok())
            .collect()
    }

    /// Accept until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F)
    where
        F: Future<Output = ()> + Send,
    {
        let (stop_tx, stop_rx) = watch::channel(false);

        let sessions = self.state.sessions();
        let every = (self.state.cfg().session.ttl() / 2).max(std::time::Duration::from_secs(1));
        let sweeper = spawn_sweeper(sessions, every);

        let mut accept_loops = JoinSet::new();
        for (listener, router) in self.listeners {
            accept_loops.spawn(accept_loop(listener, router, self.state.clone(), stop_rx.clone()));
        }

        shutdown.await;
        tracing::info!("shutdown requested; draining");
        self.state.set_draining();
        let _ = stop_tx.send(true);

        while accept_loops.join_next().await.is_some() {}
        sweeper.abort();
        tracing::info!("server stopped");
    }
}

async fn accept_loop(
    listener: TcpListener,
    router: Arc<Router>,
    state: AppState,
    mut stop: watch::Receiver<bool>,
) {
    let mut conns = JoinSet::new();
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(v) => v,
                    Err(e) => {
                        tracing::warn!(error = %e, "accept failed");
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                        continue;
                    }
                };
                let router = Arc::clone(&router);
                let state = state.clone();
                let span = tracing::debug_span!("conn", %peer);
                conns.spawn(
                    async move {
                        state.metrics().active_connections.inc();
                        serve_connection(stream, peer, router).await;
                        state.metrics().active_connections.dec();
                    }
                    .instrument(span),
                );
            }
            Some(_) = conns.join_next(), if !conns.is_empty() => {}
            changed = stop.changed() => {
                if changed.is_err() || *stop.borrow() {
                    break;
                }
            }
        }
    }
    drop(listener);

    let in_flight = conns.len();
    if in_flight == 0 {
        return;
    }
    tracing::info!(in_flight, "waiting for connections to finish");
    let drained = tokio::time::timeout(DRAIN_TIMEOUT, async {
        while conns.join_next().await.is_some() {}
    })
    .await;
    if drained.is_err() {
        tracing::warn!(aborted = conns.len(), "drain timeout; aborting connections");
        conns.shutdown().await;
    }
}
