#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;

use tokio::sync::oneshot;

use localserver_server::app_state::AppState;
use localserver_server::config;
use localserver_server::server::Server;
use localserver_stress::{run, StressConfig};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn localserver_meets_availability_threshold() {
    let root = tempfile::tempdir().unwrap();
    fs::write(root.path().join("index.html"), "<html>ok</html>").unwrap();

    let yaml = format!(
        "version: 1\nservers:\n  - host: 127.0.0.1\n    port: 0\n    root: {:?}\n",
        root.path().display().to_string()
    );
    let state = AppState::new(config::load_from_str(&yaml).unwrap());
    let server = Server::bind(state.clone()).await.unwrap();
    let addr = server.local_addrs()[0];

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(server.run(async move {
        let _ = stop_rx.await;
    }));

    let cfg = StressConfig {
        host: addr.ip().to_string(),
        port: addr.port(),
        requests: 300,
        concurrency: 10,
        ..Default::default()
    };
    let report = run(&cfg).await.unwrap();
    assert_eq!(report.total_requests, 300);
    assert!(report.passed, "{report}");
    assert_eq!(report.exit_code(), 0);

    stop_tx.send(()).unwrap();
    handle.await.unwrap();
}
