#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use localserver_stress::{run, StressConfig};

/// Answers every connection with `response` after reading the request head.
async fn canned_server(response: &'static [u8]) -> (SocketAddr, Arc<AtomicU64>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&seen);
    tokio::spawn(async move {
        loop {
            let Ok((mut s, _)) = listener.accept().await else { break };
            let counter = Arc::clone(&counter);
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match s.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }
                assert!(buf.starts_with(b"GET / HTTP/1.1\r\n"));
                counter.fetch_add(1, Ordering::Relaxed);
                let _ = s.write_all(response).await;
                let _ = s.shutdown().await;
            });
        }
    });
    (addr, seen)
}

fn config_for(addr: SocketAddr, requests: u64, concurrency: usize) -> StressConfig {
    StressConfig {
        host: addr.ip().to_string(),
        port: addr.port(),
        requests,
        concurrency,
        timeout_ms: 1000,
        ..Default::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn healthy_server_is_fully_available() {
    let (addr, seen) =
        canned_server(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok").await;

    let report = run(&config_for(addr, 200, 10)).await.unwrap();
    assert_eq!(report.total_requests, 200);
    assert_eq!(report.success, 200);
    assert_eq!(format!("{:.2}", report.availability), "100.00");
    assert!(report.passed);
    assert_eq!(report.exit_code(), 0);
    assert!(report.first_error.is_none());
    assert_eq!(seen.load(Ordering::Relaxed), 200);
}

#[tokio::test]
async fn unreachable_server_fails_everything() {
    let addr = {
        let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        l.local_addr().unwrap()
    };

    let report = run(&config_for(addr, 20, 4)).await.unwrap();
    assert_eq!(report.total_requests, 20);
    assert_eq!(report.fail, 20);
    assert_eq!(format!("{:.2}", report.availability), "0.00");
    assert!(!report.passed);
    assert_eq!(report.exit_code(), 1);
    assert!(report.first_error.is_some());
}

#[tokio::test]
async fn wrong_status_counts_as_failure_without_error() {
    let (addr, _) = canned_server(b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\n\r\n").await;

    let report = run(&config_for(addr, 7, 3)).await.unwrap();
    assert_eq!(report.total_requests, 7);
    assert_eq!(report.fail, 7);
    assert!(report.first_error.is_none());
    assert!(!report.passed);
}

#[tokio::test]
async fn invalid_config_is_rejected() {
    let cfg = StressConfig { concurrency: 0, ..Default::default() };
    assert!(run(&cfg).await.is_err());
}
