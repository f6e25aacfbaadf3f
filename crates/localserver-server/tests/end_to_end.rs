#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;

use localserver_server::app_state::AppState;
use localserver_server::server::Server;

mod common;
use common::{config_for, site};

async fn exchange(addr: SocketAddr, raw: &[u8]) -> String {
    let mut s = TcpStream::connect(addr).await.unwrap();
    s.write_all(raw).await.unwrap();
    let mut out = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), s.read_to_end(&mut out))
        .await
        .expect("server closed the connection")
        .unwrap();
    String::from_utf8_lossy(&out).to_string()
}

#[tokio::test]
async fn serves_over_tcp_and_shuts_down() {
    let dir = site();
    let cfg = config_for(dir.path(), "");
    let state = AppState::new(cfg);
    let server = Server::bind(state.clone()).await.unwrap();
    let addr = server.local_addrs()[0];

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(server.run(async move {
        let _ = stop_rx.await;
    }));

    let resp = exchange(addr, b"GET / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n").await;
    assert!(resp.starts_with("HTTP/1.1 200 OK\r\n"), "{resp}");
    assert!(resp.contains("Connection: close\r\n"));
    assert!(resp.ends_with("<html>home</html>"));

    let resp = exchange(addr, b"NONSENSE\r\n\r\n").await;
    assert!(resp.starts_with("HTTP/1.1 400 Bad Request\r\n"), "{resp}");

    let huge = format!("PUT /upload/x HTTP/1.1\r\nContent-Length: {}\r\n\r\n", 10 * 1024 * 1024);
    let resp = exchange(addr, huge.as_bytes()).await;
    assert!(resp.starts_with("HTTP/1.1 413 Payload Too Large\r\n"), "{resp}");

    // body split across writes is reassembled
    let mut s = TcpStream::connect(addr).await.unwrap();
    s.write_all(b"PUT /upload/split.txt HTTP/1.1\r\nContent-Length: 6\r\n\r\nabc").await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    s.write_all(b"def").await.unwrap();
    let mut out = Vec::new();
    s.read_to_end(&mut out).await.unwrap();
    assert!(String::from_utf8_lossy(&out).starts_with("HTTP/1.1 201 Created\r\n"));
    assert_eq!(std::fs::read(dir.path().join("uploads/split.txt")).unwrap(), b"abcdef");

    assert_eq!(state.metrics().rejected.get(&[("reason", "too_large")]), 1);
    assert_eq!(state.metrics().rejected.get(&[("reason", "bad_request")]), 1);

    stop_tx.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
    assert!(state.is_draining());
}

#[tokio::test]
async fn ops_endpoints_report_state() {
    let dir = site();
    let state = AppState::new(config_for(dir.path(), ""));
    state.metrics().requests.inc(&[("route", "static"), ("status", "200")]);

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let ops_state = state.clone();
    let handle = tokio::spawn(localserver_server::ops::serve(addr, ops_state, async move {
        let _ = stop_rx.await;
    }));

    let mut body = String::new();
    for _ in 0..50 {
        if let Ok(mut s) = TcpStream::connect(addr).await {
            s.write_all(b"GET /metrics HTTP/1.1\r\nHost: x\r\nConnection: close\r\n\r\n").await.unwrap();
            let mut out = Vec::new();
            s.read_to_end(&mut out).await.unwrap();
            body = String::from_utf8_lossy(&out).to_string();
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(body.starts_with("HTTP/1.1 200 OK"), "{body}");
    assert!(body.contains("localserver_requests_total{route=\"static\",status=\"200\"} 1"));
    assert!(body.contains("localserver_sessions_live 0"));

    state.set_draining();
    let resp = exchange(addr, b"GET /readyz HTTP/1.1\r\nHost: x\r\nConnection: close\r\n\r\n").await;
    assert!(resp.starts_with("HTTP/1.1 503"), "{resp}");

    stop_tx.send(()).unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn stalled_or_truncated_requests_close_silently() {
    let dir = site();
    let mut cfg = config_for(dir.path(), "");
    cfg.servers[0].read_timeout_ms = 200;
    let state = AppState::new(cfg);
    let server = Server::bind(state.clone()).await.unwrap();
    let addr = server.local_addrs()[0];
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(server.run(async move {
        let _ = stop_rx.await;
    }));

    // half a head, then EOF
    let mut s = TcpStream::connect(addr).await.unwrap();
    s.write_all(b"GET / HTTP/1.1\r\nHost: loc").await.unwrap();
    s.shutdown().await.unwrap();
    let mut out = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), s.read_to_end(&mut out))
        .await
        .unwrap()
        .unwrap();
    assert!(out.is_empty(), "{}", String::from_utf8_lossy(&out));

    // declared body never arrives; closed after the read timeout
    let mut s = TcpStream::connect(addr).await.unwrap();
    s.write_all(b"PUT /upload/never.txt HTTP/1.1\r\nContent-Length: 10\r\n\r\nab")
        .await
        .unwrap();
    let mut out = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), s.read_to_end(&mut out))
        .await
        .unwrap()
        .unwrap();
    assert!(out.is_empty(), "{}", String::from_utf8_lossy(&out));
    assert!(!dir.path().join("uploads/never.txt").exists());

    stop_tx.send(()).unwrap();
    handle.await.unwrap();
}

#[tokio::test]
async fn unterminated_head_over_limit_is_413() {
    let dir = site();
    let mut cfg = config_for(dir.path(), "");
    cfg.servers[0].max_request_bytes = 2048;
    let state = AppState::new(cfg);
    let server = Server::bind(state.clone()).await.unwrap();
    let addr = server.local_addrs()[0];
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(server.run(async move {
        let _ = stop_rx.await;
    }));

    let mut raw = b"GET / HTTP/1.1\r\n".to_vec();
    while raw.len() <= 2100 {
        raw.extend_from_slice(b"X-Filler: aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa\r\n");
    }
    let resp = exchange(addr, &raw).await;
    assert!(resp.starts_with("HTTP/1.1 413 Payload Too Large\r\n"), "{resp}");
    assert_eq!(state.metrics().rejected.get(&[("reason", "too_large")]), 1);

    stop_tx.send(()).unwrap();
    handle.await.unwrap();
}

#[tokio::test]
async fn shutdown_waits_for_in_flight_upload() {
    let dir = site();
    let state = AppState::new(config_for(dir.path(), ""));
    let server = Server::bind(state.clone()).await.unwrap();
    let addr = server.local_addrs()[0];
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(server.run(async move {
        let _ = stop_rx.await;
    }));

    let mut s = TcpStream::connect(addr).await.unwrap();
    s.write_all(b"PUT /upload/late.bin HTTP/1.1\r\nContent-Length: 8\r\n\r\n1234")
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    stop_tx.send(()).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(state.is_draining());
    assert!(!handle.is_finished(), "run returned with a connection in flight");

    s.write_all(b"5678").await.unwrap();
    let mut out = Vec::new();
    s.read_to_end(&mut out).await.unwrap();
    assert!(String::from_utf8_lossy(&out).starts_with("HTTP/1.1 201 Created\r\n"));

    tokio::time::timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
    assert_eq!(std::fs::read(dir.path().join("uploads/late.bin")).unwrap(), b"12345678");
}
