#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use localserver_core::http::{Response, StatusCode};

fn wire(resp: &Response) -> String {
    String::from_utf8(resp.to_bytes().to_vec()).unwrap()
}

#[test]
fn default_response_closes_connection() {
    let resp = Response::text(StatusCode::OK, "hi");
    let s = wire(&resp);
    assert!(s.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(s.contains("Connection: close\r\n"));
    assert!(s.contains("Content-Length: 2\r\n"));
    assert!(s.contains("Content-Type: text/plain; charset=utf-8\r\n"));
    assert!(s.ends_with("\r\n\r\nhi"));
}

#[test]
fn set_header_replaces_case_insensitively() {
    let mut resp = Response::new();
    resp.set_header("X-Thing", "a");
    resp.set_header("x-thing", "b");
    assert_eq!(resp.header("X-THING"), Some("b"));
    assert_eq!(wire(&resp).matches("X-Thing").count(), 1);
}

#[test]
fn error_page_shape() {
    let resp = Response::error_page(StatusCode::NOT_FOUND, "Not Found");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(resp.header("content-type"), Some("text/html"));
    assert_eq!(resp.body().as_ref(), b"<html><h1>404 Not Found</h1></html>");
    assert!(wire(&resp).starts_with("HTTP/1.1 404 Not Found\r\n"));
}

#[test]
fn session_cookie_attributes() {
    let mut resp = Response::new();
    resp.set_cookie("SESSIONID", "abc");
    assert_eq!(resp.header("set-cookie"), Some("SESSIONID=abc; Path=/; HttpOnly"));
}

#[test]
fn status_code_bounds() {
    assert!(StatusCode::from_u16(99).is_none());
    assert!(StatusCode::from_u16(1000).is_none());
    assert_eq!(StatusCode::from_u16(201), Some(StatusCode::CREATED));
    assert_eq!(StatusCode::GATEWAY_TIMEOUT.canonical_reason(), "Gateway Timeout");
}
