//! HTTP/1.1 response builder.
//!
//! Every response closes the connection; the server does not do keep-alive.

use bytes::{BufMut, Bytes, BytesMut};

use super::status::StatusCode;

/// Value of the `Server` header.
pub const SERVER_NAME: &str = concat!("localserver/", env!("CARGO_PKG_VERSION"));

/// Content type used by `Response::text`.
pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    reason: String,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    /// `200 OK` with the default `Server` and `Connection: close` headers.
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            reason: StatusCode::OK.canonical_reason().to_string(),
            headers: vec![
                ("Server".to_string(), SERVER_NAME.to_string()),
                ("Connection".to_string(), "close".to_string()),
            ],
            body: Bytes::new(),
        }
    }

    pub fn with_status(status: StatusCode) -> Self {
        let mut r = Self::new();
        r.set_status(status, status.canonical_reason());
        r
    }

    /// Plain-text response.
    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        let mut r = Self::with_status(status);
        r.set_body(body.into(), TEXT_PLAIN);
        r
    }

    /// HTML error page: `<html><h1>CODE REASON</h1></html>`.
    pub fn error_page(status: StatusCode, reason: &str) -> Self {
        let mut r = Self::new();
        r.set_status(status, reason);
        r.set_body(
            format!("<html><h1>{} {}</h1></html>", status.as_u16(), reason),
            "text/html",
        );
        r
    }

    pub fn set_status(&mut self, status: StatusCode, reason: impl Into<String>) {
        self.status = status;
        self.reason = reason.into();
    }

    /// Set a header, replacing any existing one with the same name.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&name)) {
            Some(slot) => slot.1 = value,
            None => self.headers.push((name, value)),
        }
    }

    /// Set the body along with `Content-Type` and `Content-Length`.
    pub fn set_body(&mut self, body: impl Into<Bytes>, content_type: &str) {
        self.body = body.into();
        self.set_header("Content-Type", content_type);
        self.set_header("Content-Length", self.body.len().to_string());
    }

    pub fn set_cookie(&mut self, name: &str, value: &str) {
        self.set_header("Set-Cookie", format!("{name}={value}; Path=/; HttpOnly"));
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Serialize status line, headers, blank line, and body.
    pub fn to_bytes(&self) -> Bytes {
        let head_len: usize = self.headers.iter().map(|(k, v)| k.len() + v.len() + 4).sum();
        let mut out = BytesMut::with_capacity(32 + self.reason.len() + head_len + self.body.len());

        out.put_slice(b"HTTP/1.1 ");
        out.put_slice(self.status.as_u16().to_string().as_bytes());
        out.put_u8(b' ');
        out.put_slice(self.reason.as_bytes());
        out.put_slice(b"\r\n");
        for (k, v) in &self.headers {
            out.put_slice(k.as_bytes());
            out.put_slice(b": ");
            out.put_slice(v.as_bytes());
            out.put_slice(b"\r\n");
        }
        out.put_slice(b"\r\n");
        out.put_slice(&self.body);
        out.freeze()
    }
}
