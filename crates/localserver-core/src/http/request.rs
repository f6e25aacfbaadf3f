//! HTTP/1.1 request parsing (panic-free).
//!
//! Parsing rules:
//! - The head ends at the first `\r\n\r\n`, or `\n\n` for bare-LF clients.
//! - Header lines are split on `\n` and trimmed, so `\r\n` and `\n` both work.
//! - The body is kept as raw bytes; nothing assumes it is text.

use std::collections::HashMap;

use bytes::Bytes;

use crate::error::{LocalServerError, Result};

/// Location of the blank line that terminates a request head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderEnd {
    /// Length of the head, excluding the delimiter.
    pub head_len: usize,
    /// Length of the delimiter (4 for CRLF CRLF, 2 for LF LF).
    pub delim_len: usize,
}

impl HeaderEnd {
    /// Offset of the first body byte.
    pub fn body_start(&self) -> usize {
        self.head_len + self.delim_len
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Find the end of the header block, whichever delimiter comes first.
pub fn header_end(buf: &[u8]) -> Option<HeaderEnd> {
    let crlf = find(buf, b"\r\n\r\n");
    let lf = find(buf, b"\n\n");
    match (crlf, lf) {
        (Some(c), Some(l)) if l < c => Some(HeaderEnd { head_len: l, delim_len: 2 }),
        (Some(c), _) => Some(HeaderEnd { head_len: c, delim_len: 4 }),
        (None, Some(l)) => Some(HeaderEnd { head_len: l, delim_len: 2 }),
        (None, None) => None,
    }
}

/// Parsed request line and headers.
#[derive(Debug, Clone)]
pub struct RequestHead {
    method: String,
    path: String,
    query: Option<String>,
    version: String,
    headers: Vec<(String, String)>,
    query_params: HashMap<String, String>,
    cookies: HashMap<String, String>,
}

impl RequestHead {
    /// Parse a request head (request line + header lines, no delimiter).
    pub fn parse(head: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(head)
            .map_err(|_| LocalServerError::BadRequest("request head is not valid utf-8".into()))?;

        let mut lines = text.split('\n');
        let request_line = lines.next().unwrap_or_default().trim();

        let mut parts = request_line.split_whitespace();
        let (Some(method), Some(target), Some(version)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(LocalServerError::BadRequest(format!(
                "malformed request line: {request_line:?}"
            )));
        };
        if !version.starts_with("HTTP/") {
            return Err(LocalServerError::BadRequest(format!(
                "unsupported protocol: {version}"
            )));
        }

        let (path, query) = match target.split_once('?') {
            Some((p, q)) => (p.to_string(), Some(q.to_string())),
            None => (target.to_string(), None),
        };
        let query_params = query.as_deref().map(parse_query).unwrap_or_default();

        let mut headers = Vec::new();
        let mut cookies = HashMap::new();
        for line in lines {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Some((name, value)) = line.split_once(':') else { continue };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            let value = value.trim();
            if name.eq_ignore_ascii_case("cookie") {
                parse_cookies(value, &mut cookies);
            }
            headers.push((name.to_string(), value.to_string()));
        }

        Ok(Self {
            method: method.to_string(),
            path,
            query,
            version: version.to_string(),
            headers,
            query_params,
            cookies,
        })
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Request path with the query string removed.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Raw query string (text after the first `?`), if any.
    pub fn query_string(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// First header with this name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(String::as_str)
    }

    pub fn query_params(&self) -> &HashMap<String, String> {
        &self.query_params
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Declared `Content-Length`, if present.
    pub fn content_length(&self) -> Result<Option<usize>> {
        match self.header("content-length") {
            None => Ok(None),
            Some(v) => v
                .parse::<usize>()
                .map(Some)
                .map_err(|_| LocalServerError::BadRequest(format!("invalid content-length: {v}"))),
        }
    }
}

fn parse_query(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (k.to_string(), v.to_string()),
            None => (pair.to_string(), String::new()),
        })
        .collect()
}

fn parse_cookies(header: &str, out: &mut HashMap<String, String>) {
    for part in header.split(';') {
        if let Some((k, v)) = part.trim().split_once('=') {
            out.insert(k.trim().to_string(), v.trim().to_string());
        }
    }
}

/// A complete request: parsed head plus raw body.
#[derive(Debug, Clone)]
pub struct Request {
    head: RequestHead,
    body: Bytes,
}

impl Request {
    pub fn new(head: RequestHead, body: Bytes) -> Self {
        Self { head, body }
    }

    /// Parse a whole buffered request. Without a blank line the entire
    /// buffer is treated as the head and the body is empty.
    pub fn parse(raw: Bytes) -> Result<Self> {
        match header_end(&raw) {
            Some(end) => {
                let head = RequestHead::parse(&raw[..end.head_len])?;
                let body = raw.slice(end.body_start()..);
                Ok(Self { head, body })
            }
            None => Ok(Self {
                head: RequestHead::parse(&raw)?,
                body: Bytes::new(),
            }),
        }
    }

    pub fn head(&self) -> &RequestHead {
        &self.head
    }

    pub fn method(&self) -> &str {
        self.head.method()
    }

    pub fn path(&self) -> &str {
        self.head.path()
    }

    pub fn query_string(&self) -> Option<&str> {
        self.head.query_string()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.header(name)
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.head.cookie(name)
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

impl std::fmt::Display for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.head.method, self.head.path, self.head.version)
    }
}
