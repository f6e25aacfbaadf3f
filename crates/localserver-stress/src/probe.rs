//! One request/response round-trip.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::config::StressConfig;
use crate::error::StressError;

const READ_CHUNK: usize = 4096;

#[derive(Debug)]
pub enum Outcome {
    /// Response contained the expected marker.
    Success,
    /// Connected and read a response, but without the marker.
    Unexpected,
    /// Socket-level failure (refused, timeout, reset).
    Failed(StressError),
}

/// Whether `response` contains `marker` anywhere.
pub fn contains_marker(response: &[u8], marker: &[u8]) -> bool {
    !marker.is_empty() && response.windows(marker.len()).any(|w| w == marker)
}

/// Connect, send the request, read to EOF, classify.
pub async fn probe(cfg: &StressConfig) -> Outcome {
    match exchange(cfg).await {
        Ok(response) if contains_marker(&response, cfg.expect.as_bytes()) => Outcome::Success,
        Ok(_) => Outcome::Unexpected,
        Err(e) => Outcome::Failed(e),
    }
}

async fn exchange(cfg: &StressConfig) -> Result<Vec<u8>, StressError> {
    let limit = cfg.timeout();
    let addr = cfg.addr();

    let mut stream = timeout(limit, TcpStream::connect(&addr))
        .await
        .map_err(|_| StressError::Timeout { phase: "connect", after: limit })?
        .map_err(|source| StressError::Connect { addr: addr.clone(), source })?;

    timeout(limit, stream.write_all(&cfg.request_bytes()))
        .await
        .map_err(|_| StressError::Timeout { phase: "send", after: limit })?
        .map_err(|source| StressError::Io { phase: "send", source })?;

    let mut response = Vec::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        let n = timeout(limit, stream.read(&mut chunk))
            .await
            .map_err(|_| StressError::Timeout { phase: "recv", after: limit })?
            .map_err(|source| StressError::Io { phase: "recv", source })?;
        if n == 0 {
            break;
        }
        response.extend_from_slice(&chunk[..n]);
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::contains_marker;

    #[test]
    fn marker_search() {
        assert!(contains_marker(b"HTTP/1.1 200 OK\r\n\r\n", b"HTTP/1.1 200 OK"));
        assert!(!contains_marker(b"HTTP/1.1 404 Not Found\r\n", b"HTTP/1.1 200 OK"));
        assert!(!contains_marker(b"HTTP/1.1", b"HTTP/1.1 200 OK"));
        assert!(!contains_marker(b"anything", b""));
    }
}
