use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::Instant;

use localserver_core::error::{LocalServerError, Result};
use localserver_core::http::{header_end, Request, RequestHead, Response};

use crate::router::Router;

const READ_CHUNK: usize = 8192;

#[derive(Debug, Clone, Copy)]
pub struct ReadLimits {
    pub max_request_bytes: usize,
    pub read_timeout: Duration,
}

/// Read one request from `io`.
///
/// Returns `Ok(None)` when the peer goes away (or stalls past the timeout)
/// before a complete request arrived; such connections are closed without a
/// response.
pub async fn read_request<R>(io: &mut R, limits: ReadLimits) -> Result<Option<Request>>
where
    R: AsyncRead + Unpin,
{
    let deadline = Instant::now() + limits.read_timeout;
    let mut buf = BytesMut::with_capacity(READ_CHUNK);

    let (head, body_start, total) = loop {
        if let Some(end) = header_end(&buf) {
            let head = RequestHead::parse(&buf[..end.head_len])?;
            let body_len = head.content_length()?.unwrap_or(0);
            let total = end.body_start().saturating_add(body_len);
            if total > limits.max_request_bytes {
                return Err(LocalServerError::PayloadTooLarge);
            }
            break (head, end.body_start(), total);
        }
        if buf.len() > limits.max_request_bytes {
            return Err(LocalServerError::PayloadTooLarge);
        }
        if !fill(io, &mut buf, deadline).await? {
            return Ok(None);
        }
    };

    while buf.len() < total {
        if !fill(io, &mut buf, deadline).await? {
            return Ok(None);
        }
    }

    buf.truncate(total);
    let body = buf.freeze().slice(body_start..);
    Ok(Some(Request::new(head, body)))
}

/// Read more bytes into `buf`. `false` on EOF or timeout.
async fn fill<R>(io: &mut R, buf: &mut BytesMut, deadline: Instant) -> Result<bool>
where
    R: AsyncRead + Unpin,
{
    buf.reserve(READ_CHUNK);
    match tokio::time::timeout_at(deadline, io.read_buf(buf)).await {
        Err(_) => {
            tracing::debug!(buffered = buf.len(), "read timed out");
            Ok(false)
        }
        Ok(Ok(0)) => Ok(false),
        Ok(Ok(_)) => Ok(true),
        Ok(Err(e)) => Err(LocalServerError::Internal(format!("read failed: {e}"))),
    }
}

/// Serve exactly one request on `stream`, then close it.
pub async fn serve_connection(mut stream: TcpStream, peer: SocketAddr, router: Arc<Router>) {
    let limits = ReadLimits {
        max_request_bytes: router.server().max_request_bytes,
        read_timeout: router.server().read_timeout(),
    };

    let resp = match read_request(&mut stream, limits).await {
        Ok(Some(req)) => router.route(&req, peer).await,
        Ok(None) => return,
        Err(e @ (LocalServerError::BadRequest(_) | LocalServerError::PayloadTooLarge)) => {
            tracing::info!(error = %e, "rejecting request");
            router.reject(&e)
        }
        Err(e) => {
            tracing::debug!(error = %e, "connection dropped");
            return;
        }
    };

    if let Err(e) = stream.write_all(&resp.to_bytes()).await {
        tracing::debug!(error = %e, "write failed");
        return;
    }
    let _ = stream.shutdown().await;
}

/// Error page for a request rejected before routing.
pub fn rejection_page(e: &LocalServerError) -> Response {
    let status = e.status();
    Response::error_page(status, status.canonical_reason())
}
