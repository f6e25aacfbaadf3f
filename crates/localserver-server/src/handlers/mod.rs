//! Request handlers.
//!
//! Each handler owns one kind of route. The router resolves the request path
//! first, so handlers receive a filesystem target already known to be inside
//! the server root.

pub mod cgi;
pub mod session;
pub mod static_files;
pub mod upload;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use localserver_core::http::{Request, Response};

use crate::config::ServerConfig;

pub use cgi::CgiHandler;
pub use session::SessionHandler;
pub use static_files::StaticHandler;
pub use upload::UploadHandler;

/// Per-request facts resolved before a handler runs.
#[derive(Debug, Clone)]
pub struct RequestCtx {
    pub server: Arc<ServerConfig>,
    pub remote_addr: SocketAddr,
    /// Request path mapped under the server root.
    pub target: PathBuf,
}

#[async_trait]
pub trait Handler: Send + Sync {
    /// Route label used in logs and metrics.
    fn name(&self) -> &'static str;
    async fn handle(&self, ctx: &RequestCtx, req: &Request) -> Response;
}
