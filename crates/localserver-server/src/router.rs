//! Request routing.
//!
//! Order of evaluation for a request path:
//! 1. map it under the server root; escaping the root is `403`
//! 2. CGI extension -> CGI handler
//! 3. `/session` -> session handler
//! 4. `PUT /upload...` -> upload handler
//! 5. everything else -> static files (index for directories, else 404)

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use localserver_core::error::LocalServerError;
use localserver_core::http::{Request, Response, StatusCode};

use crate::app_state::AppState;
use crate::config::ServerConfig;
use crate::handlers::{
    CgiHandler, Handler, RequestCtx, SessionHandler, StaticHandler, UploadHandler,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteKind {
    Cgi,
    Session,
    Upload,
    Static,
}

/// Map a URL path under `root` without touching the filesystem.
///
/// `.` segments are dropped and `..` pops a segment; popping past the root,
/// or an absolute segment such as a second leading `/`, yields `None`.
pub fn resolve_under_root(root: &Path, url_path: &str) -> Option<PathBuf> {
    let rel = url_path.strip_prefix('/').unwrap_or(url_path);
    let mut parts: Vec<&std::ffi::OsStr> = Vec::new();
    for comp in Path::new(rel).components() {
        match comp {
            Component::Normal(p) => parts.push(p),
            Component::CurDir => {}
            Component::ParentDir => {
                parts.pop()?;
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    let mut out = root.to_path_buf();
    out.extend(parts);
    Some(out)
}

/// Pick the route for `req`, or the response for a path outside the root.
pub fn select_route(
    server: &ServerConfig,
    req: &Request,
) -> Result<(RouteKind, PathBuf), Response> {
    let path = req.path();
    let target = resolve_under_root(&server.root, path)
        .ok_or_else(|| Response::error_page(StatusCode::FORBIDDEN, "Forbidden"))?;

    let kind = if server.is_cgi(&target) {
        RouteKind::Cgi
    } else if path == "/session" {
        RouteKind::Session
    } else if req.method().eq_ignore_ascii_case("PUT") && path.starts_with("/upload") {
        RouteKind::Upload
    } else {
        RouteKind::Static
    };
    Ok((kind, target))
}

/// Router bound to one server section.
pub struct Router {
    server: Arc<ServerConfig>,
    handlers: HashMap<RouteKind, Arc<dyn Handler>>,
    state: AppState,
}

impl Router {
    pub fn new(server: ServerConfig, state: AppState) -> Self {
        let mut handlers: HashMap<RouteKind, Arc<dyn Handler>> = HashMap::new();
        handlers.insert(RouteKind::Cgi, Arc::new(CgiHandler));
        handlers.insert(
            RouteKind::Session,
            Arc::new(SessionHandler::new(state.sessions(), state.cfg().session.cookie.clone())),
        );
        handlers.insert(RouteKind::Upload, Arc::new(UploadHandler));
        handlers.insert(RouteKind::Static, Arc::new(StaticHandler));

        Self {
            server: Arc::new(server),
            handlers,
            state,
        }
    }

    pub fn server(&self) -> &ServerConfig {
        &self.server
    }

    /// Response for a request that failed before routing.
    pub fn reject(&self, e: &LocalServerError) -> Response {
        let reason = match e {
            LocalServerError::PayloadTooLarge => "too_large",
            _ => "bad_request",
        };
        self.state.metrics().rejected.inc(&[("reason", reason)]);
        crate::transport::conn::rejection_page(e)
    }

    pub async fn route(&self, req: &Request, remote_addr: SocketAddr) -> Response {
        let started = Instant::now();

        let (label, resp) = match select_route(&self.server, req) {
            Err(resp) => ("forbidden", resp),
            Ok((kind, target)) => match self.handlers.get(&kind) {
                Some(handler) => {
                    let ctx = RequestCtx {
                        server: Arc::clone(&self.server),
                        remote_addr,
                        target,
                    };
                    (handler.name(), handler.handle(&ctx, req).await)
                }
                None => (
                    "unrouted",
                    Response::error_page(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal Server Error",
                    ),
                ),
            },
        };

        let status = resp.status();
        let metrics = self.state.metrics();
        metrics
            .requests
            .inc(&[("route", label), ("status", &status.to_string())]);
        metrics
            .request_duration
            .observe(&[("route", label)], started.elapsed());
        if label == "cgi" {
            let outcome = match status {
                StatusCode::GATEWAY_TIMEOUT => "timeout",
                StatusCode::INTERNAL_SERVER_ERROR if resp.reason() == "CGI Error" => "error",
                StatusCode::NOT_FOUND => "missing",
                _ => "ok",
            };
            metrics.cgi_runs.inc(&[("outcome", outcome)]);
        }

        tracing::info!(
            method = %req.method(),
            path = %req.path(),
            route = label,
            status = status.as_u16(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "request"
        );
        resp
    }
}
