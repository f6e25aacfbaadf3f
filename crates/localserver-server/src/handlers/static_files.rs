use std::path::Path;

use async_trait::async_trait;
use tokio::fs;

use localserver_core::http::{mime, Request, Response, StatusCode};

use super::{Handler, RequestCtx};

/// Serves files from the root; directories serve their index file.
pub struct StaticHandler;

impl StaticHandler {
    async fn serve_file(path: &Path) -> Response {
        match fs::read(path).await {
            Ok(content) => {
                let mut resp = Response::with_status(StatusCode::OK);
                resp.set_body(content, mime::content_type_for(path));
                resp
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "static read failed");
                Response::error_page(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        }
    }
}

#[async_trait]
impl Handler for StaticHandler {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn handle(&self, ctx: &RequestCtx, _req: &Request) -> Response {
        let Ok(meta) = fs::metadata(&ctx.target).await else {
            return Response::error_page(StatusCode::NOT_FOUND, "Not Found");
        };

        if meta.is_dir() {
            let index = ctx.target.join(&ctx.server.index);
            return match fs::metadata(&index).await {
                Ok(m) if m.is_file() => Self::serve_file(&index).await,
                _ => Response::error_page(
                    StatusCode::FORBIDDEN,
                    "Directory listing not implemented",
                ),
            };
        }

        Self::serve_file(&ctx.target).await
    }
}
