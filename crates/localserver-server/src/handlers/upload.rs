use std::path::Path;

use async_trait::async_trait;
use tokio::fs;

use localserver_core::http::{Request, Response, StatusCode};

use super::{Handler, RequestCtx};

/// `PUT /upload/<name>`: stores the raw body under the upload directory.
pub struct UploadHandler;

/// Last path segment, if it is a usable file name.
fn upload_name(url_path: &str) -> Option<&str> {
    let name = Path::new(url_path).file_name()?.to_str()?;
    (!name.is_empty() && name != "." && name != "..").then_some(name)
}

#[async_trait]
impl Handler for UploadHandler {
    fn name(&self) -> &'static str {
        "upload"
    }

    async fn handle(&self, ctx: &RequestCtx, req: &Request) -> Response {
        let Some(name) = upload_name(req.path()) else {
            return Response::error_page(StatusCode::BAD_REQUEST, "Bad Request");
        };

        let dir = &ctx.server.upload_dir;
        if let Err(e) = fs::create_dir_all(dir).await {
            tracing::warn!(dir = %dir.display(), error = %e, "upload dir create failed");
            return Response::error_page(StatusCode::INTERNAL_SERVER_ERROR, "Upload failed");
        }

        let dest = dir.join(name);
        if let Err(e) = fs::write(&dest, req.body()).await {
            tracing::warn!(dest = %dest.display(), error = %e, "upload write failed");
            return Response::error_page(StatusCode::INTERNAL_SERVER_ERROR, "Upload failed");
        }

        tracing::info!(dest = %dest.display(), bytes = req.body().len(), "file uploaded");
        let mut resp = Response::with_status(StatusCode::CREATED);
        resp.set_body(format!("File uploaded: {name}"), "text/plain");
        resp
    }
}
