#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(dead_code)]

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use bytes::Bytes;
use tempfile::TempDir;

use localserver_core::http::Request;
use localserver_server::app_state::AppState;
use localserver_server::config::{self, Config};
use localserver_server::router::Router;

pub fn peer() -> SocketAddr {
    "127.0.0.1:50000".parse().unwrap()
}

/// Site fixture: index page, a stylesheet, a directory without index.
pub fn site() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("index.html"), "<html>home</html>").unwrap();
    fs::write(dir.path().join("style.css"), "body{}").unwrap();
    fs::create_dir(dir.path().join("empty")).unwrap();
    fs::create_dir(dir.path().join("docs")).unwrap();
    fs::write(dir.path().join("docs/index.html"), "<html>docs</html>").unwrap();
    dir
}

pub fn config_for(root: &Path, extra: &str) -> Config {
    let yaml = format!(
        "version: 1\nservers:\n  - port: 0\n    root: {root:?}\n    upload_dir: {uploads:?}\n    cgi_extensions: [\".py\", \".cgi\"]\n{extra}",
        root = root.display().to_string(),
        uploads = root.join("uploads").display().to_string(),
    );
    config::load_from_str(&yaml).unwrap()
}

pub fn router_for(root: &Path) -> (Router, AppState) {
    let cfg = config_for(root, "");
    let state = AppState::new(cfg);
    let router = Router::new(state.cfg().servers[0].clone(), state.clone());
    (router, state)
}

pub fn request(raw: &str) -> Request {
    Request::parse(Bytes::from(raw.to_string())).unwrap()
}
