//! Server config loader (strict parsing).

pub mod schema;

use std::fs;
use std::path::Path;

use localserver_core::error::{LocalServerError, Result};

pub use schema::{Config, OpsSection, ServerConfig, SessionSection};

pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let s = fs::read_to_string(path).map_err(|e| {
        LocalServerError::Internal(format!("read config {} failed: {e}", path.display()))
    })?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<Config> {
    let cfg: Config = serde_yaml::from_str(s)
        .map_err(|e| LocalServerError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
