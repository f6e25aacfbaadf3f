use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use localserver_core::error::{LocalServerError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub version: u32,

    #[serde(default)]
    pub servers: Vec<ServerConfig>,

    #[serde(default)]
    pub session: SessionSection,

    #[serde(default)]
    pub ops: Option<OpsSection>,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(LocalServerError::UnsupportedVersion);
        }
        if self.servers.is_empty() {
            return Err(LocalServerError::BadRequest("servers must not be empty".into()));
        }

        let mut seen = HashSet::new();
        for (i, s) in self.servers.iter().enumerate() {
            s.validate(i)?;
            let addr = s.addr()?;
            // port 0 asks the OS for a fresh port, so it never collides
            if addr.port() != 0 && !seen.insert(addr) {
                return Err(LocalServerError::BadRequest(format!(
                    "servers[{i}]: duplicate listen address {addr}"
                )));
            }
        }

        self.session.validate()?;
        if let Some(ops) = &self.ops {
            ops.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_root")]
    pub root: PathBuf,

    #[serde(default = "default_index")]
    pub index: String,

    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    #[serde(default = "default_cgi_extensions")]
    pub cgi_extensions: Vec<String>,

    #[serde(default = "default_cgi_timeout_ms")]
    pub cgi_timeout_ms: u64,

    #[serde(default = "default_max_request_bytes")]
    pub max_request_bytes: usize,

    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            root: default_root(),
            index: default_index(),
            upload_dir: default_upload_dir(),
            cgi_extensions: default_cgi_extensions(),
            cgi_timeout_ms: default_cgi_timeout_ms(),
            max_request_bytes: default_max_request_bytes(),
            read_timeout_ms: default_read_timeout_ms(),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self, i: usize) -> Result<()> {
        let bad = |msg: String| Err(LocalServerError::BadRequest(format!("servers[{i}].{msg}")));

        if self.index.is_empty() || self.index.contains('/') {
            return bad("index must be a plain file name".into());
        }
        if let Some(ext) = self.cgi_extensions.iter().find(|e| !e.starts_with('.') || e.len() < 2) {
            return bad(format!("cgi_extensions entry {ext:?} must look like \".py\""));
        }
        if !(100..=60_000).contains(&self.cgi_timeout_ms) {
            return bad("cgi_timeout_ms must be between 100 and 60000".into());
        }
        if !(1024..=64 * 1024 * 1024).contains(&self.max_request_bytes) {
            return bad("max_request_bytes must be between 1024 and 67108864".into());
        }
        if !(100..=120_000).contains(&self.read_timeout_ms) {
            return bad("read_timeout_ms must be between 100 and 120000".into());
        }
        Ok(())
    }

    /// Listen address. `localhost` maps to the IPv4 loopback.
    pub fn addr(&self) -> Result<SocketAddr> {
        let ip = if self.host.eq_ignore_ascii_case("localhost") {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        } else {
            self.host.parse::<IpAddr>().map_err(|_| {
                LocalServerError::BadRequest(format!("invalid host: {}", self.host))
            })?
        };
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Whether `path` names a CGI script by extension.
    pub fn is_cgi(&self, path: &Path) -> bool {
        let name = path.to_string_lossy();
        self.cgi_extensions.iter().any(|ext| name.ends_with(ext.as_str()))
    }

    pub fn cgi_timeout(&self) -> Duration {
        Duration::from_millis(self.cgi_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    8080
}
fn default_root() -> PathBuf {
    PathBuf::from("./www")
}
fn default_index() -> String {
    "index.html".into()
}
fn default_upload_dir() -> PathBuf {
    PathBuf::from("./www/uploads")
}
fn default_cgi_extensions() -> Vec<String> {
    vec![".py".into()]
}
fn default_cgi_timeout_ms() -> u64 {
    5000
}
fn default_max_request_bytes() -> usize {
    1024 * 1024
}
fn default_read_timeout_ms() -> u64 {
    5000
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionSection {
    #[serde(default = "default_cookie")]
    pub cookie: String,

    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            cookie: default_cookie(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

impl SessionSection {
    pub fn validate(&self) -> Result<()> {
        let valid_cookie = !self.cookie.is_empty()
            && self.cookie.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
        if !valid_cookie {
            return Err(LocalServerError::BadRequest(
                "session.cookie must be a non-empty token of [A-Za-z0-9_-]".into(),
            ));
        }
        if !(60..=86_400).contains(&self.ttl_secs) {
            return Err(LocalServerError::BadRequest(
                "session.ttl_secs must be between 60 and 86400".into(),
            ));
        }
        Ok(())
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

fn default_cookie() -> String {
    "SESSIONID".into()
}
fn default_ttl_secs() -> u64 {
    1800
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpsSection {
    pub listen: String,
}

impl OpsSection {
    pub fn validate(&self) -> Result<()> {
        self.addr().map(|_| ())
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        self.listen
            .parse()
            .map_err(|_| {
                LocalServerError::BadRequest(format!(
                    "ops.listen is not a socket address: {}",
                    self.listen
                ))
            })
    }
}
