use std::net::SocketAddr;

use crate::http::response::SERVER_NAME;
use crate::http::Request;

/// Connection-level facts a CGI script needs besides the request itself.
#[derive(Debug, Clone)]
pub struct CgiContext<'a> {
    pub remote_addr: SocketAddr,
    /// URL path of the script, e.g. `/cgi-bin/hello.py`.
    pub script_name: &'a str,
}

/// Build the meta-variables for running a script on `req`.
///
/// Every request header becomes `HTTP_<NAME>` with `-` mapped to `_`.
/// `Content-Length`/`Content-Type` are exposed without the prefix, and only
/// when the request carries a body.
pub fn request_env(req: &Request, ctx: &CgiContext<'_>) -> Vec<(String, String)> {
    let mut env = vec![
        ("GATEWAY_INTERFACE".to_string(), "CGI/1.1".to_string()),
        ("REQUEST_METHOD".to_string(), req.method().to_string()),
        ("QUERY_STRING".to_string(), req.query_string().unwrap_or_default().to_string()),
        ("PATH_INFO".to_string(), req.path().to_string()),
        ("SCRIPT_NAME".to_string(), ctx.script_name.to_string()),
        ("SERVER_PROTOCOL".to_string(), "HTTP/1.1".to_string()),
        ("SERVER_SOFTWARE".to_string(), SERVER_NAME.to_string()),
        ("REMOTE_ADDR".to_string(), ctx.remote_addr.ip().to_string()),
        ("REMOTE_PORT".to_string(), ctx.remote_addr.port().to_string()),
    ];

    if !req.body().is_empty() {
        env.push(("CONTENT_LENGTH".to_string(), req.body().len().to_string()));
        if let Some(ct) = req.header("content-type") {
            env.push(("CONTENT_TYPE".to_string(), ct.to_string()));
        }
    }

    for (name, value) in req.head().headers() {
        if name.eq_ignore_ascii_case("content-length")
            || name.eq_ignore_ascii_case("content-type")
        {
            continue;
        }
        let key = format!("HTTP_{}", name.to_ascii_uppercase().replace('-', "_"));
        if env.iter().any(|(k, _)| *k == key) {
            continue;
        }
        env.push((key, value.to_string()));
    }

    env
}
