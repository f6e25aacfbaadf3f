//! CGI script execution.
//!
//! Scripts run directly (no shell) with a cleared environment plus `PATH` and
//! the CGI meta-variables. The request body goes to stdin; stdout becomes the
//! response; stderr is logged. A script that outlives the timeout is killed.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use localserver_core::cgi::{parse_cgi_output, request_env, CgiContext};
use localserver_core::error::{LocalServerError, Result};
use localserver_core::http::{Request, Response, StatusCode};

use super::{Handler, RequestCtx};

/// Raw result of one script run.
#[derive(Debug)]
pub struct CgiRun {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub exit_code: Option<i32>,
}

/// Run `script` for `req` and collect its output.
pub async fn run_script(
    script: &Path,
    req: &Request,
    ctx: &CgiContext<'_>,
    timeout: Duration,
) -> Result<CgiRun> {
    // The child chdirs into the script directory before exec, so a relative
    // program path would be resolved against the wrong directory.
    let program = tokio::fs::canonicalize(script)
        .await
        .map_err(|e| LocalServerError::Internal(format!("resolve {}: {e}", script.display())))?;

    let mut cmd = Command::new(&program);
    cmd.env_clear();
    if let Some(path) = std::env::var_os("PATH") {
        cmd.env("PATH", path);
    }
    cmd.envs(request_env(req, ctx))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = program.parent() {
        cmd.current_dir(dir);
    }

    let mut child = cmd
        .spawn()
        .map_err(|e| LocalServerError::Internal(format!("spawn {}: {e}", script.display())))?;

    // Feed stdin concurrently so a script that writes before reading cannot
    // deadlock against us.
    let writer = child.stdin.take().map(|mut stdin| {
        let body = req.body().clone();
        tokio::spawn(async move {
            if !body.is_empty() {
                if let Err(e) = stdin.write_all(&body).await {
                    tracing::debug!(error = %e, "cgi stdin closed early");
                }
            }
        })
    });

    let output = tokio::time::timeout(timeout, child.wait_with_output())
        .await
        .map_err(|_| {
            LocalServerError::Timeout(format!("{} exceeded {:?}", script.display(), timeout))
        })?
        .map_err(|e| LocalServerError::Internal(format!("wait {}: {e}", script.display())))?;

    if let Some(w) = writer {
        w.abort();
    }

    Ok(CgiRun {
        stdout: output.stdout,
        stderr: output.stderr,
        exit_code: output.status.code(),
    })
}

pub struct CgiHandler;

#[async_trait]
impl Handler for CgiHandler {
    fn name(&self) -> &'static str {
        "cgi"
    }

    async fn handle(&self, ctx: &RequestCtx, req: &Request) -> Response {
        match tokio::fs::metadata(&ctx.target).await {
            Ok(m) if m.is_file() => {}
            _ => return Response::error_page(StatusCode::NOT_FOUND, "Not Found"),
        }

        let cgi_ctx = CgiContext {
            remote_addr: ctx.remote_addr,
            script_name: req.path(),
        };

        match run_script(&ctx.target, req, &cgi_ctx, ctx.server.cgi_timeout()).await {
            Ok(run) => {
                if !run.stderr.is_empty() {
                    tracing::warn!(
                        script = %ctx.target.display(),
                        stderr = %String::from_utf8_lossy(&run.stderr).trim_end(),
                        "cgi stderr"
                    );
                }
                if run.exit_code != Some(0) {
                    tracing::warn!(
                        script = %ctx.target.display(),
                        exit_code = ?run.exit_code,
                        "cgi exited non-zero"
                    );
                }
                parse_cgi_output(&run.stdout)
            }
            Err(LocalServerError::Timeout(msg)) => {
                tracing::warn!(%msg, "cgi timed out");
                Response::error_page(StatusCode::GATEWAY_TIMEOUT, "Gateway Timeout")
            }
            Err(e) => {
                tracing::error!(script = %ctx.target.display(), error = %e, "cgi failed");
                let mut resp = Response::text(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("CGI execution failed: {e}"),
                );
                resp.set_status(StatusCode::INTERNAL_SERVER_ERROR, "CGI Error");
                resp
            }
        }
    }
}
