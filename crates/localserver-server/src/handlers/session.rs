use std::sync::Arc;

use async_trait::async_trait;

use localserver_core::http::{Request, Response, StatusCode};

use super::{Handler, RequestCtx};
use crate::session::SessionStore;

/// `/session`: per-visitor counter backed by a cookie.
pub struct SessionHandler {
    store: Arc<SessionStore>,
    cookie: String,
}

impl SessionHandler {
    pub fn new(store: Arc<SessionStore>, cookie: impl Into<String>) -> Self {
        Self { store, cookie: cookie.into() }
    }
}

#[async_trait]
impl Handler for SessionHandler {
    fn name(&self) -> &'static str {
        "session"
    }

    async fn handle(&self, _ctx: &RequestCtx, req: &Request) -> Response {
        let visit = self.store.visit(req.cookie(&self.cookie));

        let mut resp = Response::with_status(StatusCode::OK);
        resp.set_body(
            format!(
                "<html><h1>Session Demo</h1><p>Session ID: {}</p><p>Visits: {}</p></html>",
                visit.session_id, visit.visits
            ),
            "text/html",
        );
        if visit.created {
            tracing::debug!(session = %visit.session_id, "session created");
            resp.set_cookie(&self.cookie, &visit.session_id);
        }
        resp
    }
}
