use crate::http::{Response, StatusCode};

/// Content type assumed when a script does not declare one.
pub const DEFAULT_CGI_CONTENT_TYPE: &str = "text/html";

fn split_document(out: &[u8]) -> Option<(&[u8], &[u8])> {
    let find = |needle: &[u8]| out.windows(needle.len()).position(|w| w == needle);
    if let Some(i) = find(b"\r\n\r\n") {
        return Some((&out[..i], &out[i + 4..]));
    }
    find(b"\n\n").map(|i| (&out[..i], &out[i + 2..]))
}

/// Turn raw script output into a response.
///
/// A `Status: CODE REASON` header sets the status line; a malformed one is
/// ignored. Other headers are copied as-is. Output with no blank line is
/// returned verbatim as a plain-text body.
pub fn parse_cgi_output(out: &[u8]) -> Response {
    let mut resp = Response::new();

    let Some((head, body)) = split_document(out) else {
        resp.set_body(out.to_vec(), crate::http::response::TEXT_PLAIN);
        return resp;
    };

    let head = String::from_utf8_lossy(head);
    let mut content_type = DEFAULT_CGI_CONTENT_TYPE.to_string();

    for line in head.split('\n') {
        let line = line.trim();
        let Some((key, value)) = line.split_once(':') else { continue };
        let key = key.trim();
        let value = value.trim();

        if key.eq_ignore_ascii_case("status") {
            let (code, reason) = value.split_once(' ').unwrap_or((value, ""));
            match code.parse::<u16>().ok().and_then(StatusCode::from_u16) {
                Some(status) => {
                    let reason = if reason.trim().is_empty() {
                        status.canonical_reason()
                    } else {
                        reason.trim()
                    };
                    resp.set_status(status, reason);
                }
                None => tracing::debug!(status = %value, "ignoring malformed cgi status"),
            }
        } else if key.eq_ignore_ascii_case("content-type") {
            content_type = value.to_string();
        } else if !key.is_empty() {
            resp.set_header(key, value);
        }
    }

    resp.set_body(body.to_vec(), &content_type);
    resp
}
