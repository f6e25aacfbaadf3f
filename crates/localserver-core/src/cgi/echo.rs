/// Meta-variables listed by the echo page besides every `HTTP_*` one.
pub const ECHOED_VARS: [&str; 3] = ["REQUEST_METHOD", "QUERY_STRING", "PATH_INFO"];

/// Keep the variables the echo page shows, sorted by name.
pub fn echo_vars<I, K, V>(env: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let mut vars: Vec<(String, String)> = env
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .filter(|(k, _)| k.starts_with("HTTP_") || ECHOED_VARS.contains(&k.as_str()))
        .collect();
    vars.sort();
    vars
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Full CGI document: header block, blank line, HTML listing.
pub fn render_echo_page<I, K, V>(env: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let mut page = String::from("Content-Type: text/html\r\n\r\n");
    page.push_str("<html><body><h1>Hello from CGI!</h1>\n");
    page.push_str("<p>Environment Variables:</p><ul>\n");
    for (k, v) in echo_vars(env) {
        page.push_str(&format!("<li>{}: {}</li>\n", escape_html(&k), escape_html(&v)));
    }
    page.push_str("</ul></body></html>\n");
    page
}
