//! CGI echo page.
//!
//! Drop the built binary into a CGI directory (with a configured extension
//! such as `.cgi`) to see which request meta-variables a script receives.

use std::io::{self, Write};
use std::process::ExitCode;

use localserver::core::cgi::render_echo_page;

fn main() -> ExitCode {
    let page = render_echo_page(std::env::vars());
    let mut out = io::stdout().lock();
    match out.write_all(page.as_bytes()).and_then(|_| out.flush()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("cgi-echo: {e}");
            ExitCode::FAILURE
        }
    }
}
