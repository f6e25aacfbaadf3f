//! CGI/1.1 helpers shared by the server and the echo binary.
//!
//! - `env`: the meta-variables a script is launched with.
//! - `output`: turning a script's stdout into a `Response`.
//! - `echo`: the echo page that lists request meta-variables.

pub mod echo;
pub mod env;
pub mod output;

pub use echo::{echo_vars, render_echo_page};
pub use env::{request_env, CgiContext};
pub use output::parse_cgi_output;
