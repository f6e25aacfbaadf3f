//! HTTP/1.1 primitives.
//!
//! - `request`: panic-free request parsing (head first, then body) so the
//!   server can read incrementally and stop at the declared length.
//! - `response`: response builder with `Connection: close` semantics.
//! - `mime`: content types by file extension.

pub mod mime;
pub mod request;
pub mod response;
pub mod status;

pub use request::{header_end, HeaderEnd, Request, RequestHead};
pub use response::Response;
pub use status::StatusCode;
