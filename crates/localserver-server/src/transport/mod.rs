//! Transport layer (plain TCP, one request per connection).
//!
//! `conn` reads exactly one request (head, then the declared body), hands it
//! to the router, writes the response, and closes.

pub mod conn;

pub use conn::{read_request, serve_connection, ReadLimits};
