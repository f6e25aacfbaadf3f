//! localserver core: transport-agnostic HTTP/1.1 primitives, CGI helpers, and
//! the shared error type.
//!
//! This crate defines the request/response contracts shared by the server,
//! the stress tool, and the CGI echo binary. It carries no runtime
//! dependencies so it can be reused in any of those contexts.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Malformed requests
//! and CGI output surface as `LocalServerError` or as a best-effort parse,
//! never as a crash.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod cgi;
pub mod error;
pub mod http;

/// Shared result type.
pub use error::{LocalServerError, Result};
