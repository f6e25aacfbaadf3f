//! localserver library entry.
//!
//! This crate wires config, routing, handlers (static files, CGI, sessions,
//! uploads), the per-connection transport, and the ops endpoints into one
//! server. It is consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod handlers;
pub mod obs;
pub mod ops;
pub mod router;
pub mod server;
pub mod session;
pub mod transport;
