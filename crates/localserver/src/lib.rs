//! Top-level facade crate for localserver.
//!
//! Re-exports the core primitives, the server, and the stress tool so users
//! can depend on a single crate.

pub mod core {
    pub use localserver_core::*;
}

pub mod server {
    pub use localserver_server::*;
}

pub mod stress {
    pub use localserver_stress::*;
}
