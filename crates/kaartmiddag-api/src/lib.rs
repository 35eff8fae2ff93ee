//! Kaartmiddag HTTP API: configuration, shared state, error mapping and
//! routes. The binary in `main.rs` wires these to a listener.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
