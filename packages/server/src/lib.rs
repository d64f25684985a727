//! Line-oriented chat relay server.
//!
//! Accepts TCP connections, reads a username as the first line, then relays
//! each following line as a broadcast (`[alice]: hello`), a direct message
//! (`@bob hi` → `[DM from alice]: hi`) or a history request (`/history`).
//! Broadcasts and join/leave notices are kept in a bounded in-memory history.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
pub mod error;

pub use config::ServerConfig;
pub use error::ServerError;
