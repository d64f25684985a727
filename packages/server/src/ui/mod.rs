//! Network-facing layer: TCP listener, per-connection sessions and the admin HTTP API.

mod handler;
mod server;
mod signal;
pub mod state;

pub use handler::session::handle_connection;
pub use server::Server;
pub use signal::shutdown_signal;
