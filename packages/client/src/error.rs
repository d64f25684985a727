//! Error types for the terminal client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// The username is empty after trimming
    #[error("Username must not be empty")]
    EmptyUsername,

    /// Could not reach the server
    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Connection error after the session started
    #[error("Connection error: {0}")]
    Io(#[from] std::io::Error),

    /// Terminal input error
    #[error("Input error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}
