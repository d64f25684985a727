//! Connection and HTTP handlers.

mod framing;
pub mod http;
pub mod session;
