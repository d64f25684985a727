//! Data Transfer Objects (DTOs) for the admin HTTP API.

pub mod conversion;
pub mod http;
