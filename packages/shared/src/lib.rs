//! Utilities shared by the linechat server and client binaries.

pub mod logger;
pub mod time;
