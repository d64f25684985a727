//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

/// A connected participant as exposed by `GET /api/participants`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantDto {
    pub connection_id: u64,
    pub username: String,
    /// RFC 3339 formatted connection time
    pub connected_at: String,
}

/// History log contents as exposed by `GET /api/history`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryDto {
    pub capacity: usize,
    pub entries: Vec<String>,
}

/// Health check response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthDto {
    pub status: String,
    pub connected_clients: usize,
}
