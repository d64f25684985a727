//! Admin HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::{
    infrastructure::dto::http::{HealthDto, HistoryDto, ParticipantDto},
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthDto> {
    Json(HealthDto {
        status: "ok".to_string(),
        connected_clients: state.get_participants_usecase.count().await,
    })
}

/// List identified participants in registration order
pub async fn get_participants(State(state): State<Arc<AppState>>) -> Json<Vec<ParticipantDto>> {
    let participants = state.get_participants_usecase.execute().await;
    Json(participants.iter().map(ParticipantDto::from).collect())
}

/// Dump the history log, oldest entry first
pub async fn get_history(State(state): State<Arc<AppState>>) -> Json<HistoryDto> {
    let (capacity, entries) = state.get_history_usecase.execute().await;
    Json(HistoryDto { capacity, entries })
}
