//! HTTP API endpoints.
//!
//! The browse page polls `/api/rooms` every few seconds; everything else
//! happens over the WebSocket.

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::protocol::RoomSummary;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct RoomListResponse {
    pub rooms: Vec<RoomSummary>,
    pub server_now: String,
}

/// List public rooms still waiting for players.
///
/// GET /api/rooms
pub async fn list_rooms(State(state): State<Arc<AppState>>) -> Json<RoomListResponse> {
    Json(RoomListResponse {
        rooms: state.list_public_rooms().await,
        server_now: chrono::Utc::now().to_rfc3339(),
    })
}
