use crate::{AppState, DEFAULT_HISTORY_LIMIT, StoreError};
use axum::Json;
use axum::extract::{Path, Query, State};
use huddle_core::{Room, RoomId, StoredMessage};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

pub async fn get_or_create_room(
    Path(slug): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Room>, StoreError> {
    let room = state.rooms.get_or_create(&slug).await?;
    info!("Resolved room '{}' -> {}", room.slug, room.id);
    Ok(Json(room))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

pub async fn list_messages(
    Path(room_id): Path<i64>,
    Query(query): Query<HistoryQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<StoredMessage>>, StoreError> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let messages = state.store.recent(RoomId(room_id), limit).await?;
    Ok(Json(messages))
}
