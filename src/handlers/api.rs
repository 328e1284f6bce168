use axum::extract::{ConnectInfo, State};
use axum::http::StatusCode;
use axum::Json;
use std::net::SocketAddr;
use std::sync::Arc;
use crate::error::BoardError;
use crate::models::{Message, PostRequest};
use crate::state::AppState;
use super::run_post;

pub async fn list_messages_handler(State(state): State<Arc<AppState>>) -> Json<Vec<Message>> {
    Json(state.posting.list())
}

pub async fn create_message_handler(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Json(payload): Json<PostRequest>,
) -> Result<(StatusCode, Json<Message>), BoardError> {
    let message = run_post(&state, payload, peer).await?;
    Ok((StatusCode::CREATED, Json(message)))
}
