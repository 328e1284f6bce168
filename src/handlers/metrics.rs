use axum::extract::State;
use prometheus::{Encoder, TextEncoder};
use std::sync::Arc;
use crate::error::BoardError;
use crate::metrics::{MESSAGE_LOG_SIZE, TRACKED_CLIENTS};
use crate::state::AppState;

pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> Result<String, BoardError> {
    MESSAGE_LOG_SIZE.set(state.messages.len() as f64);
    TRACKED_CLIENTS.set(state.rate_limiter.tracked_clients() as f64);

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| BoardError::Internal(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| BoardError::Internal(e.to_string()))
}
