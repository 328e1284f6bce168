use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use std::time::Instant;
use crate::error::BoardError;
use crate::metrics::{REQUEST_TOTAL, record_rejection};
use crate::state::AppState;
use super::board::error_page;

// Global throttle, first thing on every board route before any body parsing
fn admit(state: &AppState) -> Result<(), BoardError> {
    REQUEST_TOTAL.inc();

    state.throttle.admit(Instant::now()).inspect_err(record_rejection)
}

// JSON routes - rejections use the BoardError body
pub async fn global_throttle(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    match admit(&state) {
        Ok(()) => next.run(request).await,
        Err(err) => err.into_response(),
    }
}

// HTML board - rejections re-render the page with a flash line
pub async fn board_throttle(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    match admit(&state) {
        Ok(()) => next.run(request).await,
        Err(err) => error_page(&state, &err),
    }
}
