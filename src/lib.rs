//! A small shared message board.
//!
//! Posts pass a global sliding-window throttle and a per-client rate limiter,
//! are validated, checked against reserved usernames, escaped, and kept in a
//! fixed-size history of the most recent 100 messages.

pub mod config;
pub mod credentials;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod message_log;
pub mod metrics;
pub mod models;
pub mod posting;
pub mod rate_limit;
pub mod render;
pub mod sanitize;
pub mod state;
pub mod throttle;

use axum::{Router, middleware, routing::get};
use std::sync::Arc;

use crate::handlers::{
    board_throttle, create_message_handler, global_throttle, health_handler, index_handler,
    list_messages_handler, metrics_handler, submit_handler,
};
use crate::state::AppState;

// Board routes. Every method passes the global throttle before its body is read;
// handlers then run the rest of the post pipeline.
pub fn router(state: Arc<AppState>) -> Router {
    let page_throttle = middleware::from_fn_with_state(Arc::clone(&state), board_throttle);
    let api_throttle = middleware::from_fn_with_state(Arc::clone(&state), global_throttle);

    Router::new()
        .route(
            "/",
            get(index_handler)
                .post(submit_handler)
                .route_layer(page_throttle),
        )
        .route(
            "/api/messages",
            get(list_messages_handler)
                .post(create_message_handler)
                .route_layer(api_throttle),
        )
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}
