mod admission;
mod api;
mod board;
mod health;
mod metrics;

pub use admission::{board_throttle, global_throttle};
pub use api::{create_message_handler, list_messages_handler};
pub use board::{index_handler, submit_handler};
pub use health::health_handler;
pub use metrics::metrics_handler;

use crate::error::BoardError;
use crate::metrics::{MESSAGE_LOG_SIZE, POSTS_STORED, REQUEST_LATENCY, record_rejection};
use crate::models::{Message, PostRequest};
use crate::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

// Run an admitted post on the blocking pool; password hashing is slow on purpose
async fn run_post(
    state: &Arc<AppState>,
    request: PostRequest,
    peer: SocketAddr,
) -> Result<Message, BoardError> {
    let start_time = Instant::now();
    let posting = state.posting.clone();
    let client = peer.ip().to_string();

    let result = match tokio::task::spawn_blocking(move || {
        posting.post_admitted(&request, &client, Instant::now())
    })
    .await
    {
        Ok(result) => result,
        Err(e) => Err(BoardError::Internal(format!("post task failed: {}", e))),
    };

    match &result {
        Ok(_) => {
            POSTS_STORED.inc();
            MESSAGE_LOG_SIZE.set(state.messages.len() as f64);
        }
        Err(err) => record_rejection(err),
    }
    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());

    result
}
