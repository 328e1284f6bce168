use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, Histogram, register_counter, register_gauge, register_histogram};
use crate::error::BoardError;


lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("board_requests_total", "Total number of board requests").unwrap();
    pub static ref POSTS_STORED: Counter =
        register_counter!("board_posts_stored_total", "Posts accepted onto the board").unwrap();
    pub static ref THROTTLED: Counter =
        register_counter!("board_throttled_total", "Requests rejected by the global throttle").unwrap();
    pub static ref RATE_LIMITED: Counter =
        register_counter!("board_rate_limited_total", "Requests rejected by the per-client limiter").unwrap();
    pub static ref VALIDATION_FAILURES: Counter =
        register_counter!("board_validation_failures_total", "Posts rejected for invalid fields").unwrap();
    pub static ref AUTH_FAILURES: Counter =
        register_counter!("board_auth_failures_total", "Posts rejected for reserved-name password mismatch").unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "board_post_latency_seconds",
        "Post handling latency in seconds"
    )
    .unwrap();
    pub static ref MESSAGE_LOG_SIZE: Gauge =
        register_gauge!("board_messages", "Current number of messages on the board").unwrap();
    pub static ref TRACKED_CLIENTS: Gauge =
        register_gauge!("board_tracked_clients", "Client windows held by the rate limiter").unwrap();
}

// Count a rejected request under its cause
pub fn record_rejection(err: &BoardError) {
    match err {
        BoardError::Throttled => THROTTLED.inc(),
        BoardError::RateLimited => RATE_LIMITED.inc(),
        BoardError::Validation(_) => VALIDATION_FAILURES.inc(),
        BoardError::Authentication => AUTH_FAILURES.inc(),
        BoardError::Internal(_) => {}
    }
}
