use std::sync::Arc;
use crate::credentials::CredentialStore;
use crate::message_log::MessageLog;
use crate::posting::PostingService;
use crate::rate_limit::PerClientRateLimiter;
use crate::throttle::SlidingWindowThrottle;
// app's shared state

pub struct AppState {
    pub throttle: Arc<SlidingWindowThrottle>,      // global gate, every board route
    pub rate_limiter: Arc<PerClientRateLimiter>,   // per-client gate, posts only
    pub messages: Arc<MessageLog>,
    pub posting: PostingService,
}

impl AppState {
    pub fn new(
        throttle: SlidingWindowThrottle,
        rate_limiter: PerClientRateLimiter,
        credentials: CredentialStore,
        messages: MessageLog,
    ) -> Self {
        let throttle = Arc::new(throttle);
        let rate_limiter = Arc::new(rate_limiter);
        let messages = Arc::new(messages);
        let posting = PostingService::new(
            Arc::clone(&throttle),
            Arc::clone(&rate_limiter),
            Arc::new(credentials),
            Arc::clone(&messages),
        );

        Self {
            throttle,
            rate_limiter,
            messages,
            posting,
        }
    }
}
