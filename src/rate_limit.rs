use crate::error::BoardError;
use crate::metrics::TRACKED_CLIENTS;
use crate::throttle::RequestWindow;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::interval;
use tracing::{debug, warn};

// Per-client rate limiter - one sliding window per client identity (IP)
//
// Windows live in a sharded map, so clients on different shards never
// contend, and requests from one client serialize on its entry.
pub struct PerClientRateLimiter {
    windows: DashMap<String, RequestWindow>,
    limit: usize,
    period: Duration,
    max_clients: usize,
}

impl PerClientRateLimiter {
    pub fn new(limit: usize, period: Duration, max_clients: usize) -> Self {
        Self {
            windows: DashMap::new(),
            limit,
            period,
            max_clients,
        }
    }

    pub fn admit(&self, client: &str, now: Instant) -> Result<(), BoardError> {
        if !self.windows.contains_key(client) && self.windows.len() >= self.max_clients {
            self.evict_idle(now);
            if self.windows.len() >= self.max_clients {
                warn!("Client table full ({}), turning away {}", self.max_clients, client);
                return Err(BoardError::RateLimited);
            }
        }

        // entry guard holds the shard lock until the match ends
        let (admitted, inserted) = match self.windows.entry(client.to_string()) {
            Entry::Occupied(mut entry) => {
                (entry.get_mut().try_record(now, self.period, self.limit), false)
            }
            Entry::Vacant(entry) => {
                let mut window = entry.insert(RequestWindow::default());
                (window.try_record(now, self.period, self.limit), true)
            }
        };

        // Racing newcomers can all pass the check above; back out past the bound.
        if inserted && self.windows.len() > self.max_clients {
            self.windows.remove(client);
            warn!("Client table full ({}), turning away {}", self.max_clients, client);
            return Err(BoardError::RateLimited);
        }

        if admitted {
            Ok(())
        } else {
            warn!("Rate limit exceeded for {}", client);
            Err(BoardError::RateLimited)
        }
    }

    // Drop clients with nothing left in their window. Returns how many went.
    pub fn evict_idle(&self, now: Instant) -> usize {
        let before = self.windows.len();
        self.windows.retain(|_, window| {
            window.prune(now, self.period);
            !window.is_empty()
        });
        let after = self.windows.len();
        TRACKED_CLIENTS.set(after as f64);
        before.saturating_sub(after)
    }

    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}

impl Default for PerClientRateLimiter {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(60), 10_000)
    }
}

// Idle client sweeper - runs every `sweep_interval`
pub async fn idle_sweeper(limiter: Arc<PerClientRateLimiter>, sweep_interval: Duration) {
    let mut interval = interval(sweep_interval);

    debug!("Idle client sweeper started (interval: {:?})", sweep_interval);

    loop {
        interval.tick().await;

        let evicted = limiter.evict_idle(Instant::now());
        if evicted > 0 {
            debug!(
                "Evicted {} idle client(s), {} still tracked",
                evicted,
                limiter.tracked_clients()
            );
        }
    }
}
