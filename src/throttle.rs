//! Global sliding-window admission gate.
//!
//! Only admitted requests occupy window slots, so the gate bounds throughput
//! rather than attempts.

use crate::error::BoardError;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::warn;

/// Timestamps of admitted requests inside a trailing window.
#[derive(Debug, Default)]
pub struct RequestWindow {
    stamps: VecDeque<Instant>,
}

impl RequestWindow {
    /// Drop every timestamp with `now - t >= window`.
    pub fn prune(&mut self, now: Instant, window: Duration) {
        self.stamps
            .retain(|&t| now.saturating_duration_since(t) < window);
    }

    /// Prune, then record `now` if fewer than `limit` stamps remain.
    pub fn try_record(&mut self, now: Instant, window: Duration, limit: usize) -> bool {
        self.prune(now, window);
        if self.stamps.len() >= limit {
            return false;
        }
        self.stamps.push_back(now);
        true
    }

    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }
}

pub struct SlidingWindowThrottle {
    window: Mutex<RequestWindow>,
    capacity: usize,
    period: Duration,
}

impl SlidingWindowThrottle {
    pub fn new(capacity: usize, period: Duration) -> Self {
        Self {
            window: Mutex::new(RequestWindow::default()),
            capacity,
            period,
        }
    }

    /// Admit one request at `now`, or fail with [`BoardError::Throttled`].
    pub fn admit(&self, now: Instant) -> Result<(), BoardError> {
        // check and record under one lock
        let admitted = self.window.lock().try_record(now, self.period, self.capacity);
        if admitted {
            Ok(())
        } else {
            warn!("Global throttle full ({} per {:?})", self.capacity, self.period);
            Err(BoardError::Throttled)
        }
    }

    /// Requests currently counted in the window, as of `now`.
    pub fn in_flight(&self, now: Instant) -> usize {
        let mut window = self.window.lock();
        window.prune(now, self.period);
        window.len()
    }
}

impl Default for SlidingWindowThrottle {
    fn default() -> Self {
        Self::new(250, Duration::from_secs(60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const MINUTE: Duration = Duration::from_secs(60);

    #[test]
    fn admits_up_to_capacity_then_rejects() {
        let throttle = SlidingWindowThrottle::new(3, MINUTE);
        let t0 = Instant::now();

        for i in 0..3 {
            assert!(throttle.admit(t0 + Duration::from_secs(i)).is_ok());
        }
        assert_eq!(
            throttle.admit(t0 + Duration::from_secs(5)),
            Err(BoardError::Throttled)
        );
    }

    #[test]
    fn rejected_attempts_do_not_occupy_slots() {
        let throttle = SlidingWindowThrottle::new(1, MINUTE);
        let t0 = Instant::now();

        assert!(throttle.admit(t0).is_ok());
        for i in 1..10 {
            assert!(throttle.admit(t0 + Duration::from_secs(i)).is_err());
        }
        assert_eq!(throttle.in_flight(t0 + Duration::from_secs(10)), 1);
        // Only the first admit needs to age out.
        assert!(throttle.admit(t0 + MINUTE).is_ok());
    }

    #[test]
    fn window_boundary_is_exclusive() {
        let throttle = SlidingWindowThrottle::new(1, MINUTE);
        let t0 = Instant::now();

        assert!(throttle.admit(t0).is_ok());
        assert!(throttle.admit(t0 + MINUTE - Duration::from_millis(1)).is_err());
        assert!(throttle.admit(t0 + MINUTE).is_ok());
    }

    #[test]
    fn default_capacity_scenario() {
        let throttle = SlidingWindowThrottle::default();
        let t0 = Instant::now();

        for i in 0..250u64 {
            assert!(throttle.admit(t0 + Duration::from_millis(i * 100)).is_ok());
        }
        let last = t0 + Duration::from_millis(249 * 100);
        assert_eq!(throttle.admit(last), Err(BoardError::Throttled));
        assert!(throttle.admit(last + MINUTE).is_ok());
    }

    #[test]
    fn concurrent_admits_never_exceed_capacity() {
        let throttle = SlidingWindowThrottle::new(100, MINUTE);
        let admitted = AtomicUsize::new(0);
        let now = Instant::now();

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..50 {
                        if throttle.admit(now).is_ok() {
                            admitted.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                });
            }
        });

        assert_eq!(admitted.load(Ordering::Relaxed), 100);
        assert_eq!(throttle.in_flight(now), 100);
    }

    #[test]
    fn prune_keeps_out_of_order_stamps_correctly() {
        let mut window = RequestWindow::default();
        let t0 = Instant::now();
        window.try_record(t0 + Duration::from_secs(30), MINUTE, 10);
        window.try_record(t0, MINUTE, 10);

        window.prune(t0 + Duration::from_secs(70), MINUTE);
        assert_eq!(window.len(), 1);
        window.prune(t0 + Duration::from_secs(90), MINUTE);
        assert!(window.is_empty());
    }
}
