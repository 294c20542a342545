//! Per-client request rate limiting for the IPC surface

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use crate::ClientId;

/// Sliding-window rate limiter keyed by client.
///
/// A client may issue at most `max_requests` within any `window`.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    clients: HashMap<ClientId, VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            clients: HashMap::new(),
        }
    }

    /// Record a request from `client_id` now. Returns `false` if it must be rejected.
    pub fn check(&mut self, client_id: &ClientId) -> bool {
        self.check_at(client_id, Instant::now())
    }

    /// Same as [`check`](Self::check) with an explicit clock reading.
    pub fn check_at(&mut self, client_id: &ClientId, now: Instant) -> bool {
        let window = self.window;
        let recent = self.clients.entry(client_id.clone()).or_default();

        while let Some(oldest) = recent.front() {
            if now.duration_since(*oldest) >= window {
                recent.pop_front();
            } else {
                break;
            }
        }

        if recent.len() >= self.max_requests {
            return false;
        }

        recent.push_back(now);
        true
    }

    /// Forget a disconnected client
    pub fn remove_client(&mut self, client_id: &ClientId) {
        self.clients.remove(client_id);
    }
}
