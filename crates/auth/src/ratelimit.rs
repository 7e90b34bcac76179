//! Sliding-window rate limiting for login attempts.
//!
//! Keyed by (login_id, source) so one noisy address cannot lock out a
//! whole organization, and one login id cannot be hammered from many
//! addresses without each window filling independently.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

use netbill_core::Clock;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct AttemptKey {
    login_id: String,
    source: String,
}

pub struct LoginRateLimiter {
    max_attempts: u32,
    window: Duration,
    clock: Arc<dyn Clock>,
    attempts: Mutex<HashMap<AttemptKey, VecDeque<DateTime<Utc>>>>,
}

impl LoginRateLimiter {
    pub fn new(max_attempts: u32, window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            max_attempts,
            window,
            clock,
            attempts: Mutex::new(HashMap::new()),
        }
    }

    /// Record an attempt and report whether it is still within the window
    /// cap. Callers must complete credential verification before acting on
    /// a `false`; rate limiting never skips the hashing work.
    pub fn record(&self, login_id: &str, source: &str) -> bool {
        let now = self.clock.now();
        let key = AttemptKey {
            login_id: login_id.to_string(),
            source: source.to_string(),
        };

        let Ok(mut attempts) = self.attempts.lock() else {
            // Poisoned limiter: deny rather than open the gate.
            return false;
        };
        let window = attempts.entry(key).or_default();
        while let Some(front) = window.front() {
            if now - *front >= self.window {
                window.pop_front();
            } else {
                break;
            }
        }
        window.push_back(now);
        window.len() <= self.max_attempts as usize
    }
}
