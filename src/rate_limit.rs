use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::config::ApiConfig;

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at: Instant,
}

#[derive(Debug)]
struct Windows {
    by_key: HashMap<String, Window>,
    next_sweep: Option<Instant>,
}

/// Process-local fixed-window limiter keyed by caller and action.
/// Counters live in memory and start over on restart. Expired windows are
/// swept at most once per window length.
#[derive(Debug)]
pub struct FixedWindowLimiter {
    enabled: bool,
    max_requests: u32,
    window: Duration,
    windows: Mutex<Windows>,
}

impl FixedWindowLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            enabled: true,
            max_requests,
            window,
            windows: Mutex::new(Windows { by_key: HashMap::new(), next_sweep: None }),
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new(0, Duration::ZERO)
        }
    }

    pub fn from_config(api: &ApiConfig) -> Self {
        if api.enable_rate_limiting {
            Self::new(api.rate_limit_requests, Duration::from_secs(api.rate_limit_window_secs))
        } else {
            Self::disabled()
        }
    }

    /// Count one request for `key`; false when the key is over its limit.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    pub fn check_at(&self, key: &str, now: Instant) -> bool {
        if !self.enabled {
            return true;
        }
        let mut windows = match self.windows.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if windows.next_sweep.map_or(true, |at| now >= at) {
            windows.by_key.retain(|_, w| now < w.reset_at);
            windows.next_sweep = Some(now + self.window);
        }

        let window = windows.by_key.entry(key.to_string()).or_insert(Window {
            count: 0,
            reset_at: now + self.window,
        });
        if now >= window.reset_at {
            window.count = 0;
            window.reset_at = now + self.window;
        }
        if window.count >= self.max_requests {
            return false;
        }
        window.count += 1;
        true
    }
}
