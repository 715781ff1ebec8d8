use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Per-email limiter on password-reset requests, fixed window.
pub struct ResetRequestLimiter {
    /// lower-cased email -> (request_count, window_start)
    entries: DashMap<String, (u32, Instant)>,
    limit: u32,
    window: Duration,
}

impl ResetRequestLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            limit,
            window,
        }
    }

    /// Count a request for `email`. Returns Err with retry-after seconds once
    /// the limit for the current window is used up; rejected requests are not
    /// counted.
    pub fn check_and_record(&self, email: &str) -> Result<(), u64> {
        let now = Instant::now();

        let mut entry = self
            .entries
            .entry(email.trim().to_lowercase())
            .or_insert((0, now));
        let (count, start) = entry.value_mut();

        if now.duration_since(*start) > self.window {
            *count = 1;
            *start = now;
            return Ok(());
        }

        if *count >= self.limit {
            let elapsed = now.duration_since(*start).as_secs();
            return Err(self.window.as_secs().saturating_sub(elapsed).max(1));
        }

        *count += 1;
        Ok(())
    }

    /// Remove entries whose window started more than `max_age` ago.
    pub fn cleanup(&self, max_age: Duration) {
        let now = Instant::now();
        self.entries.retain(|_, (_, start)| now.duration_since(*start) < max_age);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ResetRequestLimiter {
    /// Three requests per email every fifteen minutes.
    fn default() -> Self {
        Self::new(3, Duration::from_secs(15 * 60))
    }
}
