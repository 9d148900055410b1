//! Fixed-window rate limiting held in process memory.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use dashmap::{DashMap, mapref::entry::Entry};
use tokio::{
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};

/// Rate limiter trait for checking and incrementing counters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Count one submission for `key` and report whether it is within the limit.
    /// Checking and counting happen as a single step per key.
    async fn check(&self, key: &str) -> RateLimitResult;

    /// Drop entries whose window has expired. Returns how many were removed.
    async fn sweep(&self) -> usize;
}

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Under the limit, includes current count.
    Allowed(u32),
    /// Over the limit, includes current count.
    Exceeded(u32),
}

impl RateLimitResult {
    #[cfg(test)]
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            max_requests: 1,
            window: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct RateLimitEntry {
    window_start: Instant,
    count: u32,
}

impl RateLimitEntry {
    fn open(now: Instant) -> Self {
        Self {
            window_start: now,
            count: 1,
        }
    }

    /// A request exactly `window` after the start still counts against it.
    fn is_expired(&self, now: Instant, window: Duration) -> bool {
        now.duration_since(self.window_start) > window
    }
}

/// In-memory implementation of RateLimiter.
///
/// Entries are keyed by client key and sharded by `DashMap`; holding the
/// entry guard makes the read-compare-increment atomic for that key.
pub struct InMemoryRateLimiter {
    policy: RateLimitPolicy,
    entries: DashMap<String, RateLimitEntry>,
}

impl InMemoryRateLimiter {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self {
            policy,
            entries: DashMap::new(),
        }
    }

    /// Number of tracked keys, expired or not.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn check_at(&self, key: &str, now: Instant) -> RateLimitResult {
        match self.entries.entry(key.to_owned()) {
            Entry::Vacant(vacant) => {
                vacant.insert(RateLimitEntry::open(now));
                RateLimitResult::Allowed(1)
            }
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();

                if entry.is_expired(now, self.policy.window) {
                    *entry = RateLimitEntry::open(now);
                    RateLimitResult::Allowed(1)
                } else if entry.count >= self.policy.max_requests {
                    RateLimitResult::Exceeded(entry.count)
                } else {
                    entry.count += 1;
                    RateLimitResult::Allowed(entry.count)
                }
            }
        }
    }

    fn sweep_at(&self, now: Instant) -> usize {
        let window = self.policy.window;
        let mut removed = 0;

        self.entries.retain(|_, entry| {
            let keep = !entry.is_expired(now, window);
            if !keep {
                removed += 1;
            }
            keep
        });

        removed
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check(&self, key: &str) -> RateLimitResult {
        self.check_at(key, Instant::now())
    }

    async fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }
}

/// Periodically sweep expired entries from every limiter.
///
/// Expired entries are already ignored by `check`, so the sweep only bounds
/// memory. The task runs until the handle is aborted.
pub fn spawn_sweeper(limiters: Vec<Arc<dyn RateLimiter>>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately
        interval.tick().await;

        loop {
            interval.tick().await;

            let mut removed = 0;
            for limiter in &limiters {
                removed += limiter.sweep().await;
            }

            if removed > 0 {
                tracing::debug!(removed, "swept expired rate limit entries");
            }
        }
    })
}
