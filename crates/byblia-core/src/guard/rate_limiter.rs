//! Per-key sliding-window rate limiter with background eviction.

use byblia_types::models::config::RateLimitConfig;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Sliding-window counter keyed by client.
///
/// Each key owns the timestamps of its accepted requests, oldest first. The
/// DashMap shard lock taken by `entry()` makes prune, check and append one
/// atomic step per key, and unrelated keys on other shards never contend.
pub struct RateLimiter {
    windows: DashMap<String, VecDeque<Instant>>,
    max_requests: usize,
    window: Duration,
    sweep_interval: Duration,
    shutdown_tx: watch::Sender<bool>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Arc<Self> {
        let (shutdown_tx, _) = watch::channel(false);

        Arc::new(Self {
            windows: DashMap::new(),
            max_requests: config.max_requests.max(1) as usize,
            window: Duration::from_secs(config.window_secs),
            sweep_interval: Duration::from_secs(config.sweep_interval_secs.max(1)),
            shutdown_tx,
            sweeper: Mutex::new(None),
        })
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Admit or reject one request for `key`.
    ///
    /// Returns `true` and records the attempt when fewer than `max_requests`
    /// timestamps fall strictly inside the trailing window. Rejections record nothing.
    pub fn allow(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut timestamps = self.windows.entry(key.to_string()).or_default();

        prune(&mut timestamps, now, self.window);

        if timestamps.len() >= self.max_requests {
            tracing::debug!(
                client = %key,
                in_window = timestamps.len(),
                "rate limit reached"
            );
            return false;
        }

        timestamps.push_back(now);
        true
    }

    /// Requests still available to `key` in the current window.
    pub fn remaining(&self, key: &str) -> u32 {
        let now = Instant::now();
        let used = self.windows.get(key).map_or(0, |timestamps| {
            timestamps.iter().filter(|ts| now.duration_since(**ts) < self.window).count()
        });
        self.max_requests.saturating_sub(used) as u32
    }

    /// Number of keys currently held in memory.
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }

    /// Drop expired timestamps everywhere and evict keys left empty.
    ///
    /// Returns the number of evicted keys.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut evicted = 0;

        self.windows.retain(|_, timestamps| {
            prune(timestamps, now, self.window);
            if timestamps.is_empty() {
                evicted += 1;
                false
            } else {
                true
            }
        });

        evicted
    }

    /// Start the background sweep task.
    ///
    /// Returns `false` without spawning when a sweeper is already running.
    pub fn start_sweeper(self: &Arc<Self>) -> bool {
        let mut slot = self.sweeper.lock();
        if slot.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return false;
        }

        self.shutdown_tx.send_replace(false);
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let limiter: Weak<Self> = Arc::downgrade(self);
        let interval = self.sweep_interval;

        *slot = Some(tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = tokio::time::sleep(interval) => {
                        let Some(limiter) = limiter.upgrade() else {
                            break;
                        };
                        let evicted = limiter.sweep();
                        if evicted > 0 {
                            tracing::debug!(
                                evicted,
                                remaining = limiter.tracked_keys(),
                                "rate limiter sweep"
                            );
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow_and_update() {
                            tracing::info!("Rate limiter sweeper shutting down");
                            break;
                        }
                    }
                }
            }
        }));

        true
    }

    /// Signal the sweeper to exit. Returns `true` if one was running.
    pub fn stop(&self) -> bool {
        self.shutdown_tx.send_replace(true);
        self.sweeper.lock().take().is_some_and(|handle| !handle.is_finished())
    }

    pub fn is_sweeper_running(&self) -> bool {
        self.sweeper.lock().as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for RateLimiter {
    fn drop(&mut self) {
        self.shutdown_tx.send_replace(true);
    }
}

fn prune(timestamps: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while timestamps.front().is_some_and(|oldest| now.duration_since(*oldest) >= window) {
        timestamps.pop_front();
    }
}
