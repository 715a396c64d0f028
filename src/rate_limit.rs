//! Fixed-window request throttling keyed by client IP address.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    /// Requests allowed per client within one window.
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Throttle,
}

#[derive(Debug, Clone, Copy)]
struct ClientWindow {
    count: u32,
    started_at: Instant,
}

/// Process-wide counters. The map is shared by every request, so it sits
/// behind a mutex; no await happens while the lock is held.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    clients: Mutex<HashMap<IpAddr, ClientWindow>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            clients: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Count one request from `addr` and decide whether it may proceed.
    pub fn check(&self, addr: IpAddr) -> Decision {
        self.check_at(addr, Instant::now())
    }

    /// Same as [`check`](Self::check) with an explicit clock reading.
    /// Throttled requests still count toward the window.
    pub fn check_at(&self, addr: IpAddr, now: Instant) -> Decision {
        let mut clients = self.lock();
        let entry = clients.entry(addr).or_insert(ClientWindow {
            count: 0,
            started_at: now,
        });

        if now.saturating_duration_since(entry.started_at) >= self.config.window {
            entry.count = 0;
            entry.started_at = now;
        }
        entry.count = entry.count.saturating_add(1);

        if entry.count > self.config.max_requests {
            Decision::Throttle
        } else {
            Decision::Allow
        }
    }

    /// Drop clients whose window has already expired. Returns how many were
    /// removed.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    pub fn sweep_at(&self, now: Instant) -> usize {
        let window = self.config.window;
        let mut clients = self.lock();
        let before = clients.len();
        clients.retain(|_, w| now.saturating_duration_since(w.started_at) < window);
        before - clients.len()
    }

    pub fn tracked_clients(&self) -> usize {
        self.lock().len()
    }

    /// Spawn a background task that sweeps stale clients once per window.
    pub fn start_sweeper(self: &Arc<Self>) {
        if self.config.window.is_zero() {
            return;
        }
        let limiter = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(limiter.config.window);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = limiter.sweep();
                if removed > 0 {
                    tracing::debug!(
                        removed,
                        remaining = limiter.tracked_clients(),
                        "rate limiter: swept stale clients"
                    );
                }
            }
        });
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<IpAddr, ClientWindow>> {
        self.clients.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
