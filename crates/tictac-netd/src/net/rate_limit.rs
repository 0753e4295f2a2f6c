//! Connection and message rate limiting.
//!
//! IP-based limits protect the accept loop from connection floods; the
//! per-connection limit stops a single peer from spamming its session.

use std::net::IpAddr;
use std::num::NonZeroU32;
use std::sync::Arc;

use dashmap::DashMap;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};

/// Budgets for new connections and for lines. Zero turns a budget off.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub conn_per_ip_per_sec: u32,
    pub msg_per_conn_per_sec: u32,
    /// How many times the per-second rate is allowed in a burst.
    pub burst_multiplier: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            conn_per_ip_per_sec: 10,
            msg_per_conn_per_sec: 20,
            burst_multiplier: 3,
        }
    }
}

impl RateLimitConfig {
    pub fn conn_limit_enabled(&self) -> bool {
        self.conn_per_ip_per_sec > 0
    }

    pub fn msg_limit_enabled(&self) -> bool {
        self.msg_per_conn_per_sec > 0
    }
}

fn quota(per_sec: u32, burst_multiplier: u32) -> Option<Quota> {
    let rate = NonZeroU32::new(per_sec)?;
    let burst = NonZeroU32::new(per_sec.saturating_mul(burst_multiplier)).unwrap_or(rate);
    Some(Quota::per_second(rate).allow_burst(burst))
}

/// One token bucket per remote IP, consulted by the accept loop.
pub struct IpRateLimiter {
    limiters: DashMap<IpAddr, DefaultDirectRateLimiter>,
    quota: Option<Quota>,
}

impl IpRateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            limiters: DashMap::new(),
            quota: quota(config.conn_per_ip_per_sec, config.burst_multiplier),
        }
    }

    /// Spend one connection from `ip`'s budget. `false` means over the limit.
    pub fn admit(&self, ip: IpAddr) -> bool {
        let Some(quota) = self.quota else {
            return true;
        };

        self.limiters
            .entry(ip)
            .or_insert_with(|| RateLimiter::direct(quota))
            .check()
            .is_ok()
    }

    pub fn tracked_ips(&self) -> usize {
        self.limiters.len()
    }

    /// Forget buckets until at most `max_entries` remain.
    ///
    /// DashMap has no insertion order, so the evicted IPs are arbitrary.
    pub fn evict_down_to(&self, max_entries: usize) {
        if self.limiters.len() <= max_entries {
            return;
        }
        let excess = self.limiters.len() - max_entries;
        let victims: Vec<IpAddr> = self
            .limiters
            .iter()
            .take(excess)
            .map(|e| *e.key())
            .collect();
        for ip in victims {
            self.limiters.remove(&ip);
        }
    }
}

/// Per-connection line rate limiter.
#[derive(Clone)]
pub struct ConnRateLimiter {
    limiter: Arc<DefaultDirectRateLimiter>,
}

impl ConnRateLimiter {
    /// `None` when message limiting is disabled.
    pub fn new(config: &RateLimitConfig) -> Option<Self> {
        let quota = quota(config.msg_per_conn_per_sec, config.burst_multiplier)?;
        Some(Self {
            limiter: Arc::new(RateLimiter::direct(quota)),
        })
    }

    /// Spend one line from this connection's budget.
    pub fn admit(&self) -> bool {
        self.limiter.check().is_ok()
    }
}
