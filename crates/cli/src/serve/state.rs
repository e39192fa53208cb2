//! Application state and rate limiting.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reelops_lifecycle::{Notifier, TransitionGuard};
use reelops_storage::ScriptStore;
use tokio::sync::Mutex;

/// Rate limit window (1 minute).
pub(crate) const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);

/// Per-IP fixed-window request counter.
pub(crate) struct RateLimiter {
    windows: Mutex<Windows>,
    max_requests: u64,
    window: Duration,
}

struct Windows {
    /// (requests in window, window start) per client IP.
    by_ip: HashMap<IpAddr, (u64, Instant)>,
    last_sweep: Instant,
}

impl RateLimiter {
    pub(crate) fn new(max_requests: u64) -> Self {
        Self::with_window(max_requests, RATE_LIMIT_WINDOW)
    }

    pub(crate) fn with_window(max_requests: u64, window: Duration) -> Self {
        Self {
            windows: Mutex::new(Windows {
                by_ip: HashMap::new(),
                last_sweep: Instant::now(),
            }),
            max_requests,
            window,
        }
    }

    pub(crate) fn max_requests(&self) -> u64 {
        self.max_requests
    }

    /// Count a request from `ip`.
    /// Returns Ok(()) if allowed, Err(retry_after_secs) if over the limit.
    pub(crate) async fn check(&self, ip: IpAddr) -> Result<(), u64> {
        let mut windows = self.windows.lock().await;
        let now = Instant::now();

        // Drop clients whose window has lapsed, at most once per window.
        if now.duration_since(windows.last_sweep) >= self.window {
            let window = self.window;
            windows
                .by_ip
                .retain(|_, (_, started)| now.duration_since(*started) < window);
            windows.last_sweep = now;
        }

        let (count, started) = windows.by_ip.entry(ip).or_insert((0, now));

        let elapsed = now.duration_since(*started);
        if elapsed >= self.window {
            *count = 0;
            *started = now;
        }

        *count += 1;
        if *count > self.max_requests {
            Err(self.window.saturating_sub(elapsed).as_secs().max(1))
        } else {
            Ok(())
        }
    }

    #[cfg(test)]
    async fn tracked_clients(&self) -> usize {
        self.windows.lock().await.by_ip.len()
    }
}

/// The guard as wired into the server: shared store, boxed notifier.
pub(crate) type SharedGuard = TransitionGuard<Arc<dyn ScriptStore>, Arc<dyn Notifier>>;

/// Application state shared across request handlers.
pub(crate) struct AppState {
    /// Record store, also held by the guard.
    pub(crate) store: Arc<dyn ScriptStore>,
    pub(crate) guard: SharedGuard,
    pub(crate) rate_limiter: RateLimiter,
    /// Optional API key for authentication. None = no auth required.
    pub(crate) api_key: Option<String>,
}

impl AppState {
    pub(crate) fn new(
        store: Arc<dyn ScriptStore>,
        notifier: Arc<dyn Notifier>,
        tenant_id: Option<String>,
        rate_limit: u64,
        api_key: Option<String>,
    ) -> Self {
        let guard = TransitionGuard::new(store.clone(), notifier).with_tenant(tenant_id);
        AppState {
            store,
            guard,
            rate_limiter: RateLimiter::new(rate_limit),
            api_key,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    #[tokio::test]
    async fn allows_up_to_limit_then_rejects() {
        let limiter = RateLimiter::new(2);
        let ip = IpAddr::V4(Ipv4Addr::LOCALHOST);
        assert!(limiter.check(ip).await.is_ok());
        assert!(limiter.check(ip).await.is_ok());
        let retry = limiter.check(ip).await.unwrap_err();
        assert!((1..=60).contains(&retry));
    }

    #[tokio::test]
    async fn limits_are_per_ip() {
        let limiter = RateLimiter::new(1);
        let a = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        let b = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));
        assert!(limiter.check(a).await.is_ok());
        assert!(limiter.check(b).await.is_ok());
        assert!(limiter.check(a).await.is_err());
    }

    #[tokio::test]
    async fn window_expiry_resets_count() {
        let limiter = RateLimiter::with_window(1, Duration::from_millis(20));
        let ip = IpAddr::V4(Ipv4Addr::LOCALHOST);
        assert!(limiter.check(ip).await.is_ok());
        assert!(limiter.check(ip).await.is_err());
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(limiter.check(ip).await.is_ok());
    }

    #[tokio::test]
    async fn lapsed_clients_are_forgotten() {
        let limiter = RateLimiter::with_window(5, Duration::from_millis(20));
        for n in 1..=3 {
            limiter
                .check(IpAddr::V4(Ipv4Addr::new(10, 0, 0, n)))
                .await
                .unwrap();
        }
        assert_eq!(limiter.tracked_clients().await, 3);

        tokio::time::sleep(Duration::from_millis(30)).await;
        limiter.check(IpAddr::V4(Ipv4Addr::LOCALHOST)).await.unwrap();
        assert_eq!(limiter.tracked_clients().await, 1);
    }
}
