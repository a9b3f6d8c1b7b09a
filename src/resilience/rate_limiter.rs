use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

pub const SECOND: Duration = Duration::from_secs(1);
pub const HOUR: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RateLimiterConfig {
    /// Dispatches allowed per 1-second window (0 = unlimited).
    pub max_per_second: u32,
    /// Dispatches allowed per 1-hour window (0 = unlimited).
    pub max_per_hour: u32,
}

impl RateLimiterConfig {
    pub fn new(max_per_second: u32, max_per_hour: u32) -> Self {
        Self {
            max_per_second,
            max_per_hour,
        }
    }

    /// No throttling in either window.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn with_per_second(mut self, n: u32) -> Self {
        self.max_per_second = n;
        self
    }

    pub fn with_per_hour(mut self, n: u32) -> Self {
        self.max_per_hour = n;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.max_per_second > 0 || self.max_per_hour > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimiterSnapshot {
    pub max_per_second: u32,
    pub max_per_hour: u32,
    pub count_this_second: u32,
    pub count_this_hour: u32,
    pub pauses: u32,
}

/// Fixed-window dispatch throttle with a 1-second and a 1-hour window.
///
/// Each window counts dispatches and is hard-reset to zero when it rolls
/// over; there is no sliding or smoothing. When a window's count reaches its
/// ceiling the caller pauses for one whole window unit (1 s or 1 h) and the
/// window restarts.
///
/// This bounds the rate at which requests are *issued*. It says nothing about
/// when they reach the server: connection setup and queuing on either side
/// can bunch arrivals together, so remote quotas may still trip.
///
/// Not shared: one limiter per batch, owned by the dispatch loop.
#[derive(Debug)]
pub struct WindowRateLimiter {
    cfg: RateLimiterConfig,
    count_this_second: u32,
    count_this_hour: u32,
    window_start_second: Instant,
    window_start_hour: Instant,
    pauses: u32,
}

impl WindowRateLimiter {
    pub fn new(cfg: RateLimiterConfig) -> Self {
        let now = Instant::now();
        Self {
            cfg,
            count_this_second: 0,
            count_this_hour: 0,
            window_start_second: now,
            window_start_hour: now,
            pauses: 0,
        }
    }

    pub fn config(&self) -> RateLimiterConfig {
        self.cfg
    }

    fn roll_windows(&mut self) {
        let now = Instant::now();
        if now.duration_since(self.window_start_second) >= SECOND {
            self.window_start_second = now;
            self.count_this_second = 0;
        }
        if now.duration_since(self.window_start_hour) >= HOUR {
            self.window_start_hour = now;
            self.count_this_hour = 0;
        }
    }

    /// True when the per-second ceiling is active and already reached.
    pub fn should_throttle_second(&mut self) -> bool {
        self.roll_windows();
        self.cfg.max_per_second > 0 && self.count_this_second >= self.cfg.max_per_second
    }

    /// True when the per-hour ceiling is active and already reached.
    pub fn should_throttle_hour(&mut self) -> bool {
        self.roll_windows();
        self.cfg.max_per_hour > 0 && self.count_this_hour >= self.cfg.max_per_hour
    }

    /// Count one issued request against both windows.
    pub fn record_dispatch(&mut self) {
        self.count_this_second = self.count_this_second.saturating_add(1);
        self.count_this_hour = self.count_this_hour.saturating_add(1);
    }

    /// Sleep until both windows have room. The per-second window is settled
    /// before the per-hour one. Returns the total time spent paused.
    pub async fn throttle(&mut self) -> Duration {
        let mut paused = Duration::ZERO;
        loop {
            if self.should_throttle_second() {
                debug!(
                    max_per_second = self.cfg.max_per_second,
                    "per-second ceiling reached, pausing"
                );
                tokio::time::sleep(SECOND).await;
                self.window_start_second = Instant::now();
                self.count_this_second = 0;
                self.pauses += 1;
                paused += SECOND;
                continue;
            }
            if self.should_throttle_hour() {
                info!(
                    max_per_hour = self.cfg.max_per_hour,
                    "per-hour ceiling reached, pausing for one hour"
                );
                tokio::time::sleep(HOUR).await;
                let now = Instant::now();
                self.window_start_hour = now;
                self.count_this_hour = 0;
                self.window_start_second = now;
                self.count_this_second = 0;
                self.pauses += 1;
                paused += HOUR;
                continue;
            }
            return paused;
        }
    }

    /// Wait for room, then record the dispatch.
    pub async fn acquire(&mut self) -> Duration {
        let paused = self.throttle().await;
        self.record_dispatch();
        paused
    }

    pub fn snapshot(&self) -> RateLimiterSnapshot {
        RateLimiterSnapshot {
            max_per_second: self.cfg.max_per_second,
            max_per_hour: self.cfg.max_per_hour,
            count_this_second: self.count_this_second,
            count_this_hour: self.count_this_hour,
            pauses: self.pauses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let cfg = RateLimiterConfig::disabled().with_per_second(80).with_per_hour(35000);
        assert_eq!(cfg, RateLimiterConfig::new(80, 35000));
        assert!(cfg.is_enabled());
        assert!(!RateLimiterConfig::disabled().is_enabled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_never_throttles() {
        let mut limiter = WindowRateLimiter::new(RateLimiterConfig::disabled());
        let start = Instant::now();
        for _ in 0..1000 {
            assert_eq!(limiter.acquire().await, Duration::ZERO);
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(limiter.snapshot().count_this_second, 1000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_ceiling_trips_at_limit() {
        let mut limiter = WindowRateLimiter::new(RateLimiterConfig::new(2, 0));
        assert!(!limiter.should_throttle_second());
        limiter.record_dispatch();
        assert!(!limiter.should_throttle_second());
        limiter.record_dispatch();
        assert!(limiter.should_throttle_second());
        assert!(!limiter.should_throttle_hour());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_window_rolls_over() {
        let mut limiter = WindowRateLimiter::new(RateLimiterConfig::new(1, 0));
        limiter.record_dispatch();
        assert!(limiter.should_throttle_second());
        tokio::time::advance(SECOND).await;
        assert!(!limiter.should_throttle_second());
        assert_eq!(limiter.snapshot().count_this_second, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_at_most_n_per_window() {
        let mut limiter = WindowRateLimiter::new(RateLimiterConfig::new(3, 0));
        let start = Instant::now();
        let mut at = Vec::new();
        for _ in 0..7 {
            limiter.acquire().await;
            at.push(start.elapsed().as_secs());
        }
        assert_eq!(at, vec![0, 0, 0, 1, 1, 1, 2]);
        assert_eq!(limiter.snapshot().pauses, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hour_ceiling_pauses_full_hour() {
        let mut limiter = WindowRateLimiter::new(RateLimiterConfig::new(0, 2));
        let start = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
        let paused = limiter.acquire().await;
        assert_eq!(paused, HOUR);
        assert_eq!(start.elapsed().as_secs(), HOUR.as_secs());
        assert_eq!(limiter.snapshot().count_this_hour, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_pause_honored_before_hour_pause() {
        let mut limiter = WindowRateLimiter::new(RateLimiterConfig::new(2, 2));
        limiter.acquire().await;
        limiter.acquire().await;
        assert!(limiter.should_throttle_second());
        assert!(limiter.should_throttle_hour());

        let paused = limiter.acquire().await;
        assert_eq!(paused, SECOND + HOUR);
        assert_eq!(limiter.snapshot().pauses, 2);
    }
}
