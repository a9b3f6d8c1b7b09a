//! 限流模块：按秒与按小时的固定窗口限流。
//!
//! # Throttling Module
//!
//! Dispatch throttling for the batch loop.
//!
//! ## Rate Limiter
//!
//! [`rate_limiter::WindowRateLimiter`] counts dispatches in a 1-second and a
//! 1-hour fixed window. A ceiling of `0` disables that window. Reaching a
//! ceiling pauses issuance for one whole window unit.
//!
//! ```rust
//! use battlenet_api::resilience::rate_limiter::{RateLimiterConfig, WindowRateLimiter};
//!
//! # async fn demo() {
//! let config = RateLimiterConfig::disabled()
//!     .with_per_second(80)
//!     .with_per_hour(35_000);
//! let mut limiter = WindowRateLimiter::new(config);
//!
//! // Sleeps when a window is full, then counts the dispatch.
//! limiter.acquire().await;
//! # }
//! ```

pub mod rate_limiter;
