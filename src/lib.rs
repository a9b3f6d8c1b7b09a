//! # battlenet-api
//!
//! 战网社区 API 的 Rust 客户端：构建请求 URL，并以限流、限并发的方式批量发送。
//!
//! Battle.net community API client that builds request URLs and sends them
//! as throttled, bounded-concurrency batches.
//!
//! ## Overview
//!
//! Requests are queued on a [`BattleNetClient`] (either resolved through the
//! endpoint registry or added as raw URLs) and sent together. The dispatcher
//! keeps at most `max_connections` requests in flight, pauses issuance when a
//! per-second or per-hour ceiling is reached, and calls your completion
//! handler once for every request, whether it succeeded or not.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use battlenet_api::{BattleNetClient, Completion, Params, Region};
//!
//! #[tokio::main]
//! async fn main() -> battlenet_api::Result<()> {
//!     let mut client = BattleNetClient::builder()
//!         .api_key("your-api-key")
//!         .region(Region::Us)
//!         .locale("en_US")
//!         .max_connections(5)
//!         .throttle_per_second(80)
//!         .build()?;
//!
//!     client.add_request("wow", "item", Params::new().with("itemId", 19019))?;
//!     client.add_request("wow", "achievement", Params::new().with("id", 2144))?;
//!
//!     let report = client
//!         .send(|c: &Completion| println!("{} -> {:?}", c.url, c.metadata.status))
//!         .await?;
//!     println!("{} of {} succeeded", report.succeeded, report.total);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Client, builder and request queue |
//! | [`batch`] | Dispatch pool, pre-flight and completion handlers |
//! | [`resilience`] | Per-second / per-hour fixed-window throttle |
//! | [`registry`] | `(service, endpoint)` → URL builders |
//! | [`transport`] | HTTP transport and per-request metadata |
//! | [`config`] | Regions, locales and client settings |
//! | [`request`] | Request descriptors and URL formatting |
//!
//! ## Known limitations
//!
//! - Throttling bounds how fast requests are *issued*, not how fast they
//!   arrive at the server.
//! - The completion handler runs on the dispatch loop; a slow handler slows
//!   the whole batch.

pub mod batch;
pub mod client;
pub mod config;
pub mod registry;
pub mod request;
pub mod resilience;
pub mod transport;

// Re-export main types for convenience
pub use batch::{BatchReport, Completion, CompletionHandler};
pub use client::{BattleNetClient, ClientBuilder};
pub use config::{ApiConfig, Region};
pub use registry::{Endpoint, EndpointRegistry, Params};
pub use request::RequestDescriptor;
pub use transport::{RequestHandle, Transport, TransportMetadata, TransportResponse};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
