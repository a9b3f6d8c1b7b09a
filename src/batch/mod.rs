//! 批量请求调度：限流、并发上限与完成回调。
//!
//! # Batch Dispatch Module
//!
//! Runs a queue of requests against a bounded in-flight set, throttled by a
//! per-second and per-hour ceiling, and reports every completion to a
//! caller-supplied handler.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`BatchCoordinator`] | Send-time pre-flight (transport, credential, non-empty) |
//! | [`DispatchPool`] | Holds at most N requests in flight, refilled by a single loop |
//! | [`CompletionHandler`] | Callback invoked once per finished request |
//! | [`BatchReport`] | Counts and timings for one send |
//!
//! ## Ordering
//!
//! - Requests are issued in submission order.
//! - Handlers fire in completion order; use [`Completion::index`] to correlate.
//! - There is no cancel call; dropping the `run` future aborts in-flight requests.

mod coordinator;
mod handler;
mod pool;
mod report;

pub use coordinator::{BatchCoordinator, TransportSlot};
pub use handler::{Completion, CompletionHandler, NoopHandler};
pub use pool::{DispatchPool, DispatchSettings};
pub use report::BatchReport;
