//! Bounded-concurrency dispatch loop.

use super::handler::{Completion, CompletionHandler};
use super::report::BatchReport;
use crate::config::ApiConfig;
use crate::request::{format_request_url, RequestDescriptor};
use crate::resilience::rate_limiter::{RateLimiterConfig, WindowRateLimiter};
use crate::transport::{RequestHandle, Transport, TransportResponse};
use crate::{Error, ErrorContext, Result};
use futures::FutureExt;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Dispatch parameters captured when a batch is sent.
#[derive(Clone, PartialEq, Eq)]
pub struct DispatchSettings {
    pub max_concurrency: usize,
    pub rate_limit: RateLimiterConfig,
    pub locale: Option<String>,
    pub api_key: Option<String>,
}

impl DispatchSettings {
    pub fn from_config(config: &ApiConfig) -> Self {
        Self {
            max_concurrency: config.max_connections,
            rate_limit: RateLimiterConfig::new(config.throttle_per_second, config.throttle_per_hour),
            locale: Some(config.locale.clone()),
            api_key: config.api_key.clone(),
        }
    }
}

impl fmt::Debug for DispatchSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchSettings")
            .field("max_concurrency", &self.max_concurrency)
            .field("rate_limit", &self.rate_limit)
            .field("locale", &self.locale)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

type Issued = (RequestHandle, String, TransportResponse);

/// Holds up to `max_concurrency` requests in flight and refills each freed
/// slot from the queue, in submission order, until the queue is drained.
///
/// Each issued request runs on its own task so it makes progress even while
/// the loop is paused by the throttle. Completions funnel back into a single
/// loop, which alone owns the limiter, the queue and the in-flight set.
/// Dropping the `run` future aborts every request still in flight.
pub struct DispatchPool {
    settings: DispatchSettings,
    transport: Arc<dyn Transport>,
}

impl DispatchPool {
    pub fn new(settings: DispatchSettings, transport: Arc<dyn Transport>) -> Self {
        Self {
            settings,
            transport,
        }
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    /// Run `requests` to completion, invoking `handler` once per request.
    pub async fn run<H>(&self, requests: Vec<RequestDescriptor>, handler: &mut H) -> Result<BatchReport>
    where
        H: CompletionHandler + ?Sized,
    {
        if self.settings.max_concurrency == 0 {
            return Err(Error::configuration_with_context(
                "max connections must be at least 1",
                ErrorContext::new()
                    .with_field_path("max_connections")
                    .with_source("dispatch_pool"),
            ));
        }
        if requests.is_empty() {
            return Err(Error::EmptyBatch);
        }

        let started = Instant::now();
        let mut batch = Batch::new(self, requests);
        let seed = self.settings.max_concurrency.min(batch.report.total);

        info!(
            total = batch.report.total,
            max_concurrency = self.settings.max_concurrency,
            "dispatching batch"
        );

        for _ in 0..seed {
            batch.issue_next().await;
        }

        while let Some(joined) = batch.tasks.join_next().await {
            let (handle, url, response) = match joined {
                Ok(issued) => issued,
                Err(e) => {
                    warn!(error = %e, "request task ended without a result");
                    if !batch.pending.is_empty() {
                        batch.issue_next().await;
                    }
                    continue;
                }
            };
            if batch.in_flight.remove(&handle).is_none() {
                warn!(handle = %handle, "completion for unknown request");
                continue;
            }

            let completion = Completion {
                url,
                body: response.body,
                metadata: response.metadata,
                handle,
            };
            debug!(
                index = handle.index(),
                status = completion.metadata.status,
                error = completion.metadata.error.as_deref(),
                duration_ms = completion.metadata.total_time.as_millis() as u64,
                "request completed"
            );
            batch.report.record(&completion.metadata);
            handler.on_complete(&completion);

            if !batch.pending.is_empty() {
                batch.issue_next().await;
            }
        }

        let mut report = batch.finish();
        report.elapsed = started.elapsed();
        info!(
            total = report.total,
            succeeded = report.succeeded,
            failed = report.failed,
            throttle_pauses = report.throttle_pauses,
            duration_ms = report.elapsed.as_millis() as u64,
            "batch complete"
        );
        Ok(report)
    }
}

/// Per-send state owned by the dispatch loop.
struct Batch<'p> {
    pool: &'p DispatchPool,
    pending: VecDeque<RequestDescriptor>,
    in_flight: HashMap<RequestHandle, usize>,
    tasks: JoinSet<Issued>,
    limiter: WindowRateLimiter,
    report: BatchReport,
}

impl<'p> Batch<'p> {
    fn new(pool: &'p DispatchPool, requests: Vec<RequestDescriptor>) -> Self {
        let total = requests.len();
        Self {
            pool,
            pending: requests.into(),
            in_flight: HashMap::with_capacity(pool.settings.max_concurrency),
            tasks: JoinSet::new(),
            limiter: WindowRateLimiter::new(pool.settings.rate_limit),
            report: BatchReport::new(total),
        }
    }

    /// Throttle, then issue the front of the queue into a free slot.
    async fn issue_next(&mut self) {
        let Some(descriptor) = self.pending.pop_front() else {
            return;
        };

        let paused = self.limiter.acquire().await;
        if !paused.is_zero() {
            self.report.throttled_for += paused;
        }

        let settings = &self.pool.settings;
        let url = format_request_url(
            descriptor.url(),
            settings.locale.as_deref(),
            settings.api_key.as_deref(),
        );
        let handle = RequestHandle::new(descriptor.index());
        self.in_flight.insert(handle, descriptor.index());
        self.report.observe_in_flight(self.in_flight.len());

        debug!(
            index = descriptor.index(),
            url = descriptor.url(),
            in_flight = self.in_flight.len(),
            "issuing request"
        );

        let transport = Arc::clone(&self.pool.transport);
        self.tasks.spawn(async move {
            let fetched = AssertUnwindSafe(transport.fetch(&url, handle))
                .catch_unwind()
                .await;
            let response = fetched.unwrap_or_else(|_| {
                TransportResponse::failed(url.as_str(), "transport panicked", Duration::ZERO)
            });
            (handle, url, response)
        });
    }

    fn finish(self) -> BatchReport {
        let mut report = self.report;
        report.throttle_pauses = self.limiter.snapshot().pauses;
        report
    }
}
