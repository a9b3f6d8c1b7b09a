//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use battlenet_api::{RequestDescriptor, RequestHandle, Transport, TransportResponse};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// In-memory transport with per-request latency and status.
///
/// Records when each request was issued and how many were active at once.
pub struct ScriptedTransport {
    latencies: HashMap<usize, Duration>,
    default_latency: Duration,
    statuses: HashMap<usize, u16>,
    active: AtomicUsize,
    max_active: AtomicUsize,
    issued: Mutex<Vec<(usize, Instant)>>,
}

impl ScriptedTransport {
    pub fn new(default_latency: Duration) -> Self {
        Self {
            latencies: HashMap::new(),
            default_latency,
            statuses: HashMap::new(),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
            issued: Mutex::new(Vec::new()),
        }
    }

    pub fn with_latencies_ms(mut self, latencies: &[u64]) -> Self {
        for (index, ms) in latencies.iter().enumerate() {
            self.latencies.insert(index, Duration::from_millis(*ms));
        }
        self
    }

    pub fn with_status(mut self, index: usize, status: u16) -> Self {
        self.statuses.insert(index, status);
        self
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    /// Submission indices in issuance order.
    pub fn issue_order(&self) -> Vec<usize> {
        self.issued.lock().unwrap().iter().map(|(i, _)| *i).collect()
    }

    /// Whole seconds since `start` at which each request was issued.
    pub fn issue_seconds(&self, start: Instant) -> Vec<u64> {
        self.issued
            .lock()
            .unwrap()
            .iter()
            .map(|(_, at)| at.duration_since(start).as_secs())
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn fetch(&self, url: &str, handle: RequestHandle) -> TransportResponse {
        let index = handle.index();
        self.issued.lock().unwrap().push((index, Instant::now()));
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now_active, Ordering::SeqCst);

        let latency = self
            .latencies
            .get(&index)
            .copied()
            .unwrap_or(self.default_latency);
        tokio::time::sleep(latency).await;

        self.active.fetch_sub(1, Ordering::SeqCst);
        let status = self.statuses.get(&index).copied().unwrap_or(200);
        let mut response = TransportResponse::new(url, status, format!("{{\"index\":{}}}", index));
        response.metadata.total_time = latency;
        response
    }
}

pub fn descriptors(n: usize) -> Vec<RequestDescriptor> {
    (0..n)
        .map(|i| RequestDescriptor::new(format!("https://api.test/wow/item/{}", i), i))
        .collect()
}
