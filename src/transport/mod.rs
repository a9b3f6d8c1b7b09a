//! 传输层：单次请求的执行与元数据。
//!
//! Transport layer: issues a single GET and reports what happened.
//!
//! A transport never fails the batch. Timeouts, DNS errors and non-2xx
//! statuses are all folded into [`TransportMetadata`] and handed to the
//! completion handler like any other completion.

#[cfg(feature = "http")]
mod http;

#[cfg(feature = "http")]
pub use http::HttpTransport;

use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Correlates a completion with the request that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RequestHandle {
    id: Uuid,
    index: usize,
}

impl RequestHandle {
    pub fn new(index: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            index,
        }
    }

    /// Unique id, sent upstream as `x-request-id` by [`HttpTransport`].
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Submission index of the originating request.
    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for RequestHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} ({})", self.index, self.id)
    }
}

/// Facts about one finished request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransportMetadata {
    /// Final URL after redirects.
    pub url: String,
    /// HTTP status, absent when no response was received.
    pub status: Option<u16>,
    pub content_type: Option<String>,
    pub headers: BTreeMap<String, String>,
    #[serde(rename = "total_time_ms", serialize_with = "serialize_millis")]
    pub total_time: Duration,
    /// Transport-level failure (timeout, connect, body read).
    pub error: Option<String>,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

impl TransportMetadata {
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.status.is_some_and(|s| (200..300).contains(&s))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportResponse {
    pub body: String,
    pub metadata: TransportMetadata,
}

impl TransportResponse {
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            metadata: TransportMetadata {
                url: url.into(),
                status: Some(status),
                ..TransportMetadata::default()
            },
        }
    }

    /// A request that never produced a response.
    pub fn failed(url: impl Into<String>, error: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            body: String::new(),
            metadata: TransportMetadata {
                url: url.into(),
                total_time: elapsed,
                error: Some(error.into()),
                ..TransportMetadata::default()
            },
        }
    }
}

/// Issues one request. Implementations must not panic on remote failure.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, url: &str, handle: RequestHandle) -> TransportResponse;
}

/// Failure to set up the default transport.
#[cfg(feature = "http")]
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
