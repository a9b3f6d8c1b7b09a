use super::{RequestHandle, Transport, TransportError, TransportMetadata, TransportResponse};
use async_trait::async_trait;
use reqwest::Proxy;
use std::collections::BTreeMap;
use std::env;
use std::time::{Duration, Instant};
use tracing::debug;

/// `reqwest`-backed transport. One client is shared by every request of a
/// batch, so connections are reused across slots.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("battlenet-api/", env!("CARGO_PKG_VERSION")))
            .pool_max_idle_per_host(
                env::var("BATTLENET_HTTP_POOL_MAX_IDLE_PER_HOST")
                    .ok()
                    .and_then(|s| s.parse::<usize>().ok())
                    .unwrap_or(32),
            )
            .pool_idle_timeout(Some(Duration::from_secs(90)));

        if let Ok(proxy_url) = env::var("BATTLENET_PROXY_URL") {
            if let Ok(proxy) = Proxy::all(&proxy_url) {
                builder = builder.proxy(proxy);
            }
        }

        let client = builder.build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &str, handle: RequestHandle) -> TransportResponse {
        let start = Instant::now();
        let resp = match self
            .client
            .get(url)
            .header("x-request-id", handle.id().to_string())
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                debug!(index = handle.index(), error = %e, "request failed before response");
                return TransportResponse::failed(url, e.to_string(), start.elapsed());
            }
        };

        let status = resp.status().as_u16();
        let final_url = resp.url().to_string();
        let headers: BTreeMap<String, String> = resp
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let content_type = headers.get("content-type").cloned();

        let (body, error) = match resp.text().await {
            Ok(body) => (body, None),
            Err(e) => (String::new(), Some(e.to_string())),
        };

        TransportResponse {
            body,
            metadata: TransportMetadata {
                url: final_url,
                status: Some(status),
                content_type,
                headers,
                total_time: start.elapsed(),
                error,
            },
        }
    }
}
