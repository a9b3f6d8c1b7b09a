use crate::batch::{BatchCoordinator, BatchReport, CompletionHandler, TransportSlot};
use crate::client::builder::ClientBuilder;
use crate::config::{ApiConfig, Region};
use crate::registry::{EndpointRegistry, Params};
use crate::request::RequestDescriptor;
use crate::Result;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Queues API requests and sends them as one throttled, concurrent batch.
///
/// Endpoint URLs are built against the region host when a request is added.
/// Locale and API key are appended when each request is issued, using the
/// configuration as it stands when [`BattleNetClient::send`] is called.
pub struct BattleNetClient {
    config: ApiConfig,
    registry: Arc<EndpointRegistry>,
    transport: TransportSlot,
    requests: Vec<RequestDescriptor>,
}

impl BattleNetClient {
    /// Client with default settings and the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        ClientBuilder::new().api_key(api_key).build()
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub(crate) fn from_parts(
        config: ApiConfig,
        registry: Arc<EndpointRegistry>,
        transport: TransportSlot,
    ) -> Self {
        Self {
            config,
            registry,
            transport,
            requests: Vec::new(),
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    pub fn set_api_key(&mut self, key: impl Into<String>) {
        self.config.api_key = Some(key.into());
    }

    /// Affects requests added afterwards; queued URLs keep their host.
    pub fn set_region(&mut self, region: Region) {
        self.config.set_region(region);
    }

    pub fn set_locale(&mut self, locale: &str) -> Result<()> {
        self.config.set_locale(locale)
    }

    /// Resolve `service`/`endpoint` and queue the request. Returns its index.
    pub fn add_request(&mut self, service: &str, endpoint: &str, params: Params) -> Result<usize> {
        let path = self.registry.resolve(service, endpoint, &params)?.path();
        Ok(self.add_url(format!("{}{}", self.config.host(), path)))
    }

    /// Queue an already-built URL. Returns its index.
    pub fn add_url(&mut self, url: impl Into<String>) -> usize {
        let index = self.requests.len();
        let descriptor = RequestDescriptor::new(url, index);
        debug!(index, url = descriptor.url(), "request queued");
        self.requests.push(descriptor);
        index
    }

    pub fn pending(&self) -> &[RequestDescriptor] {
        &self.requests
    }

    pub fn clear(&mut self) {
        self.requests.clear();
    }

    /// Send every queued request, calling `handler` once per completion.
    ///
    /// On a pre-flight failure nothing is issued and the queue is kept. On
    /// success the queue is handed to the dispatcher and left empty.
    pub async fn send<H>(&mut self, mut handler: H) -> Result<BatchReport>
    where
        H: CompletionHandler,
    {
        let coordinator = BatchCoordinator::new(&self.config, self.transport.clone());
        let transport = coordinator.preflight(self.requests.len())?;
        let requests = std::mem::take(&mut self.requests);
        coordinator.dispatch(transport, requests, &mut handler).await
    }
}

impl fmt::Debug for BattleNetClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BattleNetClient")
            .field("config", &self.config)
            .field("endpoints", &self.registry.keys())
            .field("transport_ready", &self.transport.is_ok())
            .field("pending", &self.requests.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::Completion;
    use crate::transport::{RequestHandle, Transport, TransportResponse};
    use crate::Error;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingTransport {
        urls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn fetch(&self, url: &str, _handle: RequestHandle) -> TransportResponse {
            self.urls.lock().unwrap().push(url.to_string());
            TransportResponse::new(url, 200, "{}")
        }
    }

    #[test]
    fn test_add_request_builds_host_url() {
        let mut client = BattleNetClient::new("KEY").unwrap();
        let index = client
            .add_request("wow", "item", Params::new().with("itemId", 19019))
            .unwrap();
        assert_eq!(index, 0);
        assert_eq!(
            client.pending()[0].url(),
            "https://us.api.battle.net/wow/item/19019"
        );
    }

    #[test]
    fn test_add_request_uses_current_region() {
        let mut client = BattleNetClient::new("KEY").unwrap();
        client.set_region(Region::Europe);
        client.add_request("wow", "mount", Params::new()).unwrap();
        assert_eq!(client.pending()[0].url(), "https://eu.api.battle.net/wow/mount/");
        assert_eq!(client.config().locale, "en_GB");
    }

    #[test]
    fn test_unresolvable_request_not_queued() {
        let mut client = BattleNetClient::new("KEY").unwrap();
        assert!(matches!(
            client.add_request("sc2", "ladder", Params::new()),
            Err(Error::EndpointResolution { .. })
        ));
        assert!(matches!(
            client.add_request("wow", "item", Params::new()),
            Err(Error::MissingParameter { .. })
        ));
        assert!(client.pending().is_empty());
    }

    #[test]
    fn test_indices_follow_submission_order() {
        let mut client = BattleNetClient::new("KEY").unwrap();
        assert_eq!(client.add_url("https://example.test/a"), 0);
        assert_eq!(client.add_url("https://example.test/b"), 1);
        client.clear();
        assert!(client.pending().is_empty());
    }

    #[cfg(feature = "http")]
    #[tokio::test]
    async fn test_preflight_failure_keeps_queue() {
        let mut client = BattleNetClient::builder().build().unwrap();
        client.add_url("https://example.test/a");
        let err = client.send(|_: &Completion| {}).await.unwrap_err();
        assert!(matches!(err, Error::MissingCredential));
        assert_eq!(client.pending().len(), 1);
    }

    #[tokio::test]
    async fn test_locale_and_key_read_at_send_time() {
        let transport = Arc::new(RecordingTransport::default());
        let mut client = BattleNetClient::builder()
            .api_key("OLD")
            .transport(transport.clone())
            .build()
            .unwrap();
        client.add_request("wow", "mount", Params::new()).unwrap();

        client.set_api_key("NEW");
        client.set_locale("es_MX").unwrap();
        client.send(|_: &Completion| {}).await.unwrap();

        let urls = transport.urls.lock().unwrap();
        assert_eq!(urls.len(), 1);
        assert!(urls[0].ends_with("/wow/mount/?locale=es_MX&apikey=NEW"));
    }

    #[test]
    fn test_debug_hides_key() {
        let mut client = BattleNetClient::new("SECRET").unwrap();
        client.add_url("https://example.test/a");
        let rendered = format!("{:?}", client);
        assert!(!rendered.contains("SECRET"));
        assert!(rendered.contains("pending: 1"));
        assert!(rendered.contains("wow/item"));
    }
}
