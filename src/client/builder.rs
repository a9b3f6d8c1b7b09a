use crate::batch::TransportSlot;
use crate::client::core::BattleNetClient;
use crate::config::{ApiConfig, Region};
use crate::registry::EndpointRegistry;
use crate::transport::Transport;
use crate::Result;
use std::sync::Arc;
use std::time::Duration;

/// Builder for [`BattleNetClient`].
///
/// Region and locale are validated together in [`ClientBuilder::build`], so
/// they may be set in either order.
pub struct ClientBuilder {
    config: ApiConfig,
    region: Option<Region>,
    locale: Option<String>,
    registry: Option<EndpointRegistry>,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::from_config(ApiConfig::default())
    }

    /// Start from an existing configuration.
    pub fn from_config(config: ApiConfig) -> Self {
        Self {
            config,
            region: None,
            locale: None,
            registry: None,
            transport: None,
        }
    }

    /// Start from defaults overlaid with `BATTLENET_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self::from_config(ApiConfig::from_env()?))
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Maximum number of requests in flight at once. Must be at least 1.
    pub fn max_connections(mut self, n: usize) -> Self {
        self.config.max_connections = n;
        self
    }

    /// Requests issued per second before pausing (0 disables).
    pub fn throttle_per_second(mut self, n: u32) -> Self {
        self.config.throttle_per_second = n;
        self
    }

    /// Requests issued per hour before pausing (0 disables).
    pub fn throttle_per_hour(mut self, n: u32) -> Self {
        self.config.throttle_per_hour = n;
        self
    }

    /// Per-request HTTP timeout for the default transport.
    ///
    /// Whole seconds; a fractional part rounds up. A zero timeout is
    /// rejected by [`ClientBuilder::build`].
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout_secs = timeout.as_secs() + u64::from(timeout.subsec_nanos() > 0);
        self
    }

    /// Override the region host.
    ///
    /// This is primarily for testing with mock servers.
    pub fn base_url_override(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = Some(base_url.into());
        self
    }

    /// Replace the default `reqwest` transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Replace the built-in endpoint registry.
    pub fn registry(mut self, registry: EndpointRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Build the client.
    ///
    /// A missing transport is not an error here; it surfaces as
    /// [`crate::Error::TransportUnavailable`] when a batch is sent.
    pub fn build(self) -> Result<BattleNetClient> {
        let mut config = self.config;
        if let Some(region) = self.region {
            config.set_region(region);
        }
        if let Some(locale) = self.locale {
            config.set_locale(&locale)?;
        }
        config.validate()?;

        let transport = match self.transport {
            Some(t) => Ok(t),
            None => default_transport(&config),
        };

        Ok(BattleNetClient::from_parts(
            config,
            Arc::new(self.registry.unwrap_or_default()),
            transport,
        ))
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "http")]
fn default_transport(config: &ApiConfig) -> TransportSlot {
    match crate::transport::HttpTransport::new(config.timeout()) {
        Ok(t) => Ok(Arc::new(t)),
        Err(e) => {
            tracing::warn!(error = %e, "failed to initialise HTTP transport");
            Err(e.to_string())
        }
    }
}

#[cfg(not(feature = "http"))]
fn default_transport(_: &ApiConfig) -> TransportSlot {
    Err("built without the `http` feature and no transport was supplied".to_string())
}
