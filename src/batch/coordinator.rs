//! Send-time pre-flight and hand-off to the dispatch pool.

use super::handler::CompletionHandler;
use super::pool::{DispatchPool, DispatchSettings};
use super::report::BatchReport;
use crate::config::ApiConfig;
use crate::request::RequestDescriptor;
use crate::transport::Transport;
use crate::{Error, Result};
use std::sync::Arc;
use tracing::warn;

/// Either a usable transport or the reason there is none.
pub type TransportSlot = std::result::Result<Arc<dyn Transport>, String>;

/// Validates a batch and runs it through a [`DispatchPool`].
///
/// Built from a configuration snapshot: later edits to the client's
/// configuration do not reach a coordinator that already exists.
pub struct BatchCoordinator {
    settings: DispatchSettings,
    has_credential: bool,
    transport: TransportSlot,
}

impl BatchCoordinator {
    pub fn new(config: &ApiConfig, transport: TransportSlot) -> Self {
        Self {
            settings: DispatchSettings::from_config(config),
            has_credential: config.has_credential(),
            transport,
        }
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    /// Checks, in order: transport, credential, non-empty batch.
    pub fn preflight(&self, pending: usize) -> Result<Arc<dyn Transport>> {
        let checked = self.check(pending);
        if let Err(e) = &checked {
            warn!(error = %e, pending, "batch rejected before dispatch");
        }
        checked
    }

    fn check(&self, pending: usize) -> Result<Arc<dyn Transport>> {
        let transport = self
            .transport
            .as_ref()
            .map_err(|reason| Error::transport_unavailable(reason.clone()))?;
        if !self.has_credential {
            return Err(Error::MissingCredential);
        }
        if pending == 0 {
            return Err(Error::EmptyBatch);
        }
        Ok(Arc::clone(transport))
    }

    /// Pre-flight, then run every request to completion.
    ///
    /// Nothing is issued when pre-flight fails.
    pub async fn send<H>(&self, requests: Vec<RequestDescriptor>, handler: &mut H) -> Result<BatchReport>
    where
        H: CompletionHandler + ?Sized,
    {
        let transport = self.preflight(requests.len())?;
        self.dispatch(transport, requests, handler).await
    }

    /// Run a batch whose pre-flight has already passed, using the transport
    /// [`BatchCoordinator::preflight`] returned.
    pub async fn dispatch<H>(
        &self,
        transport: Arc<dyn Transport>,
        requests: Vec<RequestDescriptor>,
        handler: &mut H,
    ) -> Result<BatchReport>
    where
        H: CompletionHandler + ?Sized,
    {
        DispatchPool::new(self.settings.clone(), transport)
            .run(requests, handler)
            .await
    }
}
