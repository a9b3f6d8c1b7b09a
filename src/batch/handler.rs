//! Completion handler plumbing.

use crate::transport::{RequestHandle, TransportMetadata};

/// One finished request, success or failure alike.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// URL as issued, including the locale and credential parameters.
    pub url: String,
    /// Raw response body; empty when no response arrived.
    pub body: String,
    pub metadata: TransportMetadata,
    pub handle: RequestHandle,
}

impl Completion {
    /// Submission index of the request.
    pub fn index(&self) -> usize {
        self.handle.index()
    }

    pub fn is_success(&self) -> bool {
        self.metadata.is_success()
    }
}

/// Caller-supplied callback, invoked once per request in completion order.
///
/// Runs on the dispatch loop itself: while it runs no other completion is
/// processed and no new request is issued. A handler that blocks stalls the
/// whole batch.
pub trait CompletionHandler {
    fn on_complete(&mut self, completion: &Completion);
}

impl<F> CompletionHandler for F
where
    F: FnMut(&Completion),
{
    fn on_complete(&mut self, completion: &Completion) {
        self(completion)
    }
}

/// Discards every completion.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHandler;

impl CompletionHandler for NoopHandler {
    fn on_complete(&mut self, _: &Completion) {}
}
