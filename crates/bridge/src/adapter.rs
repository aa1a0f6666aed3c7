//! Single-slot request/completion adapter.
//!
//! [`BridgeAdapter::invoke`] claims the pending slot, arms a timeout, and
//! hands the request to the transport. Whichever of the transport's
//! refusal, the completion, or the timeout reaches the slot first resolves
//! it; everything after that for the same request id is ignored.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::AbortHandle;
use uuid::Uuid;

use crate::messages::{Ack, BridgeAction, BridgeRequest, CompletionEnvelope};
use crate::outcome::{FailureReason, GenerationOutcome};
use crate::transport::Transport;

/// Time a request may stay unresolved before it fails with a timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub timeout: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The slot is still held by an unresolved request.
    #[error("A generation request is already in progress ({0})")]
    Busy(Uuid),
}

// ---------------------------------------------------------------------------
// Pending slot
// ---------------------------------------------------------------------------

struct PendingSlot {
    request_id: Uuid,
    tx: oneshot::Sender<GenerationOutcome>,
    timer: Option<AbortHandle>,
}

/// Shared handle onto the adapter's pending slot.
///
/// Cloned into transports and into the completion endpoint. The slot is
/// only ever touched under a short synchronous lock.
#[derive(Clone, Default)]
pub struct CompletionSink {
    slot: Arc<Mutex<Option<PendingSlot>>>,
}

impl CompletionSink {
    fn lock(&self) -> MutexGuard<'_, Option<PendingSlot>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn occupy(&self, request_id: Uuid, tx: oneshot::Sender<GenerationOutcome>) -> Result<(), BridgeError> {
        let mut slot = self.lock();
        if let Some(pending) = slot.as_ref() {
            return Err(BridgeError::Busy(pending.request_id));
        }
        *slot = Some(PendingSlot {
            request_id,
            tx,
            timer: None,
        });
        Ok(())
    }

    /// Attach the timeout task, or cancel it if the request already resolved.
    fn arm(&self, request_id: Uuid, timer: AbortHandle) {
        let mut slot = self.lock();
        match slot.as_mut() {
            Some(pending) if pending.request_id == request_id => pending.timer = Some(timer),
            _ => timer.abort(),
        }
    }

    /// Resolve `request_id` with `outcome`.
    ///
    /// Returns `false` when that request is not the one pending (already
    /// resolved, timed out, or never issued).
    pub fn resolve(&self, request_id: Uuid, outcome: GenerationOutcome) -> bool {
        let pending = {
            let mut slot = self.lock();
            match slot.as_ref() {
                Some(pending) if pending.request_id == request_id => slot.take(),
                _ => None,
            }
        };

        let Some(pending) = pending else {
            tracing::debug!(%request_id, "Ignoring resolution for request that is not pending");
            return false;
        };

        if let Some(timer) = pending.timer {
            timer.abort();
        }
        // The caller may have stopped waiting; the slot is freed either way.
        let _ = pending.tx.send(outcome);
        true
    }

    /// Resolve the pending request from a completion envelope.
    pub fn deliver(&self, envelope: CompletionEnvelope) -> bool {
        let request_id = envelope.request_id;
        self.resolve(request_id, envelope.into_outcome())
    }

    pub fn pending_request(&self) -> Option<Uuid> {
        self.lock().as_ref().map(|p| p.request_id)
    }
}

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

/// An issued request waiting for its outcome.
#[derive(Debug)]
pub struct PendingInvocation {
    pub request_id: Uuid,
    rx: oneshot::Receiver<GenerationOutcome>,
}

impl PendingInvocation {
    /// Wait for the request to resolve.
    pub async fn outcome(self) -> GenerationOutcome {
        self.rx
            .await
            .unwrap_or(GenerationOutcome::Failure(FailureReason::Disconnected))
    }
}

/// Drives one generation at a time through a [`Transport`].
#[derive(Clone)]
pub struct BridgeAdapter {
    transport: Arc<dyn Transport>,
    sink: CompletionSink,
    config: BridgeConfig,
}

impl BridgeAdapter {
    pub fn new(transport: Arc<dyn Transport>, config: BridgeConfig) -> Self {
        Self {
            transport,
            sink: CompletionSink::default(),
            config,
        }
    }

    /// Handle for delivering out-of-band completions.
    pub fn sink(&self) -> CompletionSink {
        self.sink.clone()
    }

    pub fn is_pending(&self) -> bool {
        self.sink.pending_request().is_some()
    }

    /// Issue `action` to the transport.
    ///
    /// Fails with [`BridgeError::Busy`] while another request is unresolved.
    /// Otherwise the returned invocation always resolves exactly once.
    pub async fn invoke(&self, action: BridgeAction) -> Result<PendingInvocation, BridgeError> {
        let request_id = Uuid::new_v4();
        let (tx, rx) = oneshot::channel();
        self.sink.occupy(request_id, tx)?;

        let timeout = self.config.timeout;
        let sink = self.sink.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            tracing::warn!(%request_id, timeout_secs = timeout.as_secs(), "Generation request timed out");
            sink.resolve(
                request_id,
                GenerationOutcome::Failure(FailureReason::Timeout {
                    after_secs: timeout.as_secs(),
                }),
            );
        });
        self.sink.arm(request_id, timer.abort_handle());

        let request = BridgeRequest { request_id, action };
        match self.transport.send(request, self.sink.clone()).await {
            Ok(Ack::Started) => {
                tracing::info!(%request_id, "Generation request acknowledged");
            }
            Ok(Ack::Rejected(reason)) => {
                tracing::info!(%request_id, %reason, "Generation request rejected");
                self.sink
                    .resolve(request_id, GenerationOutcome::Failure(FailureReason::Rejected(reason)));
            }
            Err(e) => {
                tracing::error!(%request_id, error = %e, "Failed to send generation request");
                self.sink
                    .resolve(request_id, GenerationOutcome::Failure(FailureReason::Provider(e.to_string())));
            }
        }

        Ok(PendingInvocation { request_id, rx })
    }

    /// Deliver an out-of-band completion. Returns `false` for a stale or
    /// unknown request id.
    pub fn complete(&self, envelope: CompletionEnvelope) -> bool {
        self.sink.deliver(envelope)
    }
}
