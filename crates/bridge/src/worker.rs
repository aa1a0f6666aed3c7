//! In-process transport that runs a [`CardGenerator`] on a tokio task.

use std::sync::Arc;

use async_trait::async_trait;

use crate::adapter::CompletionSink;
use crate::messages::{Ack, BridgeAction, BridgeRequest, CompletionEnvelope, GenerateRequest, WireCard};
use crate::transport::{Transport, TransportError};

/// Error reported by a generator, passed through to the user verbatim.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct GeneratorError(pub String);

/// Produces cards from source text.
#[async_trait]
pub trait CardGenerator: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<Vec<WireCard>, GeneratorError>;
}

/// Acknowledges immediately and delivers the generator's result through
/// the completion sink once it finishes.
pub struct WorkerTransport {
    generator: Arc<dyn CardGenerator>,
}

impl WorkerTransport {
    pub fn new(generator: Arc<dyn CardGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl Transport for WorkerTransport {
    async fn send(&self, request: BridgeRequest, sink: CompletionSink) -> Result<Ack, TransportError> {
        let BridgeAction::Generate(generate) = request.action;
        if generate.text.trim().is_empty() {
            return Ok(Ack::Rejected("No text provided".to_string()));
        }

        let request_id = request.request_id;
        let generator = Arc::clone(&self.generator);
        tokio::spawn(async move {
            let envelope = match generator.generate(&generate).await {
                Ok(cards) => {
                    tracing::debug!(%request_id, cards = cards.len(), "Generator finished");
                    CompletionEnvelope::cards(request_id, cards)
                }
                Err(e) => {
                    tracing::warn!(%request_id, error = %e, "Generator failed");
                    CompletionEnvelope::error(request_id, e.0)
                }
            };
            sink.deliver(envelope);
        });

        Ok(Ack::Started)
    }
}
