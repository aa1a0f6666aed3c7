//! The seam between the adapter and whatever runs the generation.

use async_trait::async_trait;

use crate::adapter::CompletionSink;
use crate::messages::{Ack, BridgeRequest, MessageError};

/// Errors raised while handing a request to the worker.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Generation worker unreachable: {0}")]
    Unreachable(String),

    #[error("Generation worker returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error(transparent)]
    Message(#[from] MessageError),
}

/// Hands requests to a generation worker.
///
/// `send` returns once the worker has acknowledged (or refused) the
/// request. After [`Ack::Started`] the result must eventually be pushed
/// into `sink`, either by the transport itself or by whoever receives the
/// worker's out-of-band completion.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: BridgeRequest, sink: CompletionSink) -> Result<Ack, TransportError>;
}
