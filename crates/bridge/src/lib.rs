//! Bridge to the out-of-process card generator.
//!
//! A generation request is handed to a [`Transport`], which acknowledges
//! synchronously and delivers the result later through the shared
//! [`CompletionSink`]. [`BridgeAdapter`] keeps a single pending slot and
//! guarantees each request resolves exactly once: by completion, by an
//! immediate failure, or by timeout.

pub mod adapter;
pub mod http;
pub mod messages;
pub mod outcome;
pub mod transport;
pub mod worker;

pub use adapter::{BridgeAdapter, BridgeConfig, BridgeError, CompletionSink, PendingInvocation};
pub use http::HttpTransport;
pub use messages::{
    Ack, BridgeAction, BridgeRequest, CompletionEnvelope, CompletionResult, GenerateRequest,
    GenerationConstraints, MessageError, WireCard,
};
pub use outcome::{FailureReason, GenerationOutcome};
pub use transport::{Transport, TransportError};
pub use worker::{CardGenerator, GeneratorError, WorkerTransport};
