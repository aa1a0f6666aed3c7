//! The single result every generation request resolves to.

use cardsmith_core::card::Card;

/// Final outcome of one bridge invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Success(Vec<Card>),
    Failure(FailureReason),
}

/// Why a generation produced no cards.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FailureReason {
    /// The transport refused the request before starting work.
    #[error("{0}")]
    Rejected(String),

    /// The generator ran and reported an error (or produced nothing usable).
    #[error("{0}")]
    Provider(String),

    #[error("Generation timed out after {after_secs} seconds")]
    Timeout { after_secs: u64 },

    /// The adapter went away before the request resolved.
    #[error("Generation was abandoned before it completed")]
    Disconnected,
}

impl GenerationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}
