//! The workflow state machine.
//!
//! ```text
//! Source ──generate──▶ Generating ──success──▶ Review ──commit──▶ Importing ──▶ Done
//!   ▲                      │ failure/timeout     ▲                    │ batch-fatal
//!   └──────────────────────┘                     └────────────────────┘
//! ```
//!
//! `reset` returns to `Source` from anywhere and discards the session.
//! Every mutation of the session in `Review` queues a snapshot through the
//! [`AutoSaver`]; the in-memory session stays authoritative.

use std::fmt;
use std::sync::Arc;

use cardsmith_bridge::messages::NO_CARDS_MESSAGE;
use cardsmith_bridge::{
    BridgeAction, BridgeAdapter, BridgeError, FailureReason, GenerateRequest, GenerationConstraints,
    GenerationOutcome, PendingInvocation,
};
use cardsmith_core::card::{Card, CardStatus, StatusCounts};
use cardsmith_core::import::{ImportRequest, ImportResult};
use cardsmith_core::note::source_tag;
use cardsmith_core::session::Session;
use cardsmith_core::store::SessionStore;
use cardsmith_core::types::DeckId;
use serde::Serialize;
use uuid::Uuid;

use crate::autosave::AutoSaver;
use crate::import::{ImportCoordinator, ImportError};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    Source,
    Generating,
    Review,
    Importing,
    Done,
}

impl WorkflowState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Generating => "generating",
            Self::Review => "review",
            Self::Importing => "importing",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("Source text is empty")]
    EmptySource,

    #[error("A generation is already in progress")]
    GenerationInProgress,

    #[error("Cannot {action} while {state}")]
    InvalidState {
        action: &'static str,
        state: WorkflowState,
    },

    #[error("Card not found: {0}")]
    CardNotFound(String),

    #[error("No cards are approved for import")]
    NothingApproved,

    #[error("Generation failed: {0}")]
    Generation(FailureReason),

    #[error("Import failed: {0}")]
    Import(#[from] ImportError),
}

/// Read-only view of the controller for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSnapshot {
    pub state: WorkflowState,
    pub source_name: String,
    pub source_text: String,
    pub cards: Vec<Card>,
    pub counts: StatusCounts,
    pub error: Option<String>,
    pub last_import: Option<ImportResult>,
    pub pending_request: Option<Uuid>,
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Single owner of the live session.
pub struct WorkflowController {
    state: WorkflowState,
    source_name: String,
    source_text: String,
    session: Option<Session>,
    pending_request: Option<Uuid>,
    last_error: Option<String>,
    last_import: Option<ImportResult>,
    constraints: GenerationConstraints,
    bridge: BridgeAdapter,
    importer: Arc<ImportCoordinator>,
    sessions: Arc<dyn SessionStore>,
    saver: AutoSaver,
}

impl WorkflowController {
    /// Create a controller in `Source`. Spawns the snapshot writer, so this
    /// must run inside a tokio runtime.
    pub fn new(
        bridge: BridgeAdapter,
        importer: Arc<ImportCoordinator>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        let saver = AutoSaver::spawn(Arc::clone(&sessions));
        Self {
            state: WorkflowState::Source,
            source_name: String::new(),
            source_text: String::new(),
            session: None,
            pending_request: None,
            last_error: None,
            last_import: None,
            constraints: GenerationConstraints::default(),
            bridge,
            importer,
            sessions,
            saver,
        }
    }

    pub fn with_constraints(mut self, constraints: GenerationConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn last_import(&self) -> Option<&ImportResult> {
        self.last_import.as_ref()
    }

    pub fn counts(&self) -> StatusCounts {
        self.session.as_ref().map(Session::counts).unwrap_or_default()
    }

    pub fn snapshot(&self) -> WorkflowSnapshot {
        WorkflowSnapshot {
            state: self.state,
            source_name: self.source_name.clone(),
            source_text: self.source_text.clone(),
            cards: self.session.as_ref().map(|s| s.cards.clone()).unwrap_or_default(),
            counts: self.counts(),
            error: self.last_error.clone(),
            last_import: self.last_import.clone(),
            pending_request: self.pending_request,
        }
    }

    /// Wait for every queued snapshot write to land.
    pub async fn flush_saves(&self) {
        self.saver.flush().await;
    }

    // -- Resume ------------------------------------------------------------

    /// Load a persisted session into `Review`.
    ///
    /// Returns `false` when there is nothing to resume. Only valid in
    /// `Source`.
    pub async fn resume(&mut self) -> Result<bool, WorkflowError> {
        self.require(WorkflowState::Source, "resume a session")?;
        self.saver.flush().await;

        let Some(session) = self.sessions.load().await else {
            return Ok(false);
        };
        if session.cards.is_empty() {
            return Ok(false);
        }

        tracing::info!(
            source = %session.source_name,
            cards = session.cards.len(),
            "Resuming saved session",
        );
        self.source_name = session.source_name.clone();
        self.source_text = session.source_text.clone();
        self.session = Some(session);
        self.last_error = None;
        self.state = WorkflowState::Review;
        Ok(true)
    }

    // -- Generation --------------------------------------------------------

    /// `Source → Generating`: submit the source text to the bridge.
    ///
    /// The returned invocation must be awaited and its outcome handed to
    /// [`finish_generation`](Self::finish_generation).
    pub async fn begin_generation(
        &mut self,
        source_name: impl Into<String>,
        source_text: impl Into<String>,
    ) -> Result<PendingInvocation, WorkflowError> {
        match self.state {
            WorkflowState::Source => {}
            WorkflowState::Generating => return Err(WorkflowError::GenerationInProgress),
            state => {
                return Err(WorkflowError::InvalidState {
                    action: "start a generation",
                    state,
                })
            }
        }

        let source_name = source_name.into();
        let source_text = source_text.into();
        if source_text.trim().is_empty() {
            return Err(WorkflowError::EmptySource);
        }

        let action = BridgeAction::Generate(GenerateRequest {
            text: source_text.clone(),
            source_name: source_name.clone(),
            constraints: self.constraints.clone(),
        });
        let pending = self.bridge.invoke(action).await.map_err(|e| match e {
            BridgeError::Busy(request_id) => {
                tracing::warn!(%request_id, "Bridge still holds an unresolved request");
                WorkflowError::GenerationInProgress
            }
        })?;

        tracing::info!(request_id = %pending.request_id, source = %source_name, "Generation started");
        self.source_name = source_name;
        self.source_text = source_text;
        self.pending_request = Some(pending.request_id);
        self.last_error = None;
        self.state = WorkflowState::Generating;
        Ok(pending)
    }

    /// `Generating → Review | Source`: apply the outcome of `request_id`.
    ///
    /// An outcome for a request that is no longer current (the workflow was
    /// reset meanwhile) is ignored. On failure the source input is kept so
    /// the user can retry.
    pub fn finish_generation(
        &mut self,
        request_id: Uuid,
        outcome: GenerationOutcome,
    ) -> Result<(), WorkflowError> {
        if self.state != WorkflowState::Generating || self.pending_request != Some(request_id) {
            tracing::debug!(%request_id, state = %self.state, "Ignoring stale generation outcome");
            return Ok(());
        }
        self.pending_request = None;

        let outcome = match outcome {
            GenerationOutcome::Success(cards) if cards.is_empty() => GenerationOutcome::Failure(
                FailureReason::Provider(NO_CARDS_MESSAGE.to_string()),
            ),
            other => other,
        };

        match outcome {
            GenerationOutcome::Success(cards) => {
                let cards: Vec<Card> = cards
                    .into_iter()
                    .map(|card| card.with_status(CardStatus::Pending))
                    .collect();
                tracing::info!(%request_id, cards = cards.len(), "Generation succeeded");

                let session = Session::new(self.source_name.clone(), self.source_text.clone(), cards);
                self.saver.save(&session);
                self.session = Some(session);
                self.state = WorkflowState::Review;
                Ok(())
            }
            GenerationOutcome::Failure(reason) => {
                tracing::warn!(%request_id, %reason, "Generation failed");
                let err = WorkflowError::Generation(reason);
                self.last_error = Some(err.to_string());
                self.state = WorkflowState::Source;
                Err(err)
            }
        }
    }

    /// Run a whole generation: submit, wait for the outcome, apply it.
    pub async fn generate(
        &mut self,
        source_name: impl Into<String>,
        source_text: impl Into<String>,
    ) -> Result<(), WorkflowError> {
        let pending = self.begin_generation(source_name, source_text).await?;
        let request_id = pending.request_id;
        let outcome = pending.outcome().await;
        self.finish_generation(request_id, outcome)
    }

    // -- Review ------------------------------------------------------------

    pub fn set_card_status(&mut self, card_id: &str, status: CardStatus) -> Result<(), WorkflowError> {
        let session = review_session(self.state, &mut self.session, "change a card's status")?;
        if !session.set_status(card_id, status) {
            return Err(WorkflowError::CardNotFound(card_id.to_string()));
        }
        self.saver.save(session);
        Ok(())
    }

    /// Set every card to `status`, including cards already decided.
    pub fn set_all_statuses(&mut self, status: CardStatus) -> Result<(), WorkflowError> {
        let session = review_session(self.state, &mut self.session, "change card statuses")?;
        session.set_all_statuses(status);
        self.saver.save(session);
        Ok(())
    }

    // -- Import ------------------------------------------------------------

    /// `Review → Importing → Done | Review`: import the approved cards.
    ///
    /// Refused without any transition when nothing is approved. The notes
    /// are tagged with the source's provenance tag ahead of `extra_tags`.
    pub async fn commit(
        &mut self,
        deck_id: DeckId,
        extra_tags: Vec<String>,
    ) -> Result<ImportResult, WorkflowError> {
        let session = match (&self.state, &self.session) {
            (WorkflowState::Review, Some(session)) => session,
            (state, _) => {
                return Err(WorkflowError::InvalidState {
                    action: "import",
                    state: *state,
                })
            }
        };

        let approved = session.approved_cards();
        if approved.is_empty() {
            return Err(WorkflowError::NothingApproved);
        }

        let mut additional_tags: Vec<String> = source_tag(&session.source_name).into_iter().collect();
        additional_tags.extend(extra_tags);
        let request = ImportRequest {
            cards: approved,
            target_deck_id: deck_id,
            additional_tags,
        };

        self.state = WorkflowState::Importing;
        match self.importer.import_approved(&request).await {
            Ok(result) => {
                tracing::info!(deck_id, summary = %result.summary(), "Session imported");
                self.saver.clear();
                self.saver.flush().await;
                self.last_import = Some(result.clone());
                self.last_error = None;
                self.state = WorkflowState::Done;
                Ok(result)
            }
            Err(e) => {
                tracing::warn!(deck_id, error = %e, "Import failed; returning to review");
                if let Some(session) = &self.session {
                    self.saver.save(session);
                }
                let err = WorkflowError::Import(e);
                self.last_error = Some(err.to_string());
                self.state = WorkflowState::Review;
                Err(err)
            }
        }
    }

    // -- Reset -------------------------------------------------------------

    /// Back to `Source` with every field cleared and the snapshot deleted.
    ///
    /// An outstanding generation is left to resolve on its own; its outcome
    /// is then ignored.
    pub fn reset(&mut self) {
        tracing::info!(from = %self.state, "Starting a new session");
        self.state = WorkflowState::Source;
        self.source_name.clear();
        self.source_text.clear();
        self.session = None;
        self.pending_request = None;
        self.last_error = None;
        self.last_import = None;
        self.saver.clear();
    }

    // -- Helpers -----------------------------------------------------------

    fn require(&self, expected: WorkflowState, action: &'static str) -> Result<(), WorkflowError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(WorkflowError::InvalidState {
                action,
                state: self.state,
            })
        }
    }
}

/// The session, if the workflow is in `Review`.
///
/// Takes the fields separately so the caller can still reach the saver.
fn review_session<'a>(
    state: WorkflowState,
    session: &'a mut Option<Session>,
    action: &'static str,
) -> Result<&'a mut Session, WorkflowError> {
    match (state, session.as_mut()) {
        (WorkflowState::Review, Some(session)) => Ok(session),
        (state, _) => Err(WorkflowError::InvalidState { action, state }),
    }
}
