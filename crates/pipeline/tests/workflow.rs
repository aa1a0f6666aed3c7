//! Workflow controller scenarios: generate, review, import, resume.

mod common;

use assert_matches::assert_matches;
use cardsmith_bridge::{CompletionEnvelope, FailureReason, GenerationOutcome, WireCard};
use cardsmith_core::card::{Card, CardStatus, CardType};
use cardsmith_core::session::Session;
use cardsmith_pipeline::{ImportError, WorkflowError, WorkflowState};
use common::{harness, harness_with_sessions, Harness, MemorySessionStore};

const SOURCE_TEXT: &str = "Paris is the capital of France.";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn france_card() -> WireCard {
    WireCard::new(CardType::Basic, "What is the capital of France?", "Paris")
}

/// Drive the harness to `Review` with the given generated cards.
async fn review_with(h: &mut Harness, cards: Vec<WireCard>) {
    let pending = h
        .controller
        .begin_generation("chapter1.txt", SOURCE_TEXT)
        .await
        .unwrap();
    let request_id = pending.request_id;
    assert!(h.bridge.complete(CompletionEnvelope::cards(request_id, cards)));
    let outcome = pending.outcome().await;
    h.controller.finish_generation(request_id, outcome).unwrap();
    h.controller.flush_saves().await;
}

fn first_card_id(h: &Harness) -> String {
    h.controller.session().unwrap().cards[0].id().to_string()
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn generation_moves_source_to_review() {
    let mut h = harness();
    assert_eq!(h.controller.state(), WorkflowState::Source);

    let pending = h
        .controller
        .begin_generation("chapter1.txt", SOURCE_TEXT)
        .await
        .unwrap();
    assert_eq!(h.controller.state(), WorkflowState::Generating);
    assert_eq!(h.transport.sent_count(), 1);

    h.bridge
        .complete(CompletionEnvelope::cards(pending.request_id, vec![france_card()]));
    let request_id = pending.request_id;
    let outcome = pending.outcome().await;
    h.controller.finish_generation(request_id, outcome).unwrap();
    h.controller.flush_saves().await;

    assert_eq!(h.controller.state(), WorkflowState::Review);
    assert_eq!(h.controller.counts().pending, 1);

    let saved = h.sessions.current().expect("session persisted on creation");
    assert_eq!(saved.source_text, SOURCE_TEXT);
    assert_eq!(saved.cards.len(), 1);
}

#[tokio::test]
async fn generated_cards_start_pending() {
    let mut h = harness();
    let pending = h.controller.begin_generation("n", SOURCE_TEXT).await.unwrap();
    let request_id = pending.request_id;

    let approved = Card::new(CardType::Basic, "Q", "A").with_status(CardStatus::Approved);
    h.controller
        .finish_generation(request_id, GenerationOutcome::Success(vec![approved]))
        .unwrap();

    assert_eq!(h.controller.counts().pending, 1);
}

#[tokio::test]
async fn blank_source_is_rejected_without_transition() {
    let mut h = harness();

    assert_matches!(
        h.controller.begin_generation("empty", "  \n\t ").await,
        Err(WorkflowError::EmptySource)
    );
    assert_eq!(h.controller.state(), WorkflowState::Source);
    assert_eq!(h.transport.sent_count(), 0);
}

#[tokio::test]
async fn second_generation_while_generating_is_rejected() {
    let mut h = harness();
    let _pending = h.controller.begin_generation("a", SOURCE_TEXT).await.unwrap();

    assert_matches!(
        h.controller.begin_generation("b", "other text").await,
        Err(WorkflowError::GenerationInProgress)
    );
    assert_eq!(h.transport.sent_count(), 1);
    assert_eq!(h.controller.source_name(), "a");
}

#[tokio::test]
async fn generation_failure_returns_to_source_keeping_input() {
    let mut h = harness();
    let pending = h
        .controller
        .begin_generation("chapter1.txt", SOURCE_TEXT)
        .await
        .unwrap();
    h.bridge
        .complete(CompletionEnvelope::error(pending.request_id, "quota exceeded"));
    let request_id = pending.request_id;
    let outcome = pending.outcome().await;

    assert_matches!(
        h.controller.finish_generation(request_id, outcome),
        Err(WorkflowError::Generation(FailureReason::Provider(_)))
    );
    assert_eq!(h.controller.state(), WorkflowState::Source);
    assert_eq!(h.controller.source_name(), "chapter1.txt");
    assert_eq!(h.controller.source_text(), SOURCE_TEXT);
    assert!(h.controller.last_error().unwrap().contains("quota exceeded"));
}

#[tokio::test]
async fn empty_generation_is_a_failure() {
    let mut h = harness();
    let pending = h.controller.begin_generation("n", SOURCE_TEXT).await.unwrap();

    assert_matches!(
        h.controller
            .finish_generation(pending.request_id, GenerationOutcome::Success(Vec::new())),
        Err(WorkflowError::Generation(FailureReason::Provider(msg))) if msg == "No cards were generated"
    );
    assert_eq!(h.controller.state(), WorkflowState::Source);
}

#[tokio::test(start_paused = true)]
async fn timeout_returns_to_source_for_retry() {
    let mut h = harness();

    let result = h.controller.generate("chapter1.txt", SOURCE_TEXT).await;

    assert_matches!(
        result,
        Err(WorkflowError::Generation(FailureReason::Timeout { after_secs: 120 }))
    );
    assert_eq!(h.controller.state(), WorkflowState::Source);
    assert_eq!(h.controller.source_text(), SOURCE_TEXT);
    assert_eq!(h.controller.source_name(), "chapter1.txt");
    assert!(!h.bridge.is_pending());
}

#[tokio::test]
async fn outcome_after_reset_is_ignored() {
    let mut h = harness();
    let pending = h.controller.begin_generation("n", SOURCE_TEXT).await.unwrap();
    h.controller.reset();

    let outcome = GenerationOutcome::Success(vec![Card::new(CardType::Basic, "Q", "A")]);
    h.controller.finish_generation(pending.request_id, outcome).unwrap();

    assert_eq!(h.controller.state(), WorkflowState::Source);
    assert!(h.controller.session().is_none());
}

// ---------------------------------------------------------------------------
// Review
// ---------------------------------------------------------------------------

#[tokio::test]
async fn status_changes_are_saved_in_order() {
    let mut h = harness();
    review_with(&mut h, vec![france_card()]).await;
    let id = first_card_id(&h);

    h.controller.set_card_status(&id, CardStatus::Approved).unwrap();
    h.controller.set_card_status(&id, CardStatus::Rejected).unwrap();
    h.controller.set_card_status(&id, CardStatus::Pending).unwrap();
    h.controller.set_card_status(&id, CardStatus::Approved).unwrap();
    h.controller.flush_saves().await;

    let saved = h.sessions.current().unwrap();
    assert_eq!(saved.cards[0].status, CardStatus::Approved);
    assert_eq!(h.sessions.saves(), 5);
}

#[tokio::test]
async fn resave_keeps_created_at() {
    let mut h = harness();
    review_with(&mut h, vec![france_card()]).await;
    let created_at = h.sessions.current().unwrap().created_at;

    h.controller.set_all_statuses(CardStatus::Approved).unwrap();
    h.controller.flush_saves().await;

    assert_eq!(h.sessions.current().unwrap().created_at, created_at);
}

#[tokio::test]
async fn unknown_card_is_reported() {
    let mut h = harness();
    review_with(&mut h, vec![france_card()]).await;

    assert_matches!(
        h.controller.set_card_status("nope", CardStatus::Approved),
        Err(WorkflowError::CardNotFound(id)) if id == "nope"
    );
}

#[tokio::test]
async fn bulk_status_overrides_previous_decisions() {
    let mut h = harness();
    review_with(
        &mut h,
        vec![
            france_card(),
            WireCard::new(CardType::Basic, "Q2", "A2"),
            WireCard::new(CardType::Basic, "Q3", "A3"),
        ],
    )
    .await;
    let id = first_card_id(&h);
    h.controller.set_card_status(&id, CardStatus::Rejected).unwrap();

    h.controller.set_all_statuses(CardStatus::Approved).unwrap();
    assert_eq!(h.controller.counts().approved, 3);

    h.controller.set_all_statuses(CardStatus::Rejected).unwrap();
    assert_eq!(h.controller.counts().rejected, 3);
}

#[tokio::test]
async fn status_change_outside_review_is_invalid() {
    let mut h = harness();

    assert_matches!(
        h.controller.set_all_statuses(CardStatus::Approved),
        Err(WorkflowError::InvalidState { state: WorkflowState::Source, .. })
    );
}

#[tokio::test]
async fn save_failures_do_not_block_review() {
    let mut h = harness();
    review_with(&mut h, vec![france_card()]).await;
    *h.sessions.fail_saves.lock().unwrap() = true;
    let id = first_card_id(&h);

    h.controller.set_card_status(&id, CardStatus::Approved).unwrap();
    h.controller.flush_saves().await;

    assert_eq!(h.controller.counts().approved, 1);
    assert_eq!(h.sessions.current().unwrap().counts().approved, 0);
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

#[tokio::test]
async fn commit_without_approved_cards_is_refused() {
    let mut h = harness();
    review_with(&mut h, vec![france_card()]).await;

    assert_matches!(
        h.controller.commit(1, Vec::new()).await,
        Err(WorkflowError::NothingApproved)
    );
    assert_eq!(h.controller.state(), WorkflowState::Review);
    assert_eq!(h.notes.note_count(), 0);
}

#[tokio::test]
async fn approved_card_is_imported_and_snapshot_cleared() {
    let mut h = harness();
    review_with(&mut h, vec![france_card()]).await;
    let id = first_card_id(&h);
    h.controller.set_card_status(&id, CardStatus::Approved).unwrap();

    let result = h.controller.commit(1, Vec::new()).await.unwrap();

    assert_eq!(result.imported_count, 1);
    assert_eq!(result.duplicate_count, 0);
    assert!(result.errors.is_empty());
    assert_eq!(h.controller.state(), WorkflowState::Done);
    assert_eq!(h.controller.last_import(), Some(&result));
    assert!(h.sessions.current().is_none());
}

#[tokio::test]
async fn imported_notes_carry_provenance_tags() {
    let mut h = harness();
    review_with(&mut h, vec![france_card()]).await;
    h.controller.set_all_statuses(CardStatus::Approved).unwrap();

    h.controller.commit(1, vec!["chapter-1".into()]).await.unwrap();

    let notes = h.notes.notes.lock().unwrap();
    assert_eq!(
        notes[0].tags,
        vec!["ai-generated", "source::chapter1_txt", "chapter-1"]
    );
}

#[tokio::test]
async fn reimporting_same_card_counts_duplicate() {
    let mut h = harness();
    review_with(&mut h, vec![france_card()]).await;
    h.controller.set_all_statuses(CardStatus::Approved).unwrap();
    h.controller.commit(1, Vec::new()).await.unwrap();

    h.controller.reset();
    review_with(&mut h, vec![france_card()]).await;
    h.controller.set_all_statuses(CardStatus::Approved).unwrap();
    let result = h.controller.commit(1, Vec::new()).await.unwrap();

    assert_eq!(result.imported_count, 0);
    assert_eq!(result.duplicate_count, 1);
    assert_eq!(h.notes.note_count(), 1);
}

#[tokio::test]
async fn invalid_deck_returns_to_review_with_session_kept() {
    let mut h = harness();
    review_with(&mut h, vec![france_card()]).await;
    h.controller.set_all_statuses(CardStatus::Approved).unwrap();

    assert_matches!(
        h.controller.commit(99, Vec::new()).await,
        Err(WorkflowError::Import(ImportError::InvalidTarget(99)))
    );
    h.controller.flush_saves().await;

    assert_eq!(h.controller.state(), WorkflowState::Review);
    assert!(h.controller.last_error().is_some());
    assert_eq!(h.sessions.current().unwrap().counts().approved, 1);

    // Retry against a valid deck succeeds.
    let result = h.controller.commit(1, Vec::new()).await.unwrap();
    assert_eq!(result.imported_count, 1);
}

#[tokio::test]
async fn unreachable_store_returns_to_review() {
    let mut h = harness();
    review_with(&mut h, vec![france_card()]).await;
    h.controller.set_all_statuses(CardStatus::Approved).unwrap();
    h.notes.set_unavailable(true);

    assert_matches!(
        h.controller.commit(1, Vec::new()).await,
        Err(WorkflowError::Import(ImportError::StoreUnavailable(_)))
    );
    assert_eq!(h.controller.state(), WorkflowState::Review);
}

// ---------------------------------------------------------------------------
// Resume and reset
// ---------------------------------------------------------------------------

#[tokio::test]
async fn resume_without_snapshot_stays_in_source() {
    let mut h = harness();

    assert!(!h.controller.resume().await.unwrap());
    assert_eq!(h.controller.state(), WorkflowState::Source);
    assert!(h.controller.snapshot().cards.is_empty());
}

#[tokio::test]
async fn resume_restores_saved_session() {
    let session = Session::new(
        "chapter1.txt",
        SOURCE_TEXT,
        vec![Card::with_id("c1", CardType::Basic, "Q", "A").with_status(CardStatus::Approved)],
    );
    let mut h = harness_with_sessions(MemorySessionStore::with_session(session));

    assert!(h.controller.resume().await.unwrap());
    assert_eq!(h.controller.state(), WorkflowState::Review);
    assert_eq!(h.controller.source_text(), SOURCE_TEXT);
    assert_eq!(h.controller.counts().approved, 1);
}

#[tokio::test]
async fn reset_clears_everything() {
    let mut h = harness();
    review_with(&mut h, vec![france_card()]).await;

    h.controller.reset();
    h.controller.flush_saves().await;

    let snapshot = h.controller.snapshot();
    assert_eq!(snapshot.state, WorkflowState::Source);
    assert!(snapshot.source_text.is_empty());
    assert!(snapshot.cards.is_empty());
    assert!(h.sessions.current().is_none());
}
