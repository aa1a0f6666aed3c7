//! Test doubles for the workflow's collaborators.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cardsmith_bridge::{
    Ack, BridgeAdapter, BridgeConfig, BridgeRequest, CompletionSink, Transport, TransportError,
};
use cardsmith_core::note::NativeNote;
use cardsmith_core::session::Session;
use cardsmith_core::store::{AddOutcome, NoteStore, SessionStore, StoreError};
use cardsmith_core::types::DeckId;
use cardsmith_pipeline::{ImportCoordinator, WorkflowController};

// ---------------------------------------------------------------------------
// Note store
// ---------------------------------------------------------------------------

/// In-memory collection with the same duplicate rule as the real one.
pub struct MemoryNoteStore {
    decks: HashSet<DeckId>,
    pub notes: Mutex<Vec<NativeNote>>,
    pub unavailable: Mutex<bool>,
    /// First fields the store refuses.
    pub refuse: Mutex<Vec<String>>,
}

impl MemoryNoteStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            decks: HashSet::from([1]),
            notes: Mutex::new(Vec::new()),
            unavailable: Mutex::new(false),
            refuse: Mutex::new(Vec::new()),
        })
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock().unwrap() = unavailable;
    }

    pub fn note_count(&self) -> usize {
        self.notes.lock().unwrap().len()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if *self.unavailable.lock().unwrap() {
            Err(StoreError::Unavailable("collection closed".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl NoteStore for MemoryNoteStore {
    async fn deck_exists(&self, deck_id: DeckId) -> Result<bool, StoreError> {
        self.check_available()?;
        Ok(self.decks.contains(&deck_id))
    }

    async fn add_note(&self, note: &NativeNote) -> Result<AddOutcome, StoreError> {
        self.check_available()?;
        if self.refuse.lock().unwrap().iter().any(|f| f == note.first_field()) {
            return Err(StoreError::Rejected("constraint violation".into()));
        }

        let mut notes = self.notes.lock().unwrap();
        let duplicate = notes
            .iter()
            .any(|n| n.notetype == note.notetype && n.sort_field() == note.sort_field());
        if duplicate {
            return Ok(AddOutcome::Duplicate);
        }
        notes.push(note.clone());
        Ok(AddOutcome::Added)
    }
}

// ---------------------------------------------------------------------------
// Session store
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemorySessionStore {
    pub saved: Mutex<Option<Session>>,
    pub save_count: Mutex<usize>,
    pub fail_saves: Mutex<bool>,
}

impl MemorySessionStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_session(session: Session) -> Arc<Self> {
        let store = Self::default();
        *store.saved.lock().unwrap() = Some(session);
        Arc::new(store)
    }

    pub fn current(&self) -> Option<Session> {
        self.saved.lock().unwrap().clone()
    }

    pub fn saves(&self) -> usize {
        *self.save_count.lock().unwrap()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save(&self, session: &Session) -> Result<(), StoreError> {
        if *self.fail_saves.lock().unwrap() {
            return Err(StoreError::Unavailable("disk full".into()));
        }
        *self.saved.lock().unwrap() = Some(session.clone());
        *self.save_count.lock().unwrap() += 1;
        Ok(())
    }

    async fn load(&self) -> Option<Session> {
        self.current()
    }

    async fn clear(&self) -> Result<(), StoreError> {
        *self.saved.lock().unwrap() = None;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Acknowledges every request and keeps it so the test can complete it.
#[derive(Default)]
pub struct ManualTransport {
    pub sent: Mutex<Vec<BridgeRequest>>,
}

impl ManualTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ManualTransport {
    async fn send(&self, request: BridgeRequest, _sink: CompletionSink) -> Result<Ack, TransportError> {
        self.sent.lock().unwrap().push(request);
        Ok(Ack::Started)
    }
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

pub struct Harness {
    pub controller: WorkflowController,
    pub bridge: BridgeAdapter,
    pub transport: Arc<ManualTransport>,
    pub notes: Arc<MemoryNoteStore>,
    pub sessions: Arc<MemorySessionStore>,
}

pub fn harness() -> Harness {
    harness_with_sessions(MemorySessionStore::new())
}

pub fn harness_with_sessions(sessions: Arc<MemorySessionStore>) -> Harness {
    let transport = ManualTransport::new();
    let bridge = BridgeAdapter::new(transport.clone(), BridgeConfig::default());
    let notes = MemoryNoteStore::new();
    let importer = Arc::new(ImportCoordinator::new(notes.clone()));
    let controller = WorkflowController::new(bridge.clone(), importer, sessions.clone());

    Harness {
        controller,
        bridge,
        transport,
        notes,
        sessions,
    }
}
