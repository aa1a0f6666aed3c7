//! JSON snapshot of the review session, kept in the profile directory.
//!
//! The snapshot is rewritten whole on every save through a uniquely named
//! temp file and a rename, so a crash mid-write leaves the previous snapshot
//! intact. Every read and write of one store (and its clones) is serialized
//! behind a shared lock.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use cardsmith_core::card::{Card, CardStatus, CardType};
use cardsmith_core::session::{retention_window, Session, SESSION_FORMAT_VERSION};
use cardsmith_core::store::{SessionStore, StoreError};
use cardsmith_core::types::Timestamp;
use chrono::{TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;
use uuid::Uuid;

/// File name of the snapshot inside a profile directory.
pub const SNAPSHOT_FILE_NAME: &str = "generation_session.json";

// ---------------------------------------------------------------------------
// On-disk format
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotFile {
    version: u32,
    created_at: Timestamp,
    source_name: String,
    #[serde(default)]
    source_text: String,
    cards: Vec<SnapshotCard>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotCard {
    id: String,
    #[serde(rename = "type")]
    card_type: CardType,
    front: String,
    #[serde(default)]
    back: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    status: CardStatus,
}

/// Only the version is read first, so a newer layout is recognised as such
/// rather than reported as corrupt.
#[derive(Debug, Deserialize)]
struct VersionProbe {
    version: u32,
}

impl From<&Session> for SnapshotFile {
    fn from(session: &Session) -> Self {
        Self {
            version: session.format_version,
            created_at: session.created_at,
            source_name: session.source_name.clone(),
            source_text: session.source_text.clone(),
            cards: session
                .cards
                .iter()
                .map(|card| SnapshotCard {
                    id: card.id().to_string(),
                    card_type: card.card_type,
                    front: card.front.clone(),
                    back: card.back.clone(),
                    tags: card.suggested_tags.clone(),
                    status: card.status,
                })
                .collect(),
        }
    }
}

impl From<SnapshotFile> for Session {
    fn from(file: SnapshotFile) -> Self {
        let cards = file
            .cards
            .into_iter()
            .map(|c| {
                Card::with_id(c.id, c.card_type, c.front, c.back)
                    .with_tags(c.tags)
                    .with_status(c.status)
            })
            .collect();
        let mut session = Session::created_at(file.source_name, file.source_text, cards, file.created_at);
        session.format_version = file.version;
        session
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// [`SessionStore`] backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct SessionFileStore {
    path: PathBuf,
    retention: TimeDelta,
    io_lock: Arc<Mutex<()>>,
}

impl SessionFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            retention: retention_window(),
            io_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Store the snapshot as [`SNAPSHOT_FILE_NAME`] inside `profile_dir`.
    pub fn in_profile(profile_dir: impl AsRef<Path>) -> Self {
        Self::new(profile_dir.as_ref().join(SNAPSHOT_FILE_NAME))
    }

    pub fn with_retention(mut self, retention: TimeDelta) -> Self {
        self.retention = retention;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the snapshot as it would be seen at `now`.
    pub async fn load_at(&self, now: Timestamp) -> Option<Session> {
        let _guard = self.io_lock.lock().await;
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read session snapshot");
                return None;
            }
        };

        let probe: VersionProbe = match serde_json::from_slice(&bytes) {
            Ok(probe) => probe,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Ignoring unreadable session snapshot");
                return None;
            }
        };

        if probe.version != SESSION_FORMAT_VERSION {
            tracing::info!(
                version = probe.version,
                expected = SESSION_FORMAT_VERSION,
                "Discarding session snapshot with unrecognised version"
            );
            self.remove_quietly().await;
            return None;
        }

        let file: SnapshotFile = match serde_json::from_slice(&bytes) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Ignoring corrupt session snapshot");
                return None;
            }
        };

        if now - file.created_at > self.retention {
            tracing::info!(created_at = %file.created_at, "Discarding expired session snapshot");
            self.remove_quietly().await;
            return None;
        }

        Some(file.into())
    }

    async fn remove_quietly(&self) {
        if let Err(e) = self.remove().await {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to delete session snapshot");
        }
    }

    /// Callers hold `io_lock`.
    async fn remove(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl SessionStore for SessionFileStore {
    async fn save(&self, session: &Session) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(&SnapshotFile::from(session))?;
        let _guard = self.io_lock.lock().await;
        atomic_write(&self.path, &bytes).await?;
        tracing::debug!(path = %self.path.display(), cards = session.cards.len(), "Session snapshot saved");
        Ok(())
    }

    async fn load(&self) -> Option<Session> {
        self.load_at(Utc::now()).await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.io_lock.lock().await;
        self.remove().await
    }
}

async fn atomic_write(path: &Path, bytes: &[u8]) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let tmp = path.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
    if let Err(e) = fs::write(&tmp, bytes).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e);
    }
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e);
    }
    Ok(())
}
