//! Session persistence: the one piece of state that survives a page
//! reload or process restart.
//!
//! The stored record is a single JSON document replaced wholesale on every
//! write. Storage failures are never surfaced to callers — they are logged
//! and degrade to "no stored session", so the worst outcome of a broken
//! store is landing back on the home screen.

use serde::{Deserialize, Serialize};
#[cfg(feature = "native")]
use tracing::warn;

/// Key under which the session record is stored (also the default file
/// stem for the native store).
pub const STORAGE_KEY: &str = "parques_game_state";

/// The durable identity tuple enabling rejoin after a disconnect.
///
/// Written on every successful join, overwritten by each new join/create,
/// deleted on explicit leave and (after a grace delay) on game completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    pub game_id: String,
    pub player_name: String,
    pub player_id: String,
}

/// Abstraction over session storage so the controller stays
/// platform-agnostic.
///
/// The API is infallible by contract: implementations catch and log their
/// own failures, and `load` treats corrupted data as absent.
pub trait SessionStore {
    /// Persist the session, replacing any previous record.
    fn save(&self, session: &StoredSession);
    /// Load the previously saved session, if any.
    fn load(&self) -> Option<StoredSession>;
    /// Delete the saved session. A no-op when nothing is stored.
    fn clear(&self);
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Volatile store for tests and embedded use.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: std::sync::Mutex<Option<StoredSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed the store, as if a previous run had saved a session.
    pub fn with_session(session: StoredSession) -> Self {
        let store = Self::new();
        store.save(&session);
        store
    }
}

impl SessionStore for MemorySessionStore {
    fn save(&self, session: &StoredSession) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(session.clone());
        }
    }

    fn load(&self) -> Option<StoredSession> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }

    fn clear(&self) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
    }
}

// ---------------------------------------------------------------------------
// File-backed store (native)
// ---------------------------------------------------------------------------

/// Durable store writing the session as JSON to a single file.
#[cfg(feature = "native")]
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: std::path::PathBuf,
}

#[cfg(feature = "native")]
impl FileSessionStore {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under `<dir>/parques_game_state.json`.
    pub fn in_dir(dir: impl AsRef<std::path::Path>) -> Self {
        Self::new(dir.as_ref().join(format!("{STORAGE_KEY}.json")))
    }
}

#[cfg(feature = "native")]
impl SessionStore for FileSessionStore {
    fn save(&self, session: &StoredSession) {
        let json = match serde_json::to_string(session) {
            Ok(json) => json,
            Err(err) => {
                warn!(%err, "failed to serialize session");
                return;
            }
        };
        if let Err(err) = std::fs::write(&self.path, json) {
            warn!(%err, path = %self.path.display(), "failed to save session");
        }
    }

    fn load(&self) -> Option<StoredSession> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                warn!(%err, path = %self.path.display(), "failed to read session");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(err) => {
                // Corrupted record: treat as absent, not fatal.
                warn!(%err, path = %self.path.display(), "discarding corrupt session");
                None
            }
        }
    }

    fn clear(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => warn!(%err, path = %self.path.display(), "failed to clear session"),
        }
    }
}
