//! The session store trait and its in-memory implementation.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use parley_core::types::{Message, SessionId};

use crate::error::SessionError;

// =============================================================================
// Session
// =============================================================================

/// A server-tracked conversation: an identifier plus its ordered history.
///
/// Insertion order is conversation order. Messages are never reordered or
/// mutated after append.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    /// Unix timestamp of session creation.
    pub created_at: i64,
    /// Unix timestamp of the most recent append.
    pub last_message_at: i64,
    pub messages: Vec<Message>,
}

impl Session {
    fn new(id: SessionId) -> Self {
        let now = Utc::now().timestamp();
        Self {
            id,
            created_at: now,
            last_message_at: now,
            messages: Vec::new(),
        }
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }
}

// =============================================================================
// SessionStore
// =============================================================================

/// Keyed storage of conversation sessions.
///
/// The handlers only ever talk to this trait, so a bounded LRU store or an
/// external persistence layer can replace `MemoryStore` without touching them.
pub trait SessionStore: Send + Sync {
    /// Look up a session, allocating a fresh one when `id` is absent or
    /// unknown. Returns the (possibly new) identifier and whether it was
    /// freshly created.
    fn get_or_create(&self, id: Option<&str>) -> (SessionId, bool);

    /// Append a message to a session's history, returning the new message
    /// count. Fails with `NotFound` for an unknown identifier.
    fn append(&self, id: &SessionId, message: Message) -> Result<usize, SessionError>;

    /// The full ordered history of a session. Fails with `NotFound` for an
    /// unknown identifier.
    fn history(&self, id: &SessionId) -> Result<Vec<Message>, SessionError>;
}

// =============================================================================
// MemoryStore
// =============================================================================

/// In-memory session store with process lifetime.
///
/// The mutex makes each operation atomic; individual appends from concurrent
/// requests on the same session cannot interleave mid-write. No eviction.
#[derive(Default)]
pub struct MemoryStore {
    sessions: Mutex<HashMap<String, Session>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live sessions. Exposed for diagnostics.
    pub fn len(&self) -> usize {
        self.sessions.lock().expect("session store poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for MemoryStore {
    fn get_or_create(&self, id: Option<&str>) -> (SessionId, bool) {
        let mut sessions = self.sessions.lock().expect("session store poisoned");

        if let Some(id) = id {
            if sessions.contains_key(id) {
                return (SessionId::from(id), false);
            }
        }

        let fresh = SessionId::generate();
        debug!(session_id = %fresh, "New session created");
        sessions.insert(fresh.0.clone(), Session::new(fresh.clone()));
        (fresh, true)
    }

    fn append(&self, id: &SessionId, message: Message) -> Result<usize, SessionError> {
        let mut sessions = self.sessions.lock().expect("session store poisoned");
        let session = sessions
            .get_mut(id.as_str())
            .ok_or_else(|| SessionError::NotFound(id.clone()))?;

        session.messages.push(message);
        session.last_message_at = Utc::now().timestamp();
        Ok(session.messages.len())
    }

    fn history(&self, id: &SessionId) -> Result<Vec<Message>, SessionError> {
        let sessions = self.sessions.lock().expect("session store poisoned");
        sessions
            .get(id.as_str())
            .map(|s| s.messages.clone())
            .ok_or_else(|| SessionError::NotFound(id.clone()))
    }
}

// =============================================================================
// Tests
// =============================================================================
