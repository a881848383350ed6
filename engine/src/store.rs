//! Durability boundary for session state.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use anyhow::Result;
use countdown_types::SessionId;

use crate::EngineSnapshot;

/// Where session snapshots live between observations.
///
/// Implementations must make `save` atomic per session: a reader sees either
/// the previous snapshot or the new one.
pub trait SessionStore: Send + Sync {
    fn load(&self, id: &SessionId) -> Result<Option<EngineSnapshot>>;

    fn save(&self, id: &SessionId, snapshot: &EngineSnapshot) -> Result<()>;

    /// Returns whether a session was removed.
    fn remove(&self, id: &SessionId) -> Result<bool>;

    fn clear(&self) -> Result<()>;

    fn count(&self) -> Result<usize>;
}

/// Process-local store. State is lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: Mutex<HashMap<SessionId, EngineSnapshot>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn sessions(&self) -> std::sync::MutexGuard<'_, HashMap<SessionId, EngineSnapshot>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for MemoryStore {
    fn load(&self, id: &SessionId) -> Result<Option<EngineSnapshot>> {
        Ok(self.sessions().get(id).cloned())
    }

    fn save(&self, id: &SessionId, snapshot: &EngineSnapshot) -> Result<()> {
        self.sessions().insert(id.clone(), snapshot.clone());
        Ok(())
    }

    fn remove(&self, id: &SessionId) -> Result<bool> {
        Ok(self.sessions().remove(id).is_some())
    }

    fn clear(&self) -> Result<()> {
        self.sessions().clear();
        Ok(())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.sessions().len())
    }
}
