//! Session lookup and lifecycle.
//!
//! Each session sits behind its own mutex, held for the whole
//! apply-then-persist unit. The map lock is only held long enough to find or
//! insert that mutex, so sessions never wait on each other.
//!
//! `lifecycle` orders whole-session work against deletion: `create` and
//! `apply` share it, `remove` and `clear` take it exclusively. A save can
//! therefore never land after the session it belongs to was deleted.
//!
//! Terminal sessions are evicted from the map; the store keeps them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use countdown_types::{Deduction, Observation, SessionId};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    DeductionEngine, DeductionError, EngineSnapshot, MemoryStore, SessionStore, SnapshotError,
};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session {0} not found")]
    UnknownSession(SessionId),
    #[error(transparent)]
    Deduction(#[from] DeductionError),
    #[error("stored state of session {id} is invalid: {source}")]
    Corrupt {
        id: SessionId,
        #[source]
        source: SnapshotError,
    },
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

type SharedEngine = Arc<Mutex<DeductionEngine>>;

pub struct SessionRegistry {
    store: Arc<dyn SessionStore>,
    lifecycle: RwLock<()>,
    live: RwLock<HashMap<SessionId, SharedEngine>>,
}

impl SessionRegistry {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            lifecycle: RwLock::new(()),
            live: RwLock::new(HashMap::new()),
        }
    }

    /// Registry backed by a [`MemoryStore`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Start a session with every start value live.
    pub fn create(&self) -> Result<SessionId, SessionError> {
        let _lifecycle = self.shared_lifecycle();
        let id = SessionId::new(Uuid::new_v4().to_string());
        let engine = DeductionEngine::new();
        self.store.save(&id, &engine.snapshot())?;
        self.live_mut()
            .insert(id.clone(), Arc::new(Mutex::new(engine)));
        tracing::info!(session = %id, "Session created");
        Ok(id)
    }

    /// Apply one observation to a session and persist the result.
    ///
    /// The stored state only changes when the engine did. If persisting fails
    /// the in-memory session keeps its previous state as well.
    pub fn apply(
        &self,
        id: &SessionId,
        observation: Observation,
    ) -> Result<Deduction, SessionError> {
        let _lifecycle = self.shared_lifecycle();
        let shared = self.resolve(id)?;
        let mut engine = shared.lock().unwrap_or_else(PoisonError::into_inner);

        let mut next = engine.clone();
        let outcome = next.apply(observation);
        if next != *engine {
            self.store.save(id, &next.snapshot())?;
            *engine = next;
        }

        match &outcome {
            Ok(deduction) => tracing::debug!(
                session = %id,
                color = observation.color().as_str(),
                surviving = deduction.start.len(),
                step = engine.step(),
                "Observation applied"
            ),
            Err(err) => tracing::debug!(
                session = %id,
                color = observation.color().as_str(),
                error = %err,
                "Observation not applied"
            ),
        }

        if engine.is_terminal() {
            self.evict(id, &shared);
        }
        Ok(outcome?)
    }

    /// Current state of a session, for inspection.
    pub fn snapshot(&self, id: &SessionId) -> Result<EngineSnapshot, SessionError> {
        let _lifecycle = self.shared_lifecycle();
        let shared = self.resolve(id)?;
        let engine = shared.lock().unwrap_or_else(PoisonError::into_inner);
        if engine.is_terminal() {
            self.evict(id, &shared);
        }
        Ok(engine.snapshot())
    }

    /// Delete one session. Returns whether it existed.
    pub fn remove(&self, id: &SessionId) -> Result<bool, SessionError> {
        let _lifecycle = self.exclusive_lifecycle();
        let was_live = self.live_mut().remove(id).is_some();
        let was_stored = self.store.remove(id)?;
        Ok(was_live || was_stored)
    }

    /// Delete every session.
    pub fn clear(&self) -> Result<(), SessionError> {
        let _lifecycle = self.exclusive_lifecycle();
        self.live_mut().clear();
        self.store.clear()?;
        tracing::info!("All sessions cleared");
        Ok(())
    }

    /// Number of sessions known to the store.
    pub fn count(&self) -> Result<usize, SessionError> {
        Ok(self.store.count()?)
    }

    /// Number of sessions held in memory.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn resolve(&self, id: &SessionId) -> Result<SharedEngine, SessionError> {
        if let Some(shared) = self
            .live
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
        {
            return Ok(Arc::clone(shared));
        }

        let snapshot = self
            .store
            .load(id)?
            .ok_or_else(|| SessionError::UnknownSession(id.clone()))?;
        let engine = DeductionEngine::restore(snapshot).map_err(|source| SessionError::Corrupt {
            id: id.clone(),
            source,
        })?;
        tracing::info!(session = %id, step = engine.step(), "Session loaded from store");

        let mut live = self.live_mut();
        let shared = live
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(engine)));
        Ok(Arc::clone(shared))
    }

    /// Drop a finished session from memory, unless the entry was replaced.
    fn evict(&self, id: &SessionId, shared: &SharedEngine) {
        let mut live = self.live_mut();
        if live.get(id).is_some_and(|entry| Arc::ptr_eq(entry, shared)) {
            live.remove(id);
            tracing::debug!(session = %id, "Terminal session evicted from memory");
        }
    }

    fn live_mut(&self) -> RwLockWriteGuard<'_, HashMap<SessionId, SharedEngine>> {
        self.live.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn shared_lifecycle(&self) -> RwLockReadGuard<'_, ()> {
        self.lifecycle.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn exclusive_lifecycle(&self) -> RwLockWriteGuard<'_, ()> {
        self.lifecycle.write().unwrap_or_else(PoisonError::into_inner)
    }
}
