//! In-memory registry of live dialogue sessions.
//!
//! Bounded by `max_sessions`. Every insert first drops sessions idle for
//! longer than `idle_expiry`; if the registry is still full, the least
//! recently active completed session goes. Sessions with a turn in flight
//! are never evicted.

use super::error::DialogueError;
use crate::config::SessionParams;
use crate::ports::clock::Clock;
use parley_domain::{DialogueSession, SessionId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// A registered session plus its turn gate.
///
/// The session lock is only held for synchronous state changes; the gate
/// is held for the whole of a model turn so a second `advance` on the same
/// session is rejected instead of queued.
pub struct SessionEntry {
    session: Mutex<DialogueSession>,
    turn_gate: tokio::sync::Mutex<()>,
}

impl SessionEntry {
    fn new(session: DialogueSession) -> Self {
        Self {
            session: Mutex::new(session),
            turn_gate: tokio::sync::Mutex::new(()),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, DialogueSession> {
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Claim the turn gate, or `None` if a turn is already running.
    pub fn try_begin_turn(&self) -> Option<tokio::sync::MutexGuard<'_, ()>> {
        self.turn_gate.try_lock().ok()
    }

    fn is_busy(&self) -> bool {
        self.turn_gate.try_lock().is_err()
    }
}

pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, Arc<SessionEntry>>>,
    max_sessions: usize,
    idle_expiry: Duration,
    clock: Arc<dyn Clock>,
}

impl SessionRegistry {
    pub fn new(params: &SessionParams, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions: params.max_sessions.max(1),
            idle_expiry: params.idle_expiry,
            clock,
        }
    }

    pub async fn insert(&self, session: DialogueSession) -> Result<Arc<SessionEntry>, DialogueError> {
        let mut sessions = self.sessions.write().await;
        self.sweep_idle(&mut sessions);

        if sessions.len() >= self.max_sessions {
            let victim = sessions
                .iter()
                .filter(|(_, entry)| !entry.is_busy())
                .filter_map(|(id, entry)| {
                    let session = entry.lock();
                    session.is_completed().then(|| (*id, session.last_activity()))
                })
                .min_by_key(|(_, last_activity)| *last_activity)
                .map(|(id, _)| id);
            match victim {
                Some(id) => {
                    info!("Registry full; evicting completed session {}", id);
                    sessions.remove(&id);
                }
                None => return Err(DialogueError::CapacityExceeded(self.max_sessions)),
            }
        }

        let id = session.id();
        let entry = Arc::new(SessionEntry::new(session));
        sessions.insert(id, entry.clone());
        Ok(entry)
    }

    pub async fn get(&self, id: SessionId) -> Result<Arc<SessionEntry>, DialogueError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(DialogueError::SessionNotFound(id))
    }

    pub async fn remove(&self, id: SessionId) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub async fn entries(&self) -> Vec<Arc<SessionEntry>> {
        self.sessions.read().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn sweep_idle(&self, sessions: &mut HashMap<SessionId, Arc<SessionEntry>>) {
        let now = self.clock.now();
        let before = sessions.len();
        sessions.retain(|_, entry| {
            if entry.is_busy() {
                return true;
            }
            let idle = (now - entry.lock().last_activity()).to_std().unwrap_or_default();
            idle <= self.idle_expiry
        });
        let dropped = before - sessions.len();
        if dropped > 0 {
            debug!("Dropped {} idle sessions", dropped);
        }
    }
}
