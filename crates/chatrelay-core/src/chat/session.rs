//! Per-user rolling conversation history.
//!
//! `SessionStore` keeps one bounded, oldest-first `Vec<Turn>` per user in a
//! `DashMap`. Each entry sits behind its own async mutex so that a whole
//! dispatch (history read, inference call, append) can be serialized per
//! user while different users proceed in parallel. There is no global lock.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use chatrelay_types::turn::{DEFAULT_MAX_HISTORY, Turn};

type Slot = Arc<Mutex<Vec<Turn>>>;

/// Keyed in-memory session store with per-user serialization.
#[derive(Debug)]
pub struct SessionStore {
    sessions: DashMap<String, Slot>,
    max_history: usize,
}

impl SessionStore {
    pub fn new(max_history: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            max_history,
        }
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    /// Acquire exclusive access to one user's session.
    ///
    /// The entry is created lazily. Concurrent callers for the same user
    /// queue on the mutex in arrival order; tokio's mutex is fair.
    pub async fn lock(&self, user_id: &str) -> SessionGuard {
        // Clone the Arc out so the shard lock is released before awaiting.
        let slot: Slot = self
            .sessions
            .entry(user_id.to_string())
            .or_default()
            .clone();

        SessionGuard {
            user_id: user_id.to_string(),
            history: slot.lock_owned().await,
            max_history: self.max_history,
        }
    }

    /// Snapshot of a user's history; empty for unknown users.
    pub async fn get_history(&self, user_id: &str) -> Vec<Turn> {
        let slot = match self.sessions.get(user_id) {
            Some(entry) => entry.value().clone(),
            None => return Vec::new(),
        };
        let history = slot.lock().await;
        history.clone()
    }

    /// Append turns for a user, then drop the oldest beyond the cap.
    pub async fn append_turns(&self, user_id: &str, turns: Vec<Turn>) {
        self.lock(user_id).await.append_turns(turns);
    }

    /// Clear a user's history and drop the entry if nobody else holds it.
    pub async fn reset(&self, user_id: &str) {
        if self.sessions.contains_key(user_id) {
            self.lock(user_id).await.reset();
            self.release_if_idle(user_id);
        }
    }

    /// Remove a user's entry when its history is empty and no guard, waiter
    /// or snapshot reader still refers to it.
    ///
    /// The check runs under the shard write lock, so no caller can clone the
    /// slot between the check and the removal.
    pub fn release_if_idle(&self, user_id: &str) {
        let removed = self.sessions.remove_if(user_id, |_, slot| {
            Arc::strong_count(slot) == 1 && slot.try_lock().is_ok_and(|history| history.is_empty())
        });
        if removed.is_some() {
            debug!(user_id, "idle session released");
        }
    }

    /// Number of users with a session entry.
    pub fn user_count(&self) -> usize {
        self.sessions.len()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

/// Exclusive handle on one user's history, held for a whole dispatch.
///
/// Dropping the guard releases the user's lock.
pub struct SessionGuard {
    user_id: String,
    history: OwnedMutexGuard<Vec<Turn>>,
    max_history: usize,
}

impl SessionGuard {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Copy of the current history, oldest first.
    pub fn history(&self) -> Vec<Turn> {
        self.history.clone()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// The only mutator besides `reset`: append, then truncate from the front.
    pub fn append_turns(&mut self, turns: Vec<Turn>) {
        self.history.extend(turns);
        let len = self.history.len();
        if len > self.max_history {
            let excess = len - self.max_history;
            self.history.drain(..excess);
            debug!(user_id = %self.user_id, dropped = excess, "history truncated");
        }
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }
}
