use std::sync::Arc;

use quiz_core::model::{PersistedState, QuizId};
use storage::{QuizStateRepository, StorageError};

use super::service::QuizSession;
use crate::Clock;

/// Best-effort write-through of session state, keyed by quiz id.
///
/// Both directions return the storage error; callers log and continue.
#[derive(Clone)]
pub struct SessionStore {
    clock: Clock,
    states: Arc<dyn QuizStateRepository>,
}

impl SessionStore {
    #[must_use]
    pub fn new(clock: Clock, states: Arc<dyn QuizStateRepository>) -> Self {
        Self { clock, states }
    }

    pub fn set_clock(&mut self, clock: Clock) {
        self.clock = clock;
    }

    /// Previously stored state, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` for corrupt records and other
    /// storage errors as reported by the backend.
    pub async fn load(&self, quiz_id: &QuizId) -> Result<Option<PersistedState>, StorageError> {
        self.states.load_state(quiz_id).await
    }

    /// Store mode, answers and seed of `session`, stamped with the clock.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend rejects the write.
    pub async fn save(&self, session: &QuizSession) -> Result<(), StorageError> {
        let state = session.persisted_state(self.clock.now());
        self.states.save_state(session.quiz_id(), &state).await
    }

    /// [`SessionStore::load`] that treats any failure as "nothing stored".
    pub async fn load_or_default(&self, quiz_id: &QuizId) -> Option<PersistedState> {
        match self.load(quiz_id).await {
            Ok(state) => state,
            Err(err) => {
                tracing::warn!(quiz = %quiz_id, error = %err, "ignoring unreadable stored state");
                None
            }
        }
    }
}
