use async_trait::async_trait;
use quiz_core::model::{PersistedState, QuizId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("storage unavailable")]
    Unavailable,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Storage key for a quiz's persisted state.
#[must_use]
pub fn state_key(quiz_id: &QuizId) -> String {
    format!("quiz:{quiz_id}")
}

/// Encode a state record into its JSON payload.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if the record cannot be encoded.
pub fn encode_state(state: &PersistedState) -> Result<String, StorageError> {
    serde_json::to_string(state).map_err(|err| StorageError::Serialization(err.to_string()))
}

/// Decode a stored JSON payload.
///
/// # Errors
///
/// Returns `StorageError::Serialization` for corrupt or foreign payloads.
pub fn decode_state(payload: &str) -> Result<PersistedState, StorageError> {
    serde_json::from_str(payload).map_err(|err| StorageError::Serialization(err.to_string()))
}

/// Keyed store for per-quiz session state.
#[async_trait]
pub trait QuizStateRepository: Send + Sync {
    /// Fetch the stored state for a quiz.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if a record exists but cannot be
    /// decoded, or other storage errors.
    async fn load_state(&self, quiz_id: &QuizId) -> Result<Option<PersistedState>, StorageError>;

    /// Replace the stored state for a quiz.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be written.
    async fn save_state(&self, quiz_id: &QuizId, state: &PersistedState)
    -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
///
/// Payloads are kept as JSON text so corrupt records can be simulated.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    states: Arc<Mutex<HashMap<String, String>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with `StorageError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Store a raw payload under the quiz's key, bypassing encoding.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn insert_raw(&self, quiz_id: &QuizId, payload: impl Into<String>) -> Result<(), StorageError> {
        let mut guard = self
            .states
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(state_key(quiz_id), payload.into());
        Ok(())
    }

    /// Raw payload stored for a quiz, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn raw(&self, quiz_id: &QuizId) -> Result<Option<String>, StorageError> {
        let guard = self
            .states
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&state_key(quiz_id)).cloned())
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable);
        }
        Ok(())
    }
}

#[async_trait]
impl QuizStateRepository for InMemoryRepository {
    async fn load_state(&self, quiz_id: &QuizId) -> Result<Option<PersistedState>, StorageError> {
        self.check_available()?;
        let payload = {
            let guard = self
                .states
                .lock()
                .map_err(|e| StorageError::Connection(e.to_string()))?;
            guard.get(&state_key(quiz_id)).cloned()
        };
        payload.as_deref().map(decode_state).transpose()
    }

    async fn save_state(
        &self,
        quiz_id: &QuizId,
        state: &PersistedState,
    ) -> Result<(), StorageError> {
        self.check_available()?;
        let payload = encode_state(state)?;
        let mut guard = self
            .states
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(state_key(quiz_id), payload);
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub quiz_states: Arc<dyn QuizStateRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let quiz_states: Arc<dyn QuizStateRepository> = Arc::new(repo);
        Self { quiz_states }
    }
}
