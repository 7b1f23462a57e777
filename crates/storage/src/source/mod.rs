//! Where quiz definitions come from.

use async_trait::async_trait;
use quiz_core::model::{QuizDefinition, QuizId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

mod directory;
mod http;

pub use directory::DirectoryQuizSource;
pub use http::HttpQuizSource;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SourceError {
    #[error("quiz not found: {0}")]
    NotFound(QuizId),

    #[error("failed to read quiz {quiz_id}: {message}")]
    Io { quiz_id: QuizId, message: String },

    #[error("quiz request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("malformed quiz {quiz_id}: {message}")]
    Malformed { quiz_id: QuizId, message: String },

    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),
}

pub(crate) fn parse_definition(quiz_id: &QuizId, bytes: &[u8]) -> Result<QuizDefinition, SourceError> {
    serde_json::from_slice(bytes).map_err(|err| SourceError::Malformed {
        quiz_id: quiz_id.clone(),
        message: err.to_string(),
    })
}

/// Fetches a quiz definition by id.
#[async_trait]
pub trait QuizSource: Send + Sync {
    /// # Errors
    ///
    /// Returns `SourceError::NotFound` when no quiz exists for the id,
    /// `SourceError::Malformed` when the payload is not a quiz definition, and
    /// transport errors otherwise.
    async fn fetch_quiz(&self, quiz_id: &QuizId) -> Result<QuizDefinition, SourceError>;
}

/// Quiz definitions held in memory, for tests and demos.
#[derive(Clone, Default)]
pub struct InMemoryQuizSource {
    quizzes: Arc<Mutex<HashMap<QuizId, QuizDefinition>>>,
}

impl InMemoryQuizSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`InMemoryQuizSource::insert`]; a poisoned map is
    /// recovered rather than skipped.
    #[must_use]
    pub fn with_quiz(self, quiz_id: QuizId, definition: QuizDefinition) -> Self {
        self.quizzes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(quiz_id, definition);
        self
    }

    /// Add or replace a quiz.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Io` if the lock is poisoned.
    pub fn insert(&self, quiz_id: QuizId, definition: QuizDefinition) -> Result<(), SourceError> {
        let mut guard = self.quizzes.lock().map_err(|e| SourceError::Io {
            quiz_id: quiz_id.clone(),
            message: e.to_string(),
        })?;
        guard.insert(quiz_id, definition);
        Ok(())
    }
}

#[async_trait]
impl QuizSource for InMemoryQuizSource {
    async fn fetch_quiz(&self, quiz_id: &QuizId) -> Result<QuizDefinition, SourceError> {
        let guard = self.quizzes.lock().map_err(|e| SourceError::Io {
            quiz_id: quiz_id.clone(),
            message: e.to_string(),
        })?;
        guard
            .get(quiz_id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(quiz_id.clone()))
    }
}
