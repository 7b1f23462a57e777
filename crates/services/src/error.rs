//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{QuestionId, QuizError, QuizId, QuizIdError};
use storage::SourceError;
use storage::sqlite::SqliteInitError;

/// Why a session could not start. The only error shown to the learner.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error("no quiz id specified")]
    MissingId,
    #[error("invalid quiz id: {0}")]
    InvalidId(QuizIdError),
    #[error("quiz not found: {0}")]
    NotFound(QuizId),
    #[error("failed to load quiz: {0}")]
    Source(#[source] SourceError),
    #[error("invalid quiz definition: {0}")]
    Invalid(#[from] QuizError),
}

impl From<QuizIdError> for LoadError {
    fn from(err: QuizIdError) -> Self {
        match err {
            QuizIdError::Empty => LoadError::MissingId,
            other => LoadError::InvalidId(other),
        }
    }
}

impl From<SourceError> for LoadError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::NotFound(id) => LoadError::NotFound(id),
            other => LoadError::Source(other),
        }
    }
}

/// A selection the session refused; nothing was recorded.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidSelection {
    #[error("unknown question: {0}")]
    UnknownQuestion(QuestionId),
    #[error("choice {choice} is out of range for question {question} ({choices} choices)")]
    ChoiceOutOfRange {
        question: QuestionId,
        choice: usize,
        choices: usize,
    },
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Source(#[from] SourceError),
}
