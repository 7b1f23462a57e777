use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizIdError {
    #[error("quiz id cannot be empty")]
    Empty,
    #[error("quiz id contains a forbidden character: {0:?}")]
    ForbiddenChar(char),
    #[error("quiz id cannot be a relative path segment")]
    RelativeSegment,
}

/// Identifier of a quiz definition.
///
/// Quiz ids double as file names and URL path segments, so path separators,
/// control characters and `.`/`..` are rejected.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QuizId(String);

impl QuizId {
    /// # Errors
    ///
    /// Returns `QuizIdError` if the id is empty or unsafe as a path segment.
    pub fn new(raw: impl Into<String>) -> Result<Self, QuizIdError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(QuizIdError::Empty);
        }
        if trimmed == "." || trimmed == ".." {
            return Err(QuizIdError::RelativeSegment);
        }
        if let Some(c) = trimmed
            .chars()
            .find(|c| *c == '/' || *c == '\\' || c.is_control())
        {
            return Err(QuizIdError::ForbiddenChar(c));
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for QuizId {
    type Error = QuizIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<QuizId> for String {
    fn from(id: QuizId) -> Self {
        id.0
    }
}

impl FromStr for QuizId {
    type Err = QuizIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for QuizId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for QuizId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuizId({})", self.0)
    }
}

/// Identifier of a question, unique within its quiz.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(String);

impl QuestionId {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for QuestionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuestionId({})", self.0)
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
