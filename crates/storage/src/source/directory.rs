use async_trait::async_trait;
use quiz_core::model::{QuizDefinition, QuizId};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{QuizSource, SourceError, parse_definition};

/// Reads `{root}/{quizId}.json` from disk.
#[derive(Debug, Clone)]
pub struct DirectoryQuizSource {
    root: PathBuf,
}

impl DirectoryQuizSource {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn path_for(&self, quiz_id: &QuizId) -> PathBuf {
        self.root.join(format!("{quiz_id}.json"))
    }
}

#[async_trait]
impl QuizSource for DirectoryQuizSource {
    async fn fetch_quiz(&self, quiz_id: &QuizId) -> Result<QuizDefinition, SourceError> {
        let path = self.path_for(quiz_id);
        tracing::debug!(path = %path.display(), "reading quiz definition");
        let bytes = tokio::fs::read(&path).await.map_err(|err| match err.kind() {
            ErrorKind::NotFound => SourceError::NotFound(quiz_id.clone()),
            _ => SourceError::Io {
                quiz_id: quiz_id.clone(),
                message: err.to_string(),
            },
        })?;
        parse_definition(quiz_id, &bytes)
    }
}
