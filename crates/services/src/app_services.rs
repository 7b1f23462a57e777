use std::path::PathBuf;
use std::sync::Arc;

use quiz_core::SubSeed;
use storage::repository::Storage;
use storage::{DirectoryQuizSource, HttpQuizSource, QuizSource};

use crate::Clock;
use crate::error::AppServicesError;
use crate::sessions::SessionLoopService;

/// Where quiz definitions are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizSourceConfig {
    /// `{dir}/{quizId}.json` on the local filesystem.
    Directory(PathBuf),
    /// `{base}/data/{quizId}.json` over HTTP.
    Http(String),
}

impl QuizSourceConfig {
    /// Build the configured source.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Source` if the base URL is unusable.
    pub fn build(&self) -> Result<Arc<dyn QuizSource>, AppServicesError> {
        let source: Arc<dyn QuizSource> = match self {
            QuizSourceConfig::Directory(dir) => Arc::new(DirectoryQuizSource::new(dir.clone())),
            QuizSourceConfig::Http(base) => Arc::new(HttpQuizSource::new(base)?),
        };
        Ok(source)
    }
}

/// Assembles app-facing services over a storage backend and a quiz source.
#[derive(Clone)]
pub struct AppServices {
    session_loop: Arc<SessionLoopService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails or the
    /// source cannot be built.
    pub async fn new_sqlite(
        db_url: &str,
        source: &QuizSourceConfig,
        clock: Clock,
        sub_seed: SubSeed,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_parts(&storage, source.build()?, clock, sub_seed))
    }

    /// Build services over volatile storage; nothing survives the process.
    #[must_use]
    pub fn in_memory(source: Arc<dyn QuizSource>, clock: Clock) -> Self {
        Self::from_parts(&Storage::in_memory(), source, clock, SubSeed::default())
    }

    fn from_parts(
        storage: &Storage,
        source: Arc<dyn QuizSource>,
        clock: Clock,
        sub_seed: SubSeed,
    ) -> Self {
        let session_loop = Arc::new(
            SessionLoopService::new(clock, source, Arc::clone(&storage.quiz_states))
                .with_sub_seed(sub_seed),
        );
        Self { session_loop }
    }

    #[must_use]
    pub fn session_loop(&self) -> Arc<SessionLoopService> {
        Arc::clone(&self.session_loop)
    }
}
