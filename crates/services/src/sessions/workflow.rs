use std::sync::Arc;

use quiz_core::model::{ExportRecord, QuizId, SessionMode};
use quiz_core::{Seed, SubSeed};
use storage::{QuizSource, QuizStateRepository};

use super::loader::QuizLoader;
use super::persistence::SessionStore;
use super::service::{QuizSession, SessionEvent, Transition};
use crate::Clock;
use crate::error::LoadError;

/// What the learner asked for when opening a quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartRequest {
    pub quiz_id: QuizId,
    pub mode: Option<SessionMode>,
    pub seed: Option<Seed>,
}

impl StartRequest {
    #[must_use]
    pub fn new(quiz_id: QuizId) -> Self {
        Self {
            quiz_id,
            mode: None,
            seed: None,
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: SessionMode) -> Self {
        self.mode = Some(mode);
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: Seed) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Build a request from raw launch parameters.
    ///
    /// Unrecognised modes and seeds are logged and treated as absent.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::MissingId` when no id is given and
    /// `LoadError::InvalidId` when the id is unusable.
    pub fn from_params(
        id: Option<&str>,
        mode: Option<&str>,
        seed: Option<&str>,
    ) -> Result<Self, LoadError> {
        let quiz_id = QuizId::new(id.ok_or(LoadError::MissingId)?)?;

        let mode = mode.and_then(|raw| match raw.parse::<SessionMode>() {
            Ok(mode) => Some(mode),
            Err(err) => {
                tracing::warn!(error = %err, "ignoring mode parameter");
                None
            }
        });
        let seed = seed.and_then(|raw| match raw.parse::<Seed>() {
            Ok(seed) => Some(seed),
            Err(err) => {
                tracing::warn!(value = raw, error = %err, "ignoring seed parameter");
                None
            }
        });

        Ok(Self {
            quiz_id,
            mode,
            seed,
        })
    }
}

/// Orchestrates session start and write-through of learner actions.
#[derive(Clone)]
pub struct SessionLoopService {
    clock: Clock,
    loader: QuizLoader,
    store: SessionStore,
}

impl SessionLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        source: Arc<dyn QuizSource>,
        states: Arc<dyn QuizStateRepository>,
    ) -> Self {
        Self {
            clock,
            loader: QuizLoader::new(source),
            store: SessionStore::new(clock, states),
        }
    }

    #[must_use]
    pub fn with_sub_seed(mut self, sub_seed: SubSeed) -> Self {
        self.loader = self.loader.with_sub_seed(sub_seed);
        self
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    pub fn set_clock(&mut self, clock: Clock) {
        self.clock = clock;
        self.store.set_clock(clock);
    }

    /// Load the quiz and rebuild the learner's previous state for it.
    ///
    /// Seed precedence is explicit, then stored, then freshly generated. A
    /// stored mode wins over the requested one. The resulting state is saved
    /// straight away so a generated seed survives a restart.
    ///
    /// # Errors
    ///
    /// Returns `LoadError` if the quiz cannot be fetched or is invalid.
    /// Storage failures are logged and never fail the start.
    pub async fn start_session(&self, request: StartRequest) -> Result<QuizSession, LoadError> {
        let stored = self.store.load_or_default(&request.quiz_id).await;

        let seed = request
            .seed
            .or_else(|| stored.as_ref().and_then(|state| state.seed))
            .unwrap_or_else(Seed::generate);
        let loaded = self.loader.load(&request.quiz_id, seed).await?;

        let mode = stored
            .as_ref()
            .map(|state| state.mode)
            .or(request.mode)
            .unwrap_or_default();
        let mut session = QuizSession::new(loaded, mode, self.clock.now());
        if let Some(state) = stored {
            session.restore_answers(state.answers);
        }

        self.persist(&session).await;
        tracing::info!(
            quiz = %session.quiz_id(),
            %seed,
            %mode,
            items = session.items().len(),
            restored = session.answers().len(),
            "session started"
        );
        Ok(session)
    }

    /// Apply `event` now and write through when the transition asks for it.
    pub async fn dispatch(&self, session: &mut QuizSession, event: SessionEvent) -> Transition {
        let transition = session.apply(event, self.clock.now());
        match &transition {
            Transition::Rejected(reason) => {
                tracing::debug!(quiz = %session.quiz_id(), %reason, "selection rejected");
            }
            other if other.should_persist() => self.persist(session).await,
            _ => {}
        }
        transition
    }

    /// Results snapshot finished at the current time.
    #[must_use]
    pub fn export(&self, session: &QuizSession) -> ExportRecord {
        let record = session.export(self.clock.now());
        tracing::info!(
            quiz = %record.quiz_id,
            score = record.score,
            total = record.total,
            "results exported"
        );
        record
    }

    async fn persist(&self, session: &QuizSession) {
        if let Err(err) = self.store.save(session).await {
            tracing::warn!(quiz = %session.quiz_id(), error = %err, "failed to save session state");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_require_an_id() {
        assert!(matches!(
            StartRequest::from_params(None, Some("exam"), None),
            Err(LoadError::MissingId)
        ));
        assert!(matches!(
            StartRequest::from_params(Some("  "), None, None),
            Err(LoadError::MissingId)
        ));
        assert!(matches!(
            StartRequest::from_params(Some("../etc"), None, None),
            Err(LoadError::InvalidId(_))
        ));
    }

    #[test]
    fn params_parse_mode_and_wrap_seed() {
        let request =
            StartRequest::from_params(Some("net-1"), Some("EXAM"), Some("4294967338")).unwrap();
        assert_eq!(request.quiz_id.as_str(), "net-1");
        assert_eq!(request.mode, Some(SessionMode::Exam));
        assert_eq!(request.seed, Some(Seed::new(42)));
    }

    #[test]
    fn unusable_mode_and_seed_are_dropped() {
        let request =
            StartRequest::from_params(Some("net-1"), Some("quiz"), Some("forty-two")).unwrap();
        assert_eq!(request, StartRequest::new(QuizId::new("net-1").unwrap()));
    }
}
