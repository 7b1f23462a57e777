use chrono::Duration;
use std::sync::Arc;

use quiz_core::model::{QuizDefinition, QuizId, SessionItem};
use quiz_core::{Seed, SubSeed, shuffle};
use storage::QuizSource;

use crate::error::LoadError;

/// A fetched quiz turned into its per-session, shuffled form.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedQuiz {
    pub quiz_id: QuizId,
    pub title: String,
    pub timer_duration: Duration,
    pub items: Vec<SessionItem>,
    pub seed: Seed,
}

/// Fetches quiz definitions and builds session items.
#[derive(Clone)]
pub struct QuizLoader {
    source: Arc<dyn QuizSource>,
    sub_seed: SubSeed,
}

impl QuizLoader {
    #[must_use]
    pub fn new(source: Arc<dyn QuizSource>) -> Self {
        Self {
            source,
            sub_seed: SubSeed::default(),
        }
    }

    #[must_use]
    pub fn with_sub_seed(mut self, sub_seed: SubSeed) -> Self {
        self.sub_seed = sub_seed;
        self
    }

    #[must_use]
    pub fn sub_seed(&self) -> SubSeed {
        self.sub_seed
    }

    /// Fetch, validate and shuffle the quiz for `seed`.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::NotFound` for unknown ids, `LoadError::Source` for
    /// fetch or parse failures, and `LoadError::Invalid` when the definition
    /// breaks its invariants.
    pub async fn load(&self, quiz_id: &QuizId, seed: Seed) -> Result<LoadedQuiz, LoadError> {
        let definition = self.source.fetch_quiz(quiz_id).await?;
        definition.validate()?;

        let timer_duration = definition.timer_duration();
        let title = definition.title.clone();
        let items = build_items(definition, seed, self.sub_seed);
        tracing::debug!(quiz = %quiz_id, %seed, items = items.len(), "quiz loaded");

        Ok(LoadedQuiz {
            quiz_id: quiz_id.clone(),
            title,
            timer_duration,
            items,
            seed,
        })
    }
}

/// Permute each question's choices with its sub-seed, then the question order
/// with the base seed.
#[must_use]
pub fn build_items(definition: QuizDefinition, seed: Seed, sub_seed: SubSeed) -> Vec<SessionItem> {
    let items: Vec<SessionItem> = definition
        .items
        .into_iter()
        .map(|question| {
            let choice_seed = sub_seed.derive(seed, question.id.as_str());
            SessionItem::permuted(question, choice_seed)
        })
        .collect();
    shuffle(items, Some(seed))
}
