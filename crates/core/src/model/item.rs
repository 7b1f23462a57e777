use serde::{Deserialize, Serialize};

use crate::model::ids::QuestionId;
use crate::model::quiz::QuestionSpec;
use crate::shuffle::{Seed, permutation};

/// A question as presented in one session, with its choices permuted.
///
/// `choices[answer]` always holds the text that was correct in the source
/// question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionItem {
    id: QuestionId,
    stem: String,
    choices: Vec<String>,
    answer: usize,
    explain: Option<String>,
}

impl SessionItem {
    /// Permute the choices of `spec` with `seed` and remap its answer.
    ///
    /// The answer index must already be valid for `spec.choices`; see
    /// `QuizDefinition::validate`. An out-of-range answer stays out of range.
    #[must_use]
    pub fn permuted(spec: QuestionSpec, seed: Seed) -> Self {
        let order = permutation(spec.choices.len(), seed);
        let answer = order
            .iter()
            .position(|&original| original == spec.answer)
            .unwrap_or(spec.answer);

        let mut source: Vec<Option<String>> = spec.choices.into_iter().map(Some).collect();
        let choices = order
            .iter()
            .filter_map(|&original| source.get_mut(original).and_then(Option::take))
            .collect();

        Self {
            id: spec.id,
            stem: spec.stem,
            choices,
            answer,
            explain: spec.explain,
        }
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn stem(&self) -> &str {
        &self.stem
    }

    #[must_use]
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    #[must_use]
    pub fn answer(&self) -> usize {
        self.answer
    }

    #[must_use]
    pub fn explain(&self) -> Option<&str> {
        self.explain.as_deref()
    }

    #[must_use]
    pub fn choice_count(&self) -> usize {
        self.choices.len()
    }

    #[must_use]
    pub fn is_valid_choice(&self, choice: usize) -> bool {
        choice < self.choices.len()
    }

    #[must_use]
    pub fn is_correct(&self, choice: usize) -> bool {
        choice == self.answer
    }
}
