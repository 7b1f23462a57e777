use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::model::ids::QuestionId;

/// Exam countdown used when a quiz does not set `timerMinutes`.
pub const DEFAULT_TIMER_MINUTES: f64 = 30.0;

/// Longest accepted exam countdown: one week.
pub const MAX_TIMER_MINUTES: f64 = 7.0 * 24.0 * 60.0;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("duplicate question id: {0}")]
    DuplicateQuestion(QuestionId),

    #[error("question {0} has no choices")]
    NoChoices(QuestionId),

    #[error("question {question} answer index {answer} is out of range for {choices} choices")]
    AnswerOutOfRange {
        question: QuestionId,
        answer: usize,
        choices: usize,
    },

    #[error("timer minutes must be positive and at most one week, got {0}")]
    InvalidTimer(f64),
}

//
// ─── DEFINITION ────────────────────────────────────────────────────────────────
//

/// A quiz as stored in `data/{quizId}.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizDefinition {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer_minutes: Option<f64>,
    pub items: Vec<QuestionSpec>,
}

/// A single-choice question in authoring order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSpec {
    pub id: QuestionId,
    pub stem: String,
    pub choices: Vec<String>,
    /// Index into `choices` of the correct answer.
    pub answer: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explain: Option<String>,
}

impl QuizDefinition {
    /// Check the invariants the session relies on.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` for duplicate ids, empty choice lists, out-of-range
    /// answers, or a timer outside `(0, MAX_TIMER_MINUTES]`.
    pub fn validate(&self) -> Result<(), QuizError> {
        if let Some(minutes) = self.timer_minutes {
            if !minutes.is_finite() || minutes <= 0.0 || minutes > MAX_TIMER_MINUTES {
                return Err(QuizError::InvalidTimer(minutes));
            }
        }

        let mut seen = HashSet::with_capacity(self.items.len());
        for question in &self.items {
            if !seen.insert(&question.id) {
                return Err(QuizError::DuplicateQuestion(question.id.clone()));
            }
            if question.choices.is_empty() {
                return Err(QuizError::NoChoices(question.id.clone()));
            }
            if question.answer >= question.choices.len() {
                return Err(QuizError::AnswerOutOfRange {
                    question: question.id.clone(),
                    answer: question.answer,
                    choices: question.choices.len(),
                });
            }
        }
        Ok(())
    }

    /// Exam countdown length, falling back to [`DEFAULT_TIMER_MINUTES`].
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn timer_duration(&self) -> Duration {
        let minutes = self.timer_minutes.unwrap_or(DEFAULT_TIMER_MINUTES);
        Duration::milliseconds((minutes * 60_000.0).round() as i64)
    }
}

impl QuestionSpec {
    /// Text of the correct choice.
    #[must_use]
    pub fn answer_text(&self) -> Option<&str> {
        self.choices.get(self.answer).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: &str, choices: &[&str], answer: usize) -> QuestionSpec {
        QuestionSpec {
            id: QuestionId::new(id),
            stem: format!("Stem {id}"),
            choices: choices.iter().map(|c| (*c).to_owned()).collect(),
            answer,
            explain: None,
        }
    }

    fn quiz(items: Vec<QuestionSpec>) -> QuizDefinition {
        QuizDefinition {
            title: "Quiz".into(),
            timer_minutes: None,
            items,
        }
    }

    #[test]
    fn parses_wire_shape() {
        let raw = r#"{
            "title": "Controls",
            "timerMinutes": 10,
            "items": [
                {"id": "q1", "stem": "Pick", "choices": ["a", "b"], "answer": 1, "explain": "because"},
                {"id": "q2", "stem": "Pick", "choices": ["c"], "answer": 0}
            ]
        }"#;
        let def: QuizDefinition = serde_json::from_str(raw).unwrap();
        assert_eq!(def.title, "Controls");
        assert_eq!(def.timer_minutes, Some(10.0));
        assert_eq!(def.items[0].explain.as_deref(), Some("because"));
        assert_eq!(def.items[1].explain, None);
        assert_eq!(def.items[0].answer_text(), Some("b"));
        def.validate().unwrap();
    }

    #[test]
    fn default_timer_is_thirty_minutes() {
        assert_eq!(quiz(Vec::new()).timer_duration(), Duration::minutes(30));

        let mut def = quiz(Vec::new());
        def.timer_minutes = Some(1.5);
        assert_eq!(def.timer_duration(), Duration::seconds(90));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let def = quiz(vec![question("q1", &["a"], 0), question("q1", &["b"], 0)]);
        assert_eq!(
            def.validate().unwrap_err(),
            QuizError::DuplicateQuestion(QuestionId::new("q1"))
        );
    }

    #[test]
    fn rejects_out_of_range_answer() {
        let def = quiz(vec![question("q1", &["a", "b"], 2)]);
        assert!(matches!(
            def.validate().unwrap_err(),
            QuizError::AnswerOutOfRange { answer: 2, choices: 2, .. }
        ));
    }

    #[test]
    fn rejects_empty_choices_and_bad_timer() {
        let def = quiz(vec![question("q1", &[], 0)]);
        assert!(matches!(def.validate().unwrap_err(), QuizError::NoChoices(_)));

        let mut def = quiz(Vec::new());
        def.timer_minutes = Some(0.0);
        assert!(matches!(def.validate().unwrap_err(), QuizError::InvalidTimer(_)));
    }

    #[test]
    fn timer_is_capped_at_one_week() {
        let mut def = quiz(Vec::new());
        def.timer_minutes = Some(MAX_TIMER_MINUTES);
        def.validate().unwrap();
        assert_eq!(def.timer_duration(), Duration::weeks(1));

        def.timer_minutes = Some(1e12);
        assert!(matches!(def.validate().unwrap_err(), QuizError::InvalidTimer(m) if m == 1e12));
    }

    #[test]
    fn empty_quiz_is_valid() {
        quiz(Vec::new()).validate().unwrap();
    }
}
