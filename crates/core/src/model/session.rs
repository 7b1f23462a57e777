use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::QuestionId;
use crate::shuffle::Seed;

//
// ─── MODE ──────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown session mode: {0}")]
pub struct ParseModeError(String);

/// Whether feedback is immediate (`Practice`) or withheld under a timer (`Exam`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    #[default]
    Practice,
    Exam,
}

impl SessionMode {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            SessionMode::Practice => SessionMode::Exam,
            SessionMode::Exam => SessionMode::Practice,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SessionMode::Practice => "practice",
            SessionMode::Exam => "exam",
        }
    }

    /// Human label, e.g. for a title suffix.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SessionMode::Practice => "Practice Mode",
            SessionMode::Exam => "Exam Mode",
        }
    }
}

impl FromStr for SessionMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "practice" => Ok(SessionMode::Practice),
            "exam" => Ok(SessionMode::Exam),
            _ => Err(ParseModeError(s.to_owned())),
        }
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── ANSWERS ───────────────────────────────────────────────────────────────────
//

/// Selected choice index per question. Entries are overwritten on reselection
/// and only removed by [`Answers::clear`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Answers(BTreeMap<QuestionId, usize>);

impl Answers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a selection, returning the previous choice if any.
    pub fn record(&mut self, question: QuestionId, choice: usize) -> Option<usize> {
        self.0.insert(question, choice)
    }

    #[must_use]
    pub fn get(&self, question: &QuestionId) -> Option<usize> {
        self.0.get(question).copied()
    }

    #[must_use]
    pub fn contains(&self, question: &QuestionId) -> bool {
        self.0.contains_key(question)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Keep only entries for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&QuestionId, usize) -> bool) {
        self.0.retain(|id, choice| keep(id, *choice));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, usize)> {
        self.0.iter().map(|(id, choice)| (id, *choice))
    }
}

impl FromIterator<(QuestionId, usize)> for Answers {
    fn from_iter<I: IntoIterator<Item = (QuestionId, usize)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

//
// ─── PERSISTED STATE ───────────────────────────────────────────────────────────
//

/// Locally stored progress for one quiz id.
///
/// Wire shape: `{ "mode": "practice", "answers": {"q1": 2}, "seed": 7, "ts": 1700000000000 }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    pub mode: SessionMode,
    #[serde(default)]
    pub answers: Answers,
    #[serde(default)]
    pub seed: Option<Seed>,
    #[serde(rename = "ts", with = "chrono::serde::ts_milliseconds")]
    pub saved_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("EXAM".parse::<SessionMode>().unwrap(), SessionMode::Exam);
        assert_eq!(" practice ".parse::<SessionMode>().unwrap(), SessionMode::Practice);
        assert!("quiz".parse::<SessionMode>().is_err());
        assert_eq!(SessionMode::Practice.toggled(), SessionMode::Exam);
    }

    #[test]
    fn answers_overwrite_and_clear() {
        let mut answers = Answers::new();
        assert_eq!(answers.record(QuestionId::new("q1"), 0), None);
        assert_eq!(answers.record(QuestionId::new("q1"), 2), Some(0));
        assert_eq!(answers.get(&QuestionId::new("q1")), Some(2));
        assert_eq!(answers.len(), 1);
        answers.clear();
        assert!(answers.is_empty());
    }

    #[test]
    fn persisted_state_uses_wire_names() {
        let state = PersistedState {
            mode: SessionMode::Exam,
            answers: [(QuestionId::new("q1"), 2)].into_iter().collect(),
            seed: Some(Seed::new(7)),
            saved_at: fixed_now(),
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "mode": "exam",
                "answers": {"q1": 2},
                "seed": 7,
                "ts": 1_700_000_000_000_i64
            })
        );
        let back: PersistedState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn persisted_state_accepts_null_seed_and_string_seed() {
        let raw = r#"{"mode":"practice","answers":{},"seed":null,"ts":1700000000000}"#;
        let state: PersistedState = serde_json::from_str(raw).unwrap();
        assert_eq!(state.seed, None);

        let raw = r#"{"mode":"practice","answers":{"a":1},"seed":"42","ts":1700000000000}"#;
        let state: PersistedState = serde_json::from_str(raw).unwrap();
        assert_eq!(state.seed, Some(Seed::new(42)));
    }
}
