use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::QuizId;
use crate::model::session::{Answers, SessionMode};
use crate::shuffle::Seed;

/// Snapshot of a session handed out as `{quizId}-results.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRecord {
    pub quiz_id: QuizId,
    pub title: String,
    pub mode: SessionMode,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub score: usize,
    pub total: usize,
    pub seed: Seed,
    pub answers: Answers,
}

impl ExportRecord {
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}-results.json", self.quiz_id)
    }
}
