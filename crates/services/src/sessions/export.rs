use chrono::{DateTime, Utc};

use quiz_core::model::ExportRecord;

use super::service::QuizSession;

impl QuizSession {
    /// Snapshot of the session at `finished_at`. Does not mutate the session.
    #[must_use]
    pub fn export(&self, finished_at: DateTime<Utc>) -> ExportRecord {
        ExportRecord {
            quiz_id: self.quiz_id().clone(),
            title: self.title().to_owned(),
            mode: self.mode(),
            started_at: self.started_at(),
            finished_at,
            score: self.progress().correct,
            total: self.items().len(),
            seed: self.seed(),
            answers: self.answers().clone(),
        }
    }
}

/// Pretty-printed JSON for the downloadable results file.
///
/// # Errors
///
/// Returns `serde_json::Error` if the record cannot be serialized.
pub fn export_json(record: &ExportRecord) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(record)
}
