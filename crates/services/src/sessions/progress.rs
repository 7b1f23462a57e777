use quiz_core::model::{Answers, SessionItem, SessionMode};

/// Aggregated view of session progress, recomputed from items and answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub correct: usize,
    pub percent: u8,
    pub is_complete: bool,
}

impl SessionProgress {
    #[must_use]
    pub fn compute(items: &[SessionItem], answers: &Answers) -> Self {
        let total = items.len();
        let answered = answered_count(items, answers);
        Self {
            total,
            answered,
            correct: correct_count(items, answers),
            percent: progress_percent(answered, total),
            is_complete: total > 0 && answered == total,
        }
    }

    /// `answered/total`, as shown next to the progress bar.
    #[must_use]
    pub fn counter(&self) -> String {
        format!("{}/{}", self.answered, self.total)
    }
}

/// Items with a recorded answer. Answers for unknown ids are not counted.
#[must_use]
pub fn answered_count(items: &[SessionItem], answers: &Answers) -> usize {
    items.iter().filter(|item| answers.contains(item.id())).count()
}

#[must_use]
pub fn correct_count(items: &[SessionItem], answers: &Answers) -> usize {
    items
        .iter()
        .filter(|item| answers.get(item.id()) == Some(item.answer()))
        .count()
}

/// Rounded completion percentage; `0` for an empty quiz.
///
/// Rounds half up, but never reports 100 until every item is answered.
#[must_use]
pub fn progress_percent(answered: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let answered = answered.min(total);
    let rounded = (answered * 200 + total) / (total * 2);
    let capped = if answered < total { rounded.min(99) } else { 100 };
    u8::try_from(capped).unwrap_or(100)
}

/// What the score label shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreDisplay {
    /// Nothing answered yet.
    NoScoreYet,
    /// Exam mode before reveal or expiry.
    Hidden,
    Visible { correct: usize, total: usize },
}

impl ScoreDisplay {
    #[must_use]
    pub fn for_session(progress: &SessionProgress, mode: SessionMode, revealed: bool) -> Self {
        if progress.answered == 0 {
            ScoreDisplay::NoScoreYet
        } else if mode == SessionMode::Exam && !revealed {
            ScoreDisplay::Hidden
        } else {
            ScoreDisplay::Visible {
                correct: progress.correct,
                total: progress.total,
            }
        }
    }

    /// Label text; empty when no score is shown.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            ScoreDisplay::NoScoreYet | ScoreDisplay::Hidden => String::new(),
            ScoreDisplay::Visible { correct, total } => format!("Score: {correct}/{total}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::Seed;
    use quiz_core::model::{QuestionId, QuestionSpec};

    fn items(n: usize) -> Vec<SessionItem> {
        (0..n)
            .map(|i| {
                SessionItem::permuted(
                    QuestionSpec {
                        id: QuestionId::new(format!("q{i}")),
                        stem: "?".into(),
                        choices: vec!["a".into(), "b".into(), "c".into()],
                        answer: 1,
                        explain: None,
                    },
                    Seed::new(5),
                )
            })
            .collect()
    }

    #[test]
    fn counts_answered_and_correct() {
        let items = items(3);
        let mut answers = Answers::new();
        answers.record(items[0].id().clone(), items[0].answer());
        answers.record(items[1].id().clone(), (items[1].answer() + 1) % 3);
        answers.record(QuestionId::new("stale"), 0);

        let progress = SessionProgress::compute(&items, &answers);
        assert_eq!(progress.answered, 2);
        assert_eq!(progress.correct, 1);
        assert_eq!(progress.percent, 67);
        assert!(!progress.is_complete);
        assert_eq!(progress.counter(), "2/3");
    }

    #[test]
    fn empty_quiz_reports_zero_percent() {
        let progress = SessionProgress::compute(&[], &Answers::new());
        assert_eq!(progress.percent, 0);
        assert!(!progress.is_complete);
    }

    #[test]
    fn percent_is_bounded_and_only_full_when_complete() {
        for total in 1..=300 {
            for answered in 0..=total {
                let pct = progress_percent(answered, total);
                assert!(pct <= 100);
                assert_eq!(pct == 100, answered == total, "{answered}/{total}");
            }
        }
        assert_eq!(progress_percent(1, 2), 50);
        assert_eq!(progress_percent(1, 8), 13);
    }

    #[test]
    fn score_display_policy() {
        let items = items(2);
        let empty = SessionProgress::compute(&items, &Answers::new());
        assert_eq!(
            ScoreDisplay::for_session(&empty, SessionMode::Practice, false),
            ScoreDisplay::NoScoreYet
        );

        let mut answers = Answers::new();
        answers.record(items[0].id().clone(), items[0].answer());
        let progress = SessionProgress::compute(&items, &answers);
        assert_eq!(
            ScoreDisplay::for_session(&progress, SessionMode::Exam, false),
            ScoreDisplay::Hidden
        );
        let visible = ScoreDisplay::for_session(&progress, SessionMode::Exam, true);
        assert_eq!(visible, ScoreDisplay::Visible { correct: 1, total: 2 });
        assert_eq!(visible.label(), "Score: 1/2");
    }
}
