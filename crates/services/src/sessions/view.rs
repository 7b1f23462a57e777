use chrono::{DateTime, Utc};

use quiz_core::model::{QuestionId, SessionItem, SessionMode};

use super::progress::ScoreDisplay;
use super::service::QuizSession;

/// Per-question feedback state the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback<'a> {
    Unanswered,
    /// Exam mode: the selection is shown without correctness.
    Selected { choice: usize },
    /// Practice mode: verdict plus the correct choice and explanation.
    Graded {
        choice: usize,
        correct: bool,
        answer: usize,
        explain: Option<&'a str>,
    },
    /// Correct answer disclosed by reveal or exam expiry.
    Revealed {
        selected: Option<usize>,
        answer: usize,
        explain: Option<&'a str>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemView<'a> {
    /// 1-based position in the shuffled order.
    pub number: usize,
    pub id: &'a QuestionId,
    pub stem: &'a str,
    pub choices: &'a [String],
    pub feedback: Feedback<'a>,
}

/// Everything needed to draw the quiz at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView<'a> {
    pub title: String,
    pub mode: SessionMode,
    pub items: Vec<ItemView<'a>>,
    pub counter: String,
    pub progress_percent: u8,
    pub score: ScoreDisplay,
    pub timer: Option<String>,
    pub reveal_enabled: bool,
}

impl SessionView<'_> {
    /// Label for the single mode button.
    #[must_use]
    pub fn mode_button_label(&self) -> &'static str {
        match self.mode {
            SessionMode::Practice => "Switch to Exam",
            SessionMode::Exam => "Switch to Practice",
        }
    }
}

impl QuizSession {
    /// Feedback for one item under the current mode and reveal state.
    #[must_use]
    pub fn feedback_for<'a>(&'a self, item: &'a SessionItem) -> Feedback<'a> {
        let selected = self.answers().get(item.id());
        if self.is_revealed() {
            return Feedback::Revealed {
                selected,
                answer: item.answer(),
                explain: item.explain(),
            };
        }
        match (selected, self.mode()) {
            (None, _) => Feedback::Unanswered,
            (Some(choice), SessionMode::Exam) => Feedback::Selected { choice },
            (Some(choice), SessionMode::Practice) => Feedback::Graded {
                choice,
                correct: item.is_correct(choice),
                answer: item.answer(),
                explain: item.explain(),
            },
        }
    }

    #[must_use]
    pub fn view(&self, now: DateTime<Utc>) -> SessionView<'_> {
        let progress = self.progress();
        let items = self
            .items()
            .iter()
            .enumerate()
            .map(|(idx, item)| ItemView {
                number: idx + 1,
                id: item.id(),
                stem: item.stem(),
                choices: item.choices(),
                feedback: self.feedback_for(item),
            })
            .collect();

        SessionView {
            title: format!("{} ({})", self.title(), self.mode().label()),
            mode: self.mode(),
            items,
            counter: progress.counter(),
            progress_percent: progress.percent,
            score: self.score_display(),
            timer: self.timer_display(now),
            reveal_enabled: self.can_reveal(),
        }
    }
}
