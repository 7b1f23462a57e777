use chrono::{DateTime, Duration, Utc};
use std::fmt;

use quiz_core::model::{Answers, PersistedState, QuestionId, QuizId, SessionItem, SessionMode};
use quiz_core::{ExamTimer, Seed, TimerTick};

use super::loader::LoadedQuiz;
use super::progress::{ScoreDisplay, SessionProgress};
use crate::error::InvalidSelection;

//
// ─── EVENTS ────────────────────────────────────────────────────────────────────
//

/// Every input the presentation layer can feed into a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SelectAnswer { question: QuestionId, choice: usize },
    SwitchMode(SessionMode),
    ToggleMode,
    Reveal,
    Reset,
    TimerTick,
}

/// What an event did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// State changed; `persist` is set when the stored record is now stale.
    Changed { persist: bool },
    /// Not applicable in the current state; nothing changed.
    Ignored,
    /// Selection refused; nothing changed.
    Rejected(InvalidSelection),
    /// The exam countdown reached zero and every answer was revealed.
    TimerExpired,
}

impl Transition {
    #[must_use]
    pub fn should_persist(&self) -> bool {
        matches!(self, Transition::Changed { persist: true })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerState {
    Idle,
    Running(ExamTimer),
    Expired,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One attempt at a quiz: shuffled items, answers, mode and exam timer.
///
/// All mutation goes through [`QuizSession::apply`].
pub struct QuizSession {
    quiz_id: QuizId,
    title: String,
    items: Vec<SessionItem>,
    answers: Answers,
    mode: SessionMode,
    seed: Seed,
    started_at: DateTime<Utc>,
    timer_duration: Duration,
    timer: TimerState,
    revealed: bool,
}

impl QuizSession {
    /// Build a session from a loaded quiz. Entering in exam mode starts the
    /// countdown at `started_at`.
    #[must_use]
    pub fn new(loaded: LoadedQuiz, mode: SessionMode, started_at: DateTime<Utc>) -> Self {
        let mut session = Self {
            quiz_id: loaded.quiz_id,
            title: loaded.title,
            items: loaded.items,
            answers: Answers::new(),
            mode,
            seed: loaded.seed,
            started_at,
            timer_duration: loaded.timer_duration,
            timer: TimerState::Idle,
            revealed: false,
        };
        if mode == SessionMode::Exam {
            session.start_timer(started_at);
        }
        session
    }

    /// Adopt previously stored answers, dropping entries that no longer match
    /// an item or a valid choice. Returns how many entries were dropped.
    pub fn restore_answers(&mut self, mut answers: Answers) -> usize {
        let before = answers.len();
        let items = &self.items;
        answers.retain(|id, choice| {
            items
                .iter()
                .any(|item| item.id() == id && item.is_valid_choice(choice))
        });
        let dropped = before - answers.len();
        if dropped > 0 {
            tracing::debug!(quiz = %self.quiz_id, dropped, "dropped stale stored answers");
        }
        self.answers = answers;
        dropped
    }

    #[must_use]
    pub fn quiz_id(&self) -> &QuizId {
        &self.quiz_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn items(&self) -> &[SessionItem] {
        &self.items
    }

    #[must_use]
    pub fn item(&self, question: &QuestionId) -> Option<&SessionItem> {
        self.items.iter().find(|item| item.id() == question)
    }

    #[must_use]
    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    #[must_use]
    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    #[must_use]
    pub fn seed(&self) -> Seed {
        self.seed
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn timer_duration(&self) -> Duration {
        self.timer_duration
    }

    /// True while all correct answers are disclosed.
    #[must_use]
    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    #[must_use]
    pub fn timer(&self) -> Option<&ExamTimer> {
        match &self.timer {
            TimerState::Running(timer) => Some(timer),
            TimerState::Idle | TimerState::Expired => None,
        }
    }

    #[must_use]
    pub fn has_running_timer(&self) -> bool {
        matches!(self.timer, TimerState::Running(_))
    }

    #[must_use]
    pub fn is_timer_expired(&self) -> bool {
        matches!(self.timer, TimerState::Expired)
    }

    /// `mm:ss` countdown text; `None` outside exam mode.
    #[must_use]
    pub fn timer_display(&self, now: DateTime<Utc>) -> Option<String> {
        match self.timer {
            TimerState::Running(timer) => Some(timer.tick(now).display()),
            TimerState::Expired => Some(TimerTick::Expired.display()),
            TimerState::Idle => None,
        }
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress::compute(&self.items, &self.answers)
    }

    #[must_use]
    pub fn score_display(&self) -> ScoreDisplay {
        ScoreDisplay::for_session(&self.progress(), self.mode, self.revealed)
    }

    /// Reveal is only offered in practice mode.
    #[must_use]
    pub fn can_reveal(&self) -> bool {
        self.mode == SessionMode::Practice
    }

    /// Record to write through to local storage.
    #[must_use]
    pub fn persisted_state(&self, saved_at: DateTime<Utc>) -> PersistedState {
        PersistedState {
            mode: self.mode,
            answers: self.answers.clone(),
            seed: Some(self.seed),
            saved_at,
        }
    }

    /// Apply one event at `now`.
    pub fn apply(&mut self, event: SessionEvent, now: DateTime<Utc>) -> Transition {
        let transition = match event {
            SessionEvent::SelectAnswer { question, choice } => self.select(question, choice),
            SessionEvent::SwitchMode(mode) => self.switch_mode(mode, now),
            SessionEvent::ToggleMode => self.switch_mode(self.mode.toggled(), now),
            SessionEvent::Reveal => self.reveal(),
            SessionEvent::Reset => self.reset(),
            SessionEvent::TimerTick => self.tick(now),
        };
        tracing::trace!(quiz = %self.quiz_id, ?transition, "session transition");
        transition
    }

    fn select(&mut self, question: QuestionId, choice: usize) -> Transition {
        let Some(item) = self.item(&question) else {
            return Transition::Rejected(InvalidSelection::UnknownQuestion(question));
        };
        if !item.is_valid_choice(choice) {
            return Transition::Rejected(InvalidSelection::ChoiceOutOfRange {
                choices: item.choice_count(),
                question,
                choice,
            });
        }
        self.answers.record(question, choice);
        Transition::Changed { persist: true }
    }

    fn switch_mode(&mut self, mode: SessionMode, now: DateTime<Utc>) -> Transition {
        if mode == self.mode {
            return Transition::Ignored;
        }
        self.mode = mode;
        self.revealed = false;
        match mode {
            SessionMode::Exam => self.start_timer(now),
            SessionMode::Practice => self.timer = TimerState::Idle,
        }
        tracing::debug!(quiz = %self.quiz_id, %mode, "mode switched");
        Transition::Changed { persist: true }
    }

    fn reveal(&mut self) -> Transition {
        if !self.can_reveal() {
            return Transition::Ignored;
        }
        self.revealed = true;
        Transition::Changed { persist: false }
    }

    fn reset(&mut self) -> Transition {
        self.answers.clear();
        self.revealed = false;
        Transition::Changed { persist: true }
    }

    fn tick(&mut self, now: DateTime<Utc>) -> Transition {
        let TimerState::Running(timer) = self.timer else {
            return Transition::Ignored;
        };
        match timer.tick(now) {
            TimerTick::Running { .. } => Transition::Changed { persist: false },
            TimerTick::Expired => {
                self.timer = TimerState::Expired;
                self.revealed = true;
                tracing::info!(quiz = %self.quiz_id, "exam time expired");
                Transition::TimerExpired
            }
        }
    }

    fn start_timer(&mut self, now: DateTime<Utc>) {
        self.timer = TimerState::Running(ExamTimer::start(now, self.timer_duration));
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("quiz_id", &self.quiz_id)
            .field("items_len", &self.items.len())
            .field("answers_len", &self.answers.len())
            .field("mode", &self.mode)
            .field("seed", &self.seed)
            .field("started_at", &self.started_at)
            .field("timer", &self.timer)
            .field("revealed", &self.revealed)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{QuestionSpec, QuizDefinition};
    use quiz_core::time::fixed_now;
    use quiz_core::SubSeed;

    use crate::sessions::loader::build_items;

    fn loaded() -> LoadedQuiz {
        let definition = QuizDefinition {
            title: "Controls".into(),
            timer_minutes: Some(1.0),
            items: vec![
                QuestionSpec {
                    id: QuestionId::new("q1"),
                    stem: "First".into(),
                    choices: vec!["a".into(), "b".into(), "c".into()],
                    answer: 0,
                    explain: Some("a is right".into()),
                },
                QuestionSpec {
                    id: QuestionId::new("q2"),
                    stem: "Second".into(),
                    choices: vec!["x".into(), "y".into()],
                    answer: 1,
                    explain: None,
                },
            ],
        };
        LoadedQuiz {
            quiz_id: QuizId::new("controls").unwrap(),
            title: definition.title.clone(),
            timer_duration: definition.timer_duration(),
            items: build_items(definition, Seed::new(42), SubSeed::Fnv1a),
            seed: Seed::new(42),
        }
    }

    fn select(session: &mut QuizSession, id: &str, correct: bool) -> Transition {
        let item = session.item(&QuestionId::new(id)).unwrap();
        let choice = if correct {
            item.answer()
        } else {
            (item.answer() + 1) % item.choice_count()
        };
        session.apply(
            SessionEvent::SelectAnswer {
                question: QuestionId::new(id),
                choice,
            },
            fixed_now(),
        )
    }

    #[test]
    fn practice_session_scores_immediately() {
        let mut session = QuizSession::new(loaded(), SessionMode::Practice, fixed_now());
        assert_eq!(session.score_display(), ScoreDisplay::NoScoreYet);

        assert!(select(&mut session, "q1", true).should_persist());
        assert!(select(&mut session, "q2", false).should_persist());

        let progress = session.progress();
        assert_eq!(progress.correct, 1);
        assert_eq!(progress.percent, 100);
        assert_eq!(
            session.score_display(),
            ScoreDisplay::Visible { correct: 1, total: 2 }
        );
        assert!(session.timer().is_none());
    }

    #[test]
    fn invalid_selection_is_rejected_without_mutation() {
        let mut session = QuizSession::new(loaded(), SessionMode::Practice, fixed_now());
        let t = session.apply(
            SessionEvent::SelectAnswer {
                question: QuestionId::new("q2"),
                choice: 2,
            },
            fixed_now(),
        );
        assert_eq!(
            t,
            Transition::Rejected(InvalidSelection::ChoiceOutOfRange {
                question: QuestionId::new("q2"),
                choice: 2,
                choices: 2,
            })
        );
        let t = session.apply(
            SessionEvent::SelectAnswer {
                question: QuestionId::new("q9"),
                choice: 0,
            },
            fixed_now(),
        );
        assert!(matches!(t, Transition::Rejected(InvalidSelection::UnknownQuestion(_))));
        assert!(session.answers().is_empty());
    }

    #[test]
    fn switching_to_exam_starts_full_timer_and_keeps_answers() {
        let mut session = QuizSession::new(loaded(), SessionMode::Practice, fixed_now());
        select(&mut session, "q1", true);
        let before = session.answers().clone();

        let later = fixed_now() + Duration::minutes(10);
        let t = session.apply(SessionEvent::SwitchMode(SessionMode::Exam), later);
        assert!(t.should_persist());
        assert_eq!(session.mode(), SessionMode::Exam);
        assert_eq!(session.answers(), &before);
        let timer = session.timer().unwrap();
        assert_eq!(timer.started_at(), later);
        assert_eq!(session.timer_display(later).as_deref(), Some("01:00"));
    }

    #[test]
    fn exam_hides_score_until_reveal_or_expiry() {
        let mut session = QuizSession::new(loaded(), SessionMode::Exam, fixed_now());
        select(&mut session, "q1", true);
        assert_eq!(session.score_display(), ScoreDisplay::Hidden);
        assert_eq!(session.progress().correct, 1);

        assert_eq!(session.apply(SessionEvent::Reveal, fixed_now()), Transition::Ignored);
        assert!(!session.is_revealed());
        assert_eq!(session.score_display(), ScoreDisplay::Hidden);
    }

    #[test]
    fn exam_and_practice_store_identical_answers() {
        let mut exam = QuizSession::new(loaded(), SessionMode::Exam, fixed_now());
        let mut practice = QuizSession::new(loaded(), SessionMode::Practice, fixed_now());
        select(&mut exam, "q2", false);
        select(&mut practice, "q2", false);
        assert_eq!(exam.answers(), practice.answers());
    }

    #[test]
    fn timer_expiry_cancels_and_reveals() {
        let mut session = QuizSession::new(loaded(), SessionMode::Exam, fixed_now());
        select(&mut session, "q1", true);

        let t = session.apply(SessionEvent::TimerTick, fixed_now() + Duration::seconds(30));
        assert_eq!(t, Transition::Changed { persist: false });
        assert_eq!(
            session.timer_display(fixed_now() + Duration::seconds(30)).as_deref(),
            Some("00:30")
        );

        let t = session.apply(SessionEvent::TimerTick, fixed_now() + Duration::seconds(61));
        assert_eq!(t, Transition::TimerExpired);
        assert!(session.is_revealed());
        assert!(!session.has_running_timer());
        assert!(session.is_timer_expired());
        assert_eq!(
            session.timer_display(fixed_now() + Duration::hours(1)).as_deref(),
            Some("00:00")
        );
        assert_eq!(
            session.score_display(),
            ScoreDisplay::Visible { correct: 1, total: 2 }
        );

        let t = session.apply(SessionEvent::TimerTick, fixed_now() + Duration::seconds(62));
        assert_eq!(t, Transition::Ignored);
    }

    #[test]
    fn switching_to_practice_cancels_timer() {
        let mut session = QuizSession::new(loaded(), SessionMode::Exam, fixed_now());
        assert!(session.has_running_timer());
        session.apply(SessionEvent::ToggleMode, fixed_now());
        assert_eq!(session.mode(), SessionMode::Practice);
        assert!(session.timer().is_none());
        assert_eq!(session.timer_display(fixed_now()), None);
        assert_eq!(
            session.apply(SessionEvent::TimerTick, fixed_now() + Duration::hours(2)),
            Transition::Ignored
        );
        assert!(!session.is_revealed());
    }

    #[test]
    fn switching_to_same_mode_is_ignored() {
        let mut session = QuizSession::new(loaded(), SessionMode::Practice, fixed_now());
        assert_eq!(
            session.apply(SessionEvent::SwitchMode(SessionMode::Practice), fixed_now()),
            Transition::Ignored
        );
    }

    #[test]
    fn reset_is_idempotent_and_keeps_mode_and_seed() {
        let mut session = QuizSession::new(loaded(), SessionMode::Practice, fixed_now());
        select(&mut session, "q1", true);
        select(&mut session, "q2", true);
        session.apply(SessionEvent::Reveal, fixed_now());

        for _ in 0..2 {
            let t = session.apply(SessionEvent::Reset, fixed_now());
            assert!(t.should_persist());
            let progress = session.progress();
            assert_eq!(progress.answered, 0);
            assert_eq!(progress.correct, 0);
            assert!(!session.is_revealed());
        }
        assert_eq!(session.mode(), SessionMode::Practice);
        assert_eq!(session.seed(), Seed::new(42));
    }

    #[test]
    fn reveal_in_practice_discloses_without_persisting() {
        let mut session = QuizSession::new(loaded(), SessionMode::Practice, fixed_now());
        let t = session.apply(SessionEvent::Reveal, fixed_now());
        assert_eq!(t, Transition::Changed { persist: false });
        assert!(session.is_revealed());
    }

    #[test]
    fn restore_drops_stale_answers() {
        let mut session = QuizSession::new(loaded(), SessionMode::Practice, fixed_now());
        let mut stored = Answers::new();
        stored.record(QuestionId::new("q1"), 2);
        stored.record(QuestionId::new("q2"), 5);
        stored.record(QuestionId::new("gone"), 0);

        assert_eq!(session.restore_answers(stored), 2);
        assert_eq!(session.answers().get(&QuestionId::new("q1")), Some(2));
        assert_eq!(session.answers().len(), 1);
    }

    #[test]
    fn persisted_state_snapshots_mode_answers_and_seed() {
        let mut session = QuizSession::new(loaded(), SessionMode::Practice, fixed_now());
        select(&mut session, "q1", true);
        let state = session.persisted_state(fixed_now());
        assert_eq!(state.mode, SessionMode::Practice);
        assert_eq!(state.seed, Some(Seed::new(42)));
        assert_eq!(&state.answers, session.answers());
    }
}
