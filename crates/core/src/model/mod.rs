mod export;
mod ids;
mod item;
mod quiz;
mod session;

pub use export::ExportRecord;
pub use ids::{QuestionId, QuizId, QuizIdError};
pub use item::SessionItem;
pub use quiz::{DEFAULT_TIMER_MINUTES, MAX_TIMER_MINUTES, QuestionSpec, QuizDefinition, QuizError};
pub use session::{Answers, ParseModeError, PersistedState, SessionMode};
