mod export;
mod loader;
mod persistence;
mod progress;
mod service;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::{InvalidSelection, LoadError};
pub use export::export_json;
pub use loader::{LoadedQuiz, QuizLoader, build_items};
pub use persistence::SessionStore;
pub use progress::{
    ScoreDisplay, SessionProgress, answered_count, correct_count, progress_percent,
};
pub use service::{QuizSession, SessionEvent, Transition};
pub use view::{Feedback, ItemView, SessionView};
pub use workflow::{SessionLoopService, StartRequest};
