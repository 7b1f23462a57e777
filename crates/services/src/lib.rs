#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod sessions;

pub use quiz_core::Clock;
pub use sessions as session;

pub use app_services::{AppServices, QuizSourceConfig};
pub use error::{AppServicesError, InvalidSelection, LoadError};

pub use sessions::{
    Feedback, QuizSession, ScoreDisplay, SessionEvent, SessionLoopService, SessionView,
    StartRequest, Transition,
};
