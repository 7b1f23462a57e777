#![forbid(unsafe_code)]

pub mod repository;
pub mod source;
pub mod sqlite;

pub use repository::{InMemoryRepository, QuizStateRepository, Storage, StorageError};
pub use source::{DirectoryQuizSource, HttpQuizSource, InMemoryQuizSource, QuizSource, SourceError};
