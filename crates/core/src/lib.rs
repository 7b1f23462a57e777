#![forbid(unsafe_code)]

pub mod model;
pub mod shuffle;
pub mod time;
pub mod timer;

pub use shuffle::{Mulberry32, Seed, SubSeed, shuffle};
pub use time::Clock;
pub use timer::{ExamTimer, TimerTick, format_remaining};
