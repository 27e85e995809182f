#![forbid(unsafe_code)]

pub mod model;
pub mod quiz;
pub mod selection;
pub mod time;

pub use quiz::{QuizError, QuizProgress, QuizSession, QuizState, StateError};
pub use selection::{RangeRequest, RangeSelection, ValidationError, validate};
pub use time::Clock;
