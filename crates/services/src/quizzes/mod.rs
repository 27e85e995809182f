mod flow;
mod generator;

// Public API of the quiz subsystem.
pub use crate::error::{GenerateError, QuizFlowError};
pub use flow::QuizFlowService;
pub use generator::{QuizGenerator, RandomSampler, SampleOrder};
