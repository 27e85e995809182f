#![forbid(unsafe_code)]

pub mod bank_service;
pub mod error;
pub mod extract;
pub mod parser;
pub mod quizzes;

pub use quiz_core::Clock;

pub use bank_service::{BankService, UploadReceipt};
pub use error::{BankServiceError, ExtractError, GenerateError, QuizFlowError};
pub use extract::{TextExtractor, Utf8TextExtractor};
pub use parser::QuestionParser;
pub use quizzes::{QuizFlowService, QuizGenerator, RandomSampler, SampleOrder};
