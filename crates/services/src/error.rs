//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::{QuizError, ValidationError};
use storage::repository::StorageError;

/// Errors emitted by a `TextExtractor`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExtractError {
    #[error("document is empty")]
    Empty,
    #[error("document is not valid UTF-8 text")]
    NotText(#[from] std::string::FromUtf8Error),
}

/// Errors emitted by `BankService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BankServiceError {
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error("question pattern failed to compile")]
    Pattern(#[from] regex::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by a `QuizGenerator`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GenerateError {
    #[error(
        "not enough questions in range {start}-{end}: found {found}, requested {requested}"
    )]
    NotEnoughQuestions {
        start: u64,
        end: u64,
        found: usize,
        requested: u64,
    },
}

/// Errors emitted by `QuizFlowService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizFlowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error("generator returned {returned} questions, expected {expected}")]
    CountMismatch { expected: u64, returned: usize },
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl QuizFlowError {
    /// True when the message can be shown to the user as input feedback.
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Generate(_))
    }
}
