use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("a question needs at least 2 options, got {len}")]
    TooFewOptions { len: usize },

    #[error("option {index} cannot be empty")]
    EmptyOption { index: usize },
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A multiple-choice question taken from a question bank.
///
/// Immutable once built; the quiz only ever reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuestionWire")]
pub struct Question {
    id: QuestionId,
    #[serde(rename = "question")]
    text: String,
    options: Vec<String>,
}

/// Unchecked shape used when deserializing; funnels through `Question::new`.
#[derive(Deserialize)]
struct QuestionWire {
    id: QuestionId,
    question: String,
    options: Vec<String>,
}

impl TryFrom<QuestionWire> for Question {
    type Error = QuestionError;

    fn try_from(wire: QuestionWire) -> Result<Self, Self::Error> {
        Question::new(wire.id, wire.question, wire.options)
    }
}

impl Question {
    /// Builds a question, trimming the text and every option.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the text is blank, if fewer than two options
    /// are given, or if any option is blank.
    pub fn new<T, O>(id: QuestionId, text: T, options: O) -> Result<Self, QuestionError>
    where
        T: Into<String>,
        O: IntoIterator,
        O::Item: Into<String>,
    {
        let text = text.into().trim().to_owned();
        if text.is_empty() {
            return Err(QuestionError::EmptyText);
        }

        let options: Vec<String> = options
            .into_iter()
            .map(|opt| opt.into().trim().to_owned())
            .collect();
        if options.len() < 2 {
            return Err(QuestionError::TooFewOptions { len: options.len() });
        }
        if let Some(index) = options.iter().position(String::is_empty) {
            return Err(QuestionError::EmptyOption { index });
        }

        Ok(Self { id, text, options })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    /// Returns the option at `index`, if any.
    #[must_use]
    pub fn option(&self, index: usize) -> Option<&str> {
        self.options.get(index).map(String::as_str)
    }
}

/// Letter label for an option position: 0 → `A`, 1 → `B`, ...
///
/// Positions past `Z` fall back to the 1-based number.
#[must_use]
pub fn option_label(index: usize) -> String {
    match u8::try_from(index) {
        Ok(i) if i < 26 => char::from(b'A' + i).to_string(),
        _ => (index + 1).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_trims_text_and_options() {
        let q = Question::new(QuestionId::new(101), "  Capital of France? ", [" Paris ", "Rome"])
            .unwrap();
        assert_eq!(q.text(), "Capital of France?");
        assert_eq!(q.options(), ["Paris", "Rome"]);
        assert_eq!(q.option(1), Some("Rome"));
        assert_eq!(q.option(2), None);
    }

    #[test]
    fn question_rejects_blank_text() {
        let err = Question::new(QuestionId::new(1), "   ", ["a", "b"]).unwrap_err();
        assert_eq!(err, QuestionError::EmptyText);
    }

    #[test]
    fn question_needs_two_options() {
        let err = Question::new(QuestionId::new(1), "Q", ["only"]).unwrap_err();
        assert_eq!(err, QuestionError::TooFewOptions { len: 1 });
    }

    #[test]
    fn question_rejects_blank_option() {
        let err = Question::new(QuestionId::new(1), "Q", ["a", " ", "c"]).unwrap_err();
        assert_eq!(err, QuestionError::EmptyOption { index: 1 });
    }

    #[test]
    fn option_labels_are_letters() {
        assert_eq!(option_label(0), "A");
        assert_eq!(option_label(3), "D");
        assert_eq!(option_label(25), "Z");
        assert_eq!(option_label(26), "27");
    }
}
