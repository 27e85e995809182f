use chrono::{DateTime, Utc};

use crate::model::ids::BankId;
use crate::model::question::Question;

/// The ordered set of questions extracted from one uploaded document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBank {
    id: BankId,
    source_name: String,
    questions: Vec<Question>,
    uploaded_at: DateTime<Utc>,
}

impl QuestionBank {
    #[must_use]
    pub fn new(
        id: BankId,
        source_name: impl Into<String>,
        questions: Vec<Question>,
        uploaded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            source_name: source_name.into(),
            questions,
            uploaded_at,
        }
    }

    #[must_use]
    pub fn id(&self) -> BankId {
        self.id
    }

    #[must_use]
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn uploaded_at(&self) -> DateTime<Utc> {
        self.uploaded_at
    }

    /// Number of questions known for this bank.
    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// Questions whose number lies in `[start, end]`, in bank order.
    #[must_use]
    pub fn in_range(&self, start: u64, end: u64) -> Vec<&Question> {
        self.questions
            .iter()
            .filter(|q| (start..=end).contains(&q.id().value()))
            .collect()
    }
}
