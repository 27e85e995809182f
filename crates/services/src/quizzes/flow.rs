use std::sync::Arc;

use quiz_core::model::{BankId, Question};
use quiz_core::{QuizSession, RangeRequest, RangeSelection};
use storage::repository::QuestionBankRepository;

use super::generator::QuizGenerator;
use crate::error::QuizFlowError;

/// Orchestrates range validation, quiz generation and session start.
#[derive(Clone)]
pub struct QuizFlowService {
    banks: Arc<dyn QuestionBankRepository>,
    generator: Arc<dyn QuizGenerator>,
}

impl QuizFlowService {
    #[must_use]
    pub fn new(banks: Arc<dyn QuestionBankRepository>, generator: Arc<dyn QuizGenerator>) -> Self {
        Self { banks, generator }
    }

    /// Validate a requested range against the bank's current size.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::Validation` with the first failing check, or
    /// `QuizFlowError::Storage` if the bank cannot be read.
    pub async fn configure(
        &self,
        bank_id: BankId,
        request: RangeRequest,
    ) -> Result<RangeSelection, QuizFlowError> {
        let total = self.banks.count_questions(bank_id).await?;
        let total = i64::try_from(total).unwrap_or(i64::MAX);
        Ok(request.validate(total)?)
    }

    /// Draw the questions for an accepted selection.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::Generate` if the window holds too few questions
    /// and `QuizFlowError::CountMismatch` if the generator breaks its contract.
    pub async fn generate(
        &self,
        bank_id: BankId,
        selection: &RangeSelection,
    ) -> Result<Vec<Question>, QuizFlowError> {
        let pool = self
            .banks
            .questions_in_range(bank_id, selection.start(), selection.end())
            .await?;
        let questions = self.generator.generate(pool, selection)?;

        if u64::try_from(questions.len()).ok() != Some(selection.count()) {
            return Err(QuizFlowError::CountMismatch {
                expected: selection.count(),
                returned: questions.len(),
            });
        }
        Ok(questions)
    }

    /// Validate, generate and start a quiz in one step.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Self::configure`] and [`Self::generate`], plus
    /// `QuizFlowError::Quiz` if the questions cannot form a session.
    pub async fn start_quiz(
        &self,
        bank_id: BankId,
        request: RangeRequest,
    ) -> Result<QuizSession, QuizFlowError> {
        let selection = self.configure(bank_id, request).await?;
        let questions = self.generate(bank_id, &selection).await?;
        let session = QuizSession::new(questions)?;
        log::info!(
            "started quiz on bank {bank_id}: {} questions from {}-{}",
            session.total_questions(),
            selection.start(),
            selection.end()
        );
        Ok(session)
    }
}
