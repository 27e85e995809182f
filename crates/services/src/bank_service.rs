use std::sync::Arc;

use serde::Serialize;

use quiz_core::Clock;
use quiz_core::model::{BankId, QuestionBank};
use storage::repository::{BankSummary, QuestionBankRepository};

use crate::error::BankServiceError;
use crate::extract::TextExtractor;
use crate::parser::QuestionParser;

/// What the caller gets back from an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UploadReceipt {
    #[serde(rename = "pdf_id")]
    pub bank_id: BankId,
    pub total_questions: usize,
}

/// Accepts documents, parses them into question banks and stores them.
#[derive(Clone)]
pub struct BankService {
    clock: Clock,
    extractor: Arc<dyn TextExtractor>,
    parser: QuestionParser,
    banks: Arc<dyn QuestionBankRepository>,
}

impl BankService {
    /// # Errors
    ///
    /// Returns `BankServiceError::Pattern` if the question parser cannot be built.
    pub fn new(
        clock: Clock,
        extractor: Arc<dyn TextExtractor>,
        banks: Arc<dyn QuestionBankRepository>,
    ) -> Result<Self, BankServiceError> {
        Ok(Self {
            clock,
            extractor,
            parser: QuestionParser::new()?,
            banks,
        })
    }

    /// Extract, parse and store a document under a fresh `BankId`.
    ///
    /// A document with no recognisable questions is still stored; its total is zero.
    ///
    /// # Errors
    ///
    /// Returns `BankServiceError::Extract` if the document cannot be read and
    /// `BankServiceError::Storage` if the bank cannot be saved.
    pub async fn upload(
        &self,
        source_name: &str,
        document: &[u8],
    ) -> Result<UploadReceipt, BankServiceError> {
        let text = self.extractor.extract(document)?;
        let questions = self.parser.parse(&text);
        if questions.is_empty() {
            log::warn!("no questions found in {source_name}");
        }

        let bank = QuestionBank::new(BankId::generate(), source_name, questions, self.clock.now());
        self.banks.save_bank(&bank).await?;
        log::info!(
            "uploaded {source_name} as bank {} with {} questions",
            bank.id(),
            bank.total()
        );

        Ok(UploadReceipt {
            bank_id: bank.id(),
            total_questions: bank.total(),
        })
    }

    /// Current size of a stored bank.
    ///
    /// # Errors
    ///
    /// Returns `BankServiceError::Storage` if the bank is missing or unreadable.
    pub async fn total_questions(&self, bank_id: BankId) -> Result<usize, BankServiceError> {
        Ok(self.banks.count_questions(bank_id).await?)
    }

    /// Discard a bank. Returns `false` if it was already gone.
    ///
    /// # Errors
    ///
    /// Returns `BankServiceError::Storage` on backend failures.
    pub async fn remove(&self, bank_id: BankId) -> Result<bool, BankServiceError> {
        let removed = self.banks.delete_bank(bank_id).await?;
        if removed {
            log::debug!("removed bank {bank_id}");
        }
        Ok(removed)
    }

    /// Most recent uploads first.
    ///
    /// # Errors
    ///
    /// Returns `BankServiceError::Storage` on backend failures.
    pub async fn list(&self, limit: u32) -> Result<Vec<BankSummary>, BankServiceError> {
        Ok(self.banks.list_banks(limit).await?)
    }
}
