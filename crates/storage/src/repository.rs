use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_core::model::{BankId, Question, QuestionBank};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Listing entry for a stored bank, without its questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankSummary {
    pub id: BankId,
    pub source_name: String,
    pub total_questions: usize,
    pub uploaded_at: DateTime<Utc>,
}

impl BankSummary {
    #[must_use]
    pub fn from_bank(bank: &QuestionBank) -> Self {
        Self {
            id: bank.id(),
            source_name: bank.source_name().to_owned(),
            total_questions: bank.total(),
            uploaded_at: bank.uploaded_at(),
        }
    }
}

/// Repository contract for parsed question banks.
#[async_trait]
pub trait QuestionBankRepository: Send + Sync {
    /// Persist a bank, replacing any bank stored under the same id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the bank cannot be stored.
    async fn save_bank(&self, bank: &QuestionBank) -> Result<(), StorageError>;

    /// Fetch a bank with all of its questions.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_bank(&self, id: BankId) -> Result<QuestionBank, StorageError>;

    /// Number of questions stored for a bank.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the bank is missing.
    async fn count_questions(&self, id: BankId) -> Result<usize, StorageError>;

    /// Questions whose number lies in `[start, end]`, in bank order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the bank is missing.
    async fn questions_in_range(
        &self,
        id: BankId,
        start: u64,
        end: u64,
    ) -> Result<Vec<Question>, StorageError>;

    /// Remove a bank. Returns `false` if there was nothing to remove.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn delete_bank(&self, id: BankId) -> Result<bool, StorageError>;

    /// Most recently uploaded banks first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_banks(&self, limit: u32) -> Result<Vec<BankSummary>, StorageError>;
}

/// Simple in-memory repository implementation for testing and ephemeral runs.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    banks: Arc<Mutex<HashMap<BankId, QuestionBank>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            banks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn with_bank<T>(
        &self,
        id: BankId,
        f: impl FnOnce(&QuestionBank) -> T,
    ) -> Result<T, StorageError> {
        let guard = self
            .banks
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.get(&id).map(f).ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl QuestionBankRepository for InMemoryRepository {
    async fn save_bank(&self, bank: &QuestionBank) -> Result<(), StorageError> {
        let mut guard = self
            .banks
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(bank.id(), bank.clone());
        Ok(())
    }

    async fn get_bank(&self, id: BankId) -> Result<QuestionBank, StorageError> {
        self.with_bank(id, QuestionBank::clone)
    }

    async fn count_questions(&self, id: BankId) -> Result<usize, StorageError> {
        self.with_bank(id, QuestionBank::total)
    }

    async fn questions_in_range(
        &self,
        id: BankId,
        start: u64,
        end: u64,
    ) -> Result<Vec<Question>, StorageError> {
        self.with_bank(id, |bank| {
            bank.in_range(start, end).into_iter().cloned().collect()
        })
    }

    async fn delete_bank(&self, id: BankId) -> Result<bool, StorageError> {
        let mut guard = self
            .banks
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.remove(&id).is_some())
    }

    async fn list_banks(&self, limit: u32) -> Result<Vec<BankSummary>, StorageError> {
        let guard = self
            .banks
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut banks: Vec<BankSummary> = guard.values().map(BankSummary::from_bank).collect();
        banks.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at).then(a.id.cmp(&b.id)));
        banks.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(banks)
    }
}

/// Bundles the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub banks: Arc<dyn QuestionBankRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let banks: Arc<dyn QuestionBankRepository> = Arc::new(InMemoryRepository::new());
        Self { banks }
    }
}
