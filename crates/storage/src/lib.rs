#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{BankSummary, InMemoryRepository, QuestionBankRepository, Storage, StorageError};
