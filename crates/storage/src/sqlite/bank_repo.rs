use chrono::{DateTime, Utc};
use quiz_core::model::{BankId, Question, QuestionBank};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use super::SqliteRepository;
use super::mapping::{
    bank_id_from_text, conn, map_question_row, options_to_json, question_id_to_i64, ser,
};
use crate::repository::{BankSummary, QuestionBankRepository, StorageError};

fn total_from_i64(v: i64) -> Result<usize, StorageError> {
    usize::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid total: {v}")))
}

fn map_summary_row(row: &SqliteRow) -> Result<BankSummary, StorageError> {
    Ok(BankSummary {
        id: bank_id_from_text(&row.try_get::<String, _>("id").map_err(ser)?)?,
        source_name: row.try_get("source_name").map_err(ser)?,
        total_questions: total_from_i64(row.try_get::<i64, _>("total").map_err(ser)?)?,
        uploaded_at: row.try_get("uploaded_at").map_err(ser)?,
    })
}

impl SqliteRepository {
    /// Question count for `id`, or `None` when the bank does not exist.
    async fn bank_total(&self, id: BankId) -> Result<Option<usize>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT (SELECT COUNT(*) FROM questions q WHERE q.bank_id = b.id) AS total
            FROM banks b WHERE b.id = ?1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.map(|row| total_from_i64(row.try_get::<i64, _>("total").map_err(ser)?))
            .transpose()
    }
}

#[async_trait::async_trait]
impl QuestionBankRepository for SqliteRepository {
    async fn save_bank(&self, bank: &QuestionBank) -> Result<(), StorageError> {
        let bank_id = bank.id().to_string();
        let mut tx = self.pool.begin().await.map_err(conn)?;

        sqlx::query(
            r"
            INSERT INTO banks (id, source_name, uploaded_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                source_name = excluded.source_name,
                uploaded_at = excluded.uploaded_at
            ",
        )
        .bind(&bank_id)
        .bind(bank.source_name())
        .bind(bank.uploaded_at())
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        sqlx::query("DELETE FROM questions WHERE bank_id = ?1")
            .bind(&bank_id)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        for (position, question) in bank.questions().iter().enumerate() {
            let position = i64::try_from(position)
                .map_err(|_| StorageError::Serialization("position overflow".into()))?;
            sqlx::query(
                r"
                INSERT INTO questions (bank_id, position, question_id, text, options)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ",
            )
            .bind(&bank_id)
            .bind(position)
            .bind(question_id_to_i64(question.id())?)
            .bind(question.text())
            .bind(options_to_json(question.options())?)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)?;
        log::debug!("saved bank {} with {} questions", bank_id, bank.total());
        Ok(())
    }

    async fn get_bank(&self, id: BankId) -> Result<QuestionBank, StorageError> {
        let row = sqlx::query("SELECT source_name, uploaded_at FROM banks WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?
            .ok_or(StorageError::NotFound)?;

        let source_name: String = row.try_get("source_name").map_err(ser)?;
        let uploaded_at: DateTime<Utc> = row.try_get("uploaded_at").map_err(ser)?;

        let rows = sqlx::query(
            r"
            SELECT question_id, text, options
            FROM questions
            WHERE bank_id = ?1
            ORDER BY position ASC
            ",
        )
        .bind(id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let questions = rows
            .iter()
            .map(map_question_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(QuestionBank::new(id, source_name, questions, uploaded_at))
    }

    async fn count_questions(&self, id: BankId) -> Result<usize, StorageError> {
        self.bank_total(id).await?.ok_or(StorageError::NotFound)
    }

    async fn questions_in_range(
        &self,
        id: BankId,
        start: u64,
        end: u64,
    ) -> Result<Vec<Question>, StorageError> {
        if self.bank_total(id).await?.is_none() {
            return Err(StorageError::NotFound);
        }
        let Ok(start) = i64::try_from(start) else {
            return Ok(Vec::new());
        };
        let end = i64::try_from(end).unwrap_or(i64::MAX);

        let rows = sqlx::query(
            r"
            SELECT question_id, text, options
            FROM questions
            WHERE bank_id = ?1 AND question_id BETWEEN ?2 AND ?3
            ORDER BY position ASC
            ",
        )
        .bind(id.to_string())
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_question_row).collect()
    }

    async fn delete_bank(&self, id: BankId) -> Result<bool, StorageError> {
        let res = sqlx::query("DELETE FROM banks WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(res.rows_affected() > 0)
    }

    async fn list_banks(&self, limit: u32) -> Result<Vec<BankSummary>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT b.id, b.source_name, b.uploaded_at,
                   (SELECT COUNT(*) FROM questions q WHERE q.bank_id = b.id) AS total
            FROM banks b
            ORDER BY b.uploaded_at DESC, b.id ASC
            LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_summary_row).collect()
    }
}
