//! Range selection: which window of a question bank to draw a quiz from.
//!
//! Checks run in a fixed order and the first failure wins, so a user who got
//! several things wrong always sees the same single message.

use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("start must be at least 1")]
    InvalidStart,

    #[error("end cannot exceed total available questions ({total})")]
    EndExceedsTotal { total: i64 },

    #[error("start must be ≤ end")]
    StartAfterEnd,

    #[error(
        "requested count exceeds available questions in range (available: {available}, requested: {requested})"
    )]
    InsufficientRange { available: i64, requested: i64 },

    #[error("count must be at least 1")]
    InvalidCount { count: i64 },
}

//
// ─── REQUEST ───────────────────────────────────────────────────────────────────
//

/// Raw, unchecked range input as typed by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeRequest {
    pub start: i64,
    pub end: i64,
    pub count: i64,
}

impl RangeRequest {
    /// Upper bound suggested for `end` when a bank is first opened.
    pub const DEFAULT_END_CAP: i64 = 100;
    /// Suggested number of questions per quiz.
    pub const DEFAULT_COUNT: i64 = 10;

    #[must_use]
    pub fn new(start: i64, end: i64, count: i64) -> Self {
        Self { start, end, count }
    }

    /// Form defaults for a bank of `total` questions: the first hundred, ten of them.
    #[must_use]
    pub fn default_for(total: i64) -> Self {
        Self {
            start: 1,
            end: total.min(Self::DEFAULT_END_CAP),
            count: Self::DEFAULT_COUNT,
        }
    }

    /// Validate this request against a bank of `total` questions.
    ///
    /// # Errors
    ///
    /// See [`validate`].
    pub fn validate(self, total: i64) -> Result<RangeSelection, ValidationError> {
        validate(total, self.start, self.end, self.count)
    }
}

//
// ─── SELECTION ─────────────────────────────────────────────────────────────────
//

/// A feasible `[start, end]` window and sample size.
///
/// Only [`validate`] builds one, so every value satisfies
/// `1 ≤ start ≤ end ≤ total` and `1 ≤ count ≤ end - start + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RangeSelection {
    start: u64,
    end: u64,
    count: u64,
}

impl RangeSelection {
    #[must_use]
    pub fn start(&self) -> u64 {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> u64 {
        self.end
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Number of positions in the window (`end - start + 1`).
    #[must_use]
    pub fn span(&self) -> u64 {
        self.end - self.start + 1
    }
}

/// Check a user-chosen window and quantity against a bank of `total` questions.
///
/// Pure and deterministic.
///
/// # Errors
///
/// Returns the first failing check, in this order:
/// `InvalidStart`, `EndExceedsTotal`, `StartAfterEnd`, `InsufficientRange`, `InvalidCount`.
pub fn validate(
    total: i64,
    start: i64,
    end: i64,
    count: i64,
) -> Result<RangeSelection, ValidationError> {
    if start < 1 {
        return Err(ValidationError::InvalidStart);
    }
    if end > total {
        return Err(ValidationError::EndExceedsTotal { total });
    }
    if start > end {
        return Err(ValidationError::StartAfterEnd);
    }

    // 1 <= start <= end, so this cannot overflow.
    let available = end - start + 1;
    if count > available {
        return Err(ValidationError::InsufficientRange {
            available,
            requested: count,
        });
    }
    if count < 1 {
        return Err(ValidationError::InvalidCount { count });
    }

    Ok(RangeSelection {
        start: start.unsigned_abs(),
        end: end.unsigned_abs(),
        count: count.unsigned_abs(),
    })
}
