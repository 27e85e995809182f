use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, rng};

use quiz_core::RangeSelection;
use quiz_core::model::Question;

use crate::error::GenerateError;

/// Picks the questions for a quiz from a window of the bank.
pub trait QuizGenerator: Send + Sync {
    /// `pool` holds the bank questions whose number lies inside `selection`,
    /// in bank order. Implementations return exactly `selection.count()` of them.
    ///
    /// # Errors
    ///
    /// Returns `GenerateError::NotEnoughQuestions` if `pool` is too small.
    fn generate(
        &self,
        pool: Vec<Question>,
        selection: &RangeSelection,
    ) -> Result<Vec<Question>, GenerateError>;
}

/// Order in which sampled questions are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleOrder {
    /// Random order, as drawn.
    #[default]
    Shuffled,
    /// Same order as in the source document.
    BankOrder,
}

/// Uniform random sample without replacement.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSampler {
    order: SampleOrder,
    seed: Option<u64>,
}

impl RandomSampler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_order(mut self, order: SampleOrder) -> Self {
        self.order = order;
        self
    }

    /// Fix the seed so the same pool always yields the same quiz.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn sample_with<R: Rng + ?Sized>(
        &self,
        mut pool: Vec<Question>,
        selection: &RangeSelection,
        rng: &mut R,
    ) -> Result<Vec<Question>, GenerateError> {
        let requested = selection.count();
        let take = usize::try_from(requested)
            .ok()
            .filter(|n| *n <= pool.len())
            .ok_or(GenerateError::NotEnoughQuestions {
                start: selection.start(),
                end: selection.end(),
                found: pool.len(),
                requested,
            })?;

        pool.shuffle(rng);
        pool.truncate(take);

        if self.order == SampleOrder::BankOrder {
            pool.sort_by_key(Question::id);
        }
        log::debug!(
            "sampled {} of range {}-{}",
            pool.len(),
            selection.start(),
            selection.end()
        );
        Ok(pool)
    }
}

impl QuizGenerator for RandomSampler {
    fn generate(
        &self,
        pool: Vec<Question>,
        selection: &RangeSelection,
    ) -> Result<Vec<Question>, GenerateError> {
        match self.seed {
            Some(seed) => self.sample_with(pool, selection, &mut StdRng::seed_from_u64(seed)),
            None => self.sample_with(pool, selection, &mut rng()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::QuestionId;
    use quiz_core::validate;
    use std::collections::HashSet;

    fn pool(ids: impl IntoIterator<Item = u64>) -> Vec<Question> {
        ids.into_iter()
            .map(|id| {
                Question::new(QuestionId::new(id), format!("Q{id}"), ["a", "b", "c", "d"]).unwrap()
            })
            .collect()
    }

    fn ids(questions: &[Question]) -> Vec<u64> {
        questions.iter().map(|q| q.id().value()).collect()
    }

    #[test]
    fn samples_exact_count_without_repeats() {
        let selection = validate(100, 10, 40, 12).unwrap();
        let picked = RandomSampler::new()
            .generate(pool(10..=40), &selection)
            .unwrap();

        assert_eq!(picked.len(), 12);
        let unique: HashSet<_> = picked.iter().map(Question::id).collect();
        assert_eq!(unique.len(), 12);
        assert!(picked.iter().all(|q| (10..=40).contains(&q.id().value())));
    }

    #[test]
    fn same_seed_same_quiz() {
        let selection = validate(50, 1, 50, 10).unwrap();
        let sampler = RandomSampler::new().with_seed(42);
        let a = sampler.generate(pool(1..=50), &selection).unwrap();
        let b = sampler.generate(pool(1..=50), &selection).unwrap();
        assert_eq!(ids(&a), ids(&b));
    }

    #[test]
    fn bank_order_sorts_the_sample() {
        let selection = validate(30, 1, 30, 8).unwrap();
        let picked = RandomSampler::new()
            .with_seed(7)
            .with_order(SampleOrder::BankOrder)
            .generate(pool(1..=30), &selection)
            .unwrap();
        let got = ids(&picked);
        let mut sorted = got.clone();
        sorted.sort_unstable();
        assert_eq!(got, sorted);
    }

    #[test]
    fn whole_window_is_returned_when_count_equals_pool() {
        let selection = validate(5, 1, 5, 5).unwrap();
        let picked = RandomSampler::new()
            .with_order(SampleOrder::BankOrder)
            .generate(pool(1..=5), &selection)
            .unwrap();
        assert_eq!(ids(&picked), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn sparse_window_reports_shortfall() {
        // Question numbers need not be contiguous, so a feasible window can still come up short.
        let selection = validate(5, 1, 5, 3).unwrap();
        let err = RandomSampler::new()
            .generate(pool([1, 4]), &selection)
            .unwrap_err();
        assert_eq!(
            err,
            GenerateError::NotEnoughQuestions {
                start: 1,
                end: 5,
                found: 2,
                requested: 3
            }
        );
    }
}
