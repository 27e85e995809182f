use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::model::{Question, QuestionId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Reasons a quiz cannot be built from a generated question list.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("a quiz needs at least one question")]
    Empty,

    #[error("question {id} appears more than once")]
    DuplicateQuestion { id: QuestionId },
}

/// A transition was attempted that the current state does not allow.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StateError {
    #[error("quiz already completed")]
    Completed,

    #[error("option {index} is out of range for question {question} ({options} options)")]
    OptionOutOfRange {
        question: QuestionId,
        index: usize,
        options: usize,
    },
}

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum QuizState {
    InProgress,
    Completed,
}

/// Snapshot of where the user is, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuizProgress {
    /// 1-based position of the current question.
    pub position: usize,
    pub total: usize,
    pub answered: usize,
    pub is_complete: bool,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One traversal of a generated quiz.
///
/// Navigation is strictly sequential. Answers are optional and can be changed
/// until the quiz completes; stepping past the last question completes it.
pub struct QuizSession {
    questions: Vec<Question>,
    current: usize,
    answers: HashMap<QuestionId, usize>,
    state: QuizState,
}

impl QuizSession {
    /// Start a quiz over `questions`, positioned on the first one.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Empty` if no questions are given and
    /// `QuizError::DuplicateQuestion` if two questions share an id.
    pub fn new(questions: Vec<Question>) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::Empty);
        }

        let mut seen = HashSet::with_capacity(questions.len());
        if let Some(dup) = questions.iter().find(|q| !seen.insert(q.id())) {
            return Err(QuizError::DuplicateQuestion { id: dup.id() });
        }

        Ok(Self {
            questions,
            current: 0,
            answers: HashMap::new(),
            state: QuizState::InProgress,
        })
    }

    #[must_use]
    pub fn state(&self) -> QuizState {
        self.state
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state == QuizState::Completed
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Number of questions in this quiz (never zero).
    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The question under the cursor. Stays on the last question once completed.
    #[must_use]
    pub fn current_question(&self) -> &Question {
        &self.questions[self.current]
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    /// True on the last question, where `next` finishes the quiz.
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current + 1 == self.questions.len()
    }

    /// Option chosen for `id`, or `None` if unanswered.
    #[must_use]
    pub fn answer_for(&self, id: QuestionId) -> Option<usize> {
        self.answers.get(&id).copied()
    }

    #[must_use]
    pub fn answers(&self) -> &HashMap<QuestionId, usize> {
        &self.answers
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    /// Fraction of the quiz reached, `(current + 1) / len`, in `(0, 1]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self) -> f64 {
        (self.current + 1) as f64 / self.questions.len() as f64
    }

    #[must_use]
    pub fn status(&self) -> QuizProgress {
        QuizProgress {
            position: self.current + 1,
            total: self.questions.len(),
            answered: self.answers.len(),
            is_complete: self.is_complete(),
        }
    }

    /// Select `option` for the current question, replacing any earlier choice.
    ///
    /// Does not move the cursor.
    ///
    /// # Errors
    ///
    /// Returns `StateError::Completed` after completion and
    /// `StateError::OptionOutOfRange` if `option` does not name one of the
    /// current question's options.
    pub fn record_answer(&mut self, option: usize) -> Result<(), StateError> {
        self.ensure_in_progress()?;

        let question = &self.questions[self.current];
        if option >= question.option_count() {
            return Err(StateError::OptionOutOfRange {
                question: question.id(),
                index: option,
                options: question.option_count(),
            });
        }

        self.answers.insert(question.id(), option);
        Ok(())
    }

    /// Move to the next question, or complete the quiz when on the last one.
    ///
    /// Unanswered questions stay unanswered; completion never blocks on them.
    ///
    /// # Errors
    ///
    /// Returns `StateError::Completed` if the quiz is already complete.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<QuizState, StateError> {
        self.ensure_in_progress()?;

        if self.is_last() {
            self.state = QuizState::Completed;
        } else {
            self.current += 1;
        }
        Ok(self.state)
    }

    /// Move back one question. A no-op on the first question.
    ///
    /// # Errors
    ///
    /// Returns `StateError::Completed` if the quiz is already complete.
    pub fn previous(&mut self) -> Result<(), StateError> {
        self.ensure_in_progress()?;
        self.current = self.current.saturating_sub(1);
        Ok(())
    }

    fn ensure_in_progress(&self) -> Result<(), StateError> {
        match self.state {
            QuizState::InProgress => Ok(()),
            QuizState::Completed => Err(StateError::Completed),
        }
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("answers_len", &self.answers.len())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: u64) -> Question {
        Question::new(
            QuestionId::new(id),
            format!("Question {id}?"),
            ["A", "B", "C", "D"],
        )
        .unwrap()
    }

    fn session(n: u64) -> QuizSession {
        QuizSession::new((1..=n).map(question).collect()).unwrap()
    }

    #[test]
    fn new_session_starts_on_first_question() {
        let quiz = session(3);
        assert_eq!(quiz.state(), QuizState::InProgress);
        assert_eq!(quiz.current_index(), 0);
        assert!(quiz.answers().is_empty());
        assert!(quiz.is_first());
        assert!(!quiz.is_last());
    }

    #[test]
    fn empty_quiz_is_rejected() {
        assert_eq!(QuizSession::new(Vec::new()).unwrap_err(), QuizError::Empty);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = QuizSession::new(vec![question(4), question(5), question(4)]).unwrap_err();
        assert_eq!(
            err,
            QuizError::DuplicateQuestion {
                id: QuestionId::new(4)
            }
        );
    }

    #[test]
    fn stepping_past_last_question_completes() {
        let mut quiz = session(3);
        assert_eq!(quiz.next().unwrap(), QuizState::InProgress);
        assert_eq!(quiz.next().unwrap(), QuizState::InProgress);
        assert!(quiz.is_last());
        assert!(!quiz.is_complete());

        assert_eq!(quiz.next().unwrap(), QuizState::Completed);
        assert!(quiz.is_complete());
        assert_eq!(quiz.current_index(), 2);
        assert_eq!(quiz.current_question().id(), QuestionId::new(3));
    }

    #[test]
    fn single_question_quiz_completes_on_first_next() {
        let mut quiz = session(1);
        assert!(quiz.is_first() && quiz.is_last());
        assert_eq!(quiz.next().unwrap(), QuizState::Completed);
    }

    #[test]
    fn previous_on_first_question_is_a_noop() {
        let mut quiz = session(2);
        for _ in 0..3 {
            quiz.previous().unwrap();
        }
        assert_eq!(quiz.current_index(), 0);
        assert_eq!(quiz.state(), QuizState::InProgress);
    }

    #[test]
    fn previous_moves_back_one() {
        let mut quiz = session(3);
        quiz.next().unwrap();
        quiz.next().unwrap();
        quiz.previous().unwrap();
        assert_eq!(quiz.current_index(), 1);
    }

    #[test]
    fn answering_again_overwrites() {
        let mut quiz = session(2);
        quiz.record_answer(1).unwrap();
        quiz.record_answer(1).unwrap();
        assert_eq!(quiz.answer_for(QuestionId::new(1)), Some(1));

        quiz.record_answer(3).unwrap();
        assert_eq!(quiz.answer_for(QuestionId::new(1)), Some(3));
        assert_eq!(quiz.answered_count(), 1);
        assert_eq!(quiz.current_index(), 0);
    }

    #[test]
    fn revisited_question_keeps_and_changes_answer() {
        let mut quiz = session(2);
        quiz.record_answer(2).unwrap();
        quiz.next().unwrap();
        quiz.previous().unwrap();
        assert_eq!(quiz.answer_for(quiz.current_question().id()), Some(2));
        quiz.record_answer(0).unwrap();
        assert_eq!(quiz.answer_for(QuestionId::new(1)), Some(0));
    }

    #[test]
    fn out_of_range_option_is_rejected_without_clamping() {
        let mut quiz = session(1);
        let err = quiz.record_answer(4).unwrap_err();
        assert_eq!(
            err,
            StateError::OptionOutOfRange {
                question: QuestionId::new(1),
                index: 4,
                options: 4
            }
        );
        assert!(quiz.answers().is_empty());
    }

    #[test]
    fn completed_quiz_rejects_every_transition() {
        let mut quiz = session(1);
        quiz.next().unwrap();
        assert_eq!(quiz.record_answer(0), Err(StateError::Completed));
        assert_eq!(quiz.next(), Err(StateError::Completed));
        assert_eq!(quiz.previous(), Err(StateError::Completed));
        assert!(quiz.is_complete());
    }

    #[test]
    fn completion_does_not_require_answers() {
        let mut quiz = session(3);
        quiz.record_answer(0).unwrap();
        while !quiz.is_complete() {
            quiz.next().unwrap();
        }
        assert_eq!(quiz.answered_count(), 1);
        assert!(quiz.answered_count() < quiz.total_questions());
    }

    #[test]
    fn progress_tracks_position() {
        let mut quiz = session(4);
        assert!((quiz.progress() - 0.25).abs() < f64::EPSILON);
        quiz.next().unwrap();
        quiz.record_answer(1).unwrap();
        assert!((quiz.progress() - 0.5).abs() < f64::EPSILON);
        assert_eq!(
            quiz.status(),
            QuizProgress {
                position: 2,
                total: 4,
                answered: 1,
                is_complete: false
            }
        );
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, Copy)]
    enum Step {
        Answer(usize),
        Next,
        Previous,
    }

    fn step() -> impl Strategy<Value = Step> {
        prop_oneof![
            (0usize..6).prop_map(Step::Answer),
            Just(Step::Next),
            Just(Step::Previous),
        ]
    }

    fn quiz(n: u64) -> QuizSession {
        QuizSession::new(
            (1..=n)
                .map(|id| {
                    Question::new(QuestionId::new(id * 10), "Q", ["a", "b", "c", "d"]).unwrap()
                })
                .collect(),
        )
        .unwrap()
    }

    proptest! {
        /// `next` from the start flips to `Completed` on exactly the n-th call.
        #[test]
        fn completes_on_nth_next(n in 1u64..40) {
            let mut session = quiz(n);
            for _ in 1..n {
                prop_assert_eq!(session.next().unwrap(), QuizState::InProgress);
            }
            prop_assert_eq!(session.next().unwrap(), QuizState::Completed);
        }

        /// Any sequence of transitions keeps the cursor, answers and progress valid.
        #[test]
        fn invariants_hold_under_random_steps(
            n in 1u64..12,
            steps in prop::collection::vec(step(), 0..60),
        ) {
            let mut session = quiz(n);
            let ids: HashSet<QuestionId> = session.questions().iter().map(Question::id).collect();

            for step in steps {
                let before = session.is_complete();
                let result = match step {
                    Step::Answer(i) => session.record_answer(i).map(|()| session.state()),
                    Step::Next => session.next(),
                    Step::Previous => session.previous().map(|()| session.state()),
                };
                if before {
                    prop_assert_eq!(result, Err(StateError::Completed));
                }

                prop_assert!(session.current_index() < session.total_questions());
                prop_assert!(session.progress() > 0.0 && session.progress() <= 1.0);
                prop_assert!(session.answered_count() <= session.total_questions());
                for (id, option) in session.answers() {
                    prop_assert!(ids.contains(id));
                    prop_assert!(*option < 4);
                }
            }
        }
    }
}
