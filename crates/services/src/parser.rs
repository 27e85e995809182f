//! Turns extracted document text into questions.
//!
//! Expected layout, one item per line:
//!
//! ```text
//! 101. What is the capital of France?
//! A) London
//! B) Paris
//! C) Berlin
//! D) Madrid
//! ```
//!
//! A question is kept only once all four options `A`–`D` were seen. Lines that
//! match neither shape are ignored.

use std::collections::HashSet;

use quiz_core::model::{Question, QuestionId};
use regex::Regex;

const OPTION_LETTERS: usize = 4;

/// Line-oriented, regex-based question parser.
#[derive(Debug, Clone)]
pub struct QuestionParser {
    question: Regex,
    option: Regex,
}

struct PendingQuestion {
    id: QuestionId,
    text: String,
    options: [Option<String>; OPTION_LETTERS],
}

impl PendingQuestion {
    fn into_question(self) -> Option<Question> {
        let [Some(a), Some(b), Some(c), Some(d)] = self.options else {
            log::debug!("dropping question {}: incomplete options", self.id);
            return None;
        };
        match Question::new(self.id, self.text, [a, b, c, d]) {
            Ok(q) => Some(q),
            Err(err) => {
                log::debug!("dropping question {}: {err}", self.id);
                None
            }
        }
    }
}

impl QuestionParser {
    /// # Errors
    ///
    /// Returns `regex::Error` if the line patterns fail to compile.
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            question: Regex::new(r"^\s*([0-9]+)\.\s+(.+?)$")?,
            option: Regex::new(r"^\s*([A-D])\)\s*(.+)$")?,
        })
    }

    /// Parse every complete question in `text`, in document order.
    ///
    /// When a question number repeats, the first complete occurrence wins.
    #[must_use]
    pub fn parse(&self, text: &str) -> Vec<Question> {
        let mut questions = Vec::new();
        let mut seen = HashSet::new();
        let mut pending: Option<PendingQuestion> = None;

        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if let Some(caps) = self.question.captures(line) {
                if let Some(done) = pending.take() {
                    Self::push(done, &mut questions, &mut seen);
                }
                // An unusable number still ends the previous question; its options are skipped.
                let Ok(number) = caps[1].parse::<u64>() else {
                    log::debug!("ignoring question number out of range: {}", &caps[1]);
                    continue;
                };
                pending = Some(PendingQuestion {
                    id: QuestionId::new(number),
                    text: caps[2].trim().to_owned(),
                    options: Default::default(),
                });
            } else if let Some(current) = pending.as_mut() {
                if let Some(caps) = self.option.captures(line) {
                    let slot = usize::from(caps[1].as_bytes()[0] - b'A');
                    current.options[slot] = Some(caps[2].trim().to_owned());
                }
            }
        }

        if let Some(done) = pending {
            Self::push(done, &mut questions, &mut seen);
        }

        log::debug!("parsed {} questions", questions.len());
        questions
    }

    fn push(pending: PendingQuestion, out: &mut Vec<Question>, seen: &mut HashSet<QuestionId>) {
        let Some(question) = pending.into_question() else {
            return;
        };
        if seen.insert(question.id()) {
            out.push(question);
        } else {
            log::warn!("dropping duplicate question number {}", question.id());
        }
    }
}
