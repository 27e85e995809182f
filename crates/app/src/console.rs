//! Line-based terminal front end: upload, configure, quiz, repeat.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use quiz_core::model::{BankId, option_label};
use quiz_core::{QuizSession, QuizState, RangeRequest};
use services::{BankService, BankServiceError, QuizFlowService};

type ConsoleResult<T> = Result<T, Box<dyn std::error::Error>>;

const BAR_WIDTH: usize = 30;

/// One keystroke-sized instruction typed during a quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizCommand {
    Answer(usize),
    Next,
    Previous,
    Quit,
}

/// Interpret a line typed while a question with `options` choices is shown.
///
/// Letters and 1-based numbers both select an option; an empty line means next.
pub fn parse_command(input: &str, options: usize) -> Option<QuizCommand> {
    let input = input.trim();
    match input.to_ascii_lowercase().as_str() {
        "" | "n" | "next" => return Some(QuizCommand::Next),
        "p" | "prev" | "previous" => return Some(QuizCommand::Previous),
        "q" | "quit" => return Some(QuizCommand::Quit),
        _ => {}
    }

    let index = if let Ok(number) = input.parse::<usize>() {
        number.checked_sub(1)?
    } else {
        let mut chars = input.chars();
        let letter = chars.next()?.to_ascii_lowercase();
        if chars.next().is_some() || !letter.is_ascii_lowercase() {
            return None;
        }
        usize::from(letter as u8 - b'a')
    };
    (index < options).then_some(QuizCommand::Answer(index))
}

/// Fixed-width text bar for a ratio in `[0, 1]`.
pub fn progress_bar(ratio: f64, width: usize) -> String {
    let ratio = ratio.clamp(0.0, 1.0);
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let filled = ((ratio * width as f64).round() as usize).min(width);
    format!(
        "[{}{}] {:>3.0}%",
        "#".repeat(filled),
        "-".repeat(width - filled),
        ratio * 100.0
    )
}

pub struct Console<R, W> {
    input: R,
    output: W,
    banks: BankService,
    flow: QuizFlowService,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W, banks: BankService, flow: QuizFlowService) -> Self {
        Self {
            input,
            output,
            banks,
            flow,
        }
    }

    /// Run until the user quits or input ends. `first_file` skips the first upload prompt.
    pub async fn run(&mut self, first_file: Option<PathBuf>) -> ConsoleResult<()> {
        let mut next_file = first_file;
        loop {
            let path = match next_file.take() {
                Some(path) => path,
                None => match self.prompt("Question file (empty to quit): ")? {
                    Some(line) if !line.is_empty() => PathBuf::from(line),
                    _ => break,
                },
            };

            let Some((bank_id, total)) = self.upload(&path).await? else {
                continue;
            };
            let outcome = self.quiz_on(bank_id, total, &path).await;
            // Banks only live for one cycle; the next upload starts fresh.
            self.banks.remove(bank_id).await?;
            if !outcome? {
                break;
            }
        }
        writeln!(self.output, "Bye.")?;
        Ok(())
    }

    /// One configure-and-quiz round on an uploaded bank. Returns `false` when the user is done.
    async fn quiz_on(
        &mut self,
        bank_id: BankId,
        total: usize,
        path: &Path,
    ) -> ConsoleResult<bool> {
        if total == 0 {
            writeln!(self.output, "No questions found in {}.", path.display())?;
            return Ok(true);
        }

        let Some(mut session) = self.configure(bank_id, total).await? else {
            return Ok(false);
        };
        if !self.take_quiz(&mut session)? {
            return Ok(false);
        }
        let status = session.status();
        writeln!(
            self.output,
            "Quiz complete: answered {} of {}.\n",
            status.answered, status.total
        )?;
        Ok(true)
    }

    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_owned()))
    }

    async fn upload(&mut self, path: &Path) -> ConsoleResult<Option<(BankId, usize)>> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                writeln!(self.output, "Cannot read {}: {err}", path.display())?;
                return Ok(None);
            }
        };
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());

        match self.banks.upload(&name, &bytes).await {
            Ok(receipt) => {
                writeln!(
                    self.output,
                    "Loaded {} questions from {name}.",
                    receipt.total_questions
                )?;
                Ok(Some((receipt.bank_id, receipt.total_questions)))
            }
            Err(BankServiceError::Extract(err)) => {
                writeln!(self.output, "Cannot use {name}: {err}")?;
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Ask for start, end and count until the range is accepted. `None` on end of input.
    async fn configure(
        &mut self,
        bank_id: BankId,
        total: usize,
    ) -> ConsoleResult<Option<QuizSession>> {
        let total = i64::try_from(total).unwrap_or(i64::MAX);
        let defaults = RangeRequest::default_for(total);

        loop {
            let Some(start) = self.ask_number("Start", defaults.start)? else {
                return Ok(None);
            };
            let Some(end) = self.ask_number("End", defaults.end)? else {
                return Ok(None);
            };
            let Some(count) = self.ask_number("Number of questions", defaults.count)? else {
                return Ok(None);
            };

            match self
                .flow
                .start_quiz(bank_id, RangeRequest::new(start, end, count))
                .await
            {
                Ok(session) => return Ok(Some(session)),
                Err(err) if err.is_user_error() => writeln!(self.output, "{err}")?,
                Err(err) => return Err(err.into()),
            }
        }
    }

    fn ask_number(&mut self, label: &str, default: i64) -> ConsoleResult<Option<i64>> {
        loop {
            let Some(line) = self.prompt(&format!("{label} [{default}]: "))? else {
                return Ok(None);
            };
            if line.is_empty() {
                return Ok(Some(default));
            }
            match line.parse::<i64>() {
                Ok(value) => return Ok(Some(value)),
                Err(_) => writeln!(self.output, "Please enter a whole number.")?,
            }
        }
    }

    /// Drive the session to completion. Returns `false` if the user quit.
    fn take_quiz(&mut self, session: &mut QuizSession) -> ConsoleResult<bool> {
        while session.state() == QuizState::InProgress {
            self.render(session)?;
            let Some(line) = self.prompt("> ")? else {
                return Ok(false);
            };
            match parse_command(&line, session.current_question().option_count()) {
                Some(QuizCommand::Answer(index)) => session.record_answer(index)?,
                Some(QuizCommand::Next) => {
                    session.next()?;
                }
                Some(QuizCommand::Previous) => session.previous()?,
                Some(QuizCommand::Quit) => return Ok(false),
                None => writeln!(
                    self.output,
                    "Choose an option by letter or number, n for next, p for previous, q to quit."
                )?,
            }
        }
        Ok(true)
    }

    fn render(&mut self, session: &QuizSession) -> io::Result<()> {
        let status = session.status();
        let question = session.current_question();
        let chosen = session.answer_for(question.id());

        writeln!(self.output)?;
        writeln!(self.output, "Question {} of {}", status.position, status.total)?;
        writeln!(self.output, "{}", progress_bar(session.progress(), BAR_WIDTH))?;
        writeln!(self.output, "Q#{} {}", question.id(), question.text())?;
        for (index, option) in question.options().iter().enumerate() {
            let marker = if chosen == Some(index) { '*' } else { ' ' };
            writeln!(self.output, " {marker} {}) {option}", option_label(index))?;
        }
        let hint = if session.is_last() { "n to finish" } else { "n for next" };
        writeln!(self.output, "({hint})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use services::{RandomSampler, SampleOrder, Utf8TextExtractor};
    use std::io::Cursor;
    use std::sync::Arc;
    use storage::repository::Storage;

    #[test]
    fn commands_accept_letters_and_numbers() {
        assert_eq!(parse_command("b", 4), Some(QuizCommand::Answer(1)));
        assert_eq!(parse_command(" D ", 4), Some(QuizCommand::Answer(3)));
        assert_eq!(parse_command("1", 4), Some(QuizCommand::Answer(0)));
        assert_eq!(parse_command("", 4), Some(QuizCommand::Next));
        assert_eq!(parse_command("P", 4), Some(QuizCommand::Previous));
        assert_eq!(parse_command("q", 4), Some(QuizCommand::Quit));
    }

    #[test]
    fn commands_outside_the_options_are_rejected() {
        assert_eq!(parse_command("e", 4), None);
        assert_eq!(parse_command("0", 4), None);
        assert_eq!(parse_command("5", 4), None);
        assert_eq!(parse_command("ab", 4), None);
        assert_eq!(parse_command("?", 4), None);
    }

    #[test]
    fn progress_bar_fills_proportionally() {
        assert_eq!(progress_bar(0.5, 10), "[#####-----]  50%");
        assert_eq!(progress_bar(1.0, 4), "[####] 100%");
        assert_eq!(progress_bar(2.0, 4), "[####] 100%");
    }

    fn write_document(name: &str, questions: u64) -> PathBuf {
        let mut text = String::new();
        for n in 1..=questions {
            text.push_str(&format!("{n}. Question {n}?\nA) a{n}\nB) b{n}\nC) c{n}\nD) d{n}\n"));
        }
        let path = std::env::temp_dir().join(format!("{name}-{}.txt", std::process::id()));
        std::fs::write(&path, text).unwrap();
        path
    }

    fn console(script: &str) -> Console<Cursor<Vec<u8>>, Vec<u8>> {
        let storage = Storage::in_memory();
        let banks = BankService::new(
            quiz_core::time::fixed_clock(),
            Arc::new(Utf8TextExtractor),
            Arc::clone(&storage.banks),
        )
        .unwrap();
        let flow = QuizFlowService::new(
            Arc::clone(&storage.banks),
            Arc::new(
                RandomSampler::new()
                    .with_seed(3)
                    .with_order(SampleOrder::BankOrder),
            ),
        );
        Console::new(Cursor::new(script.as_bytes().to_vec()), Vec::new(), banks, flow)
    }

    #[tokio::test]
    async fn full_cycle_reprompts_on_invalid_range_and_returns_to_upload() {
        let path = write_document("console-cycle", 5);
        // Defaults are 1, 5, 10: too many for the range, so the form is asked again.
        let script = "\n\n\n2\n4\n3\nb\nn\np\nx\n2\nn\nn\nn\n\n";
        let mut console = console(script);

        console.run(Some(path.clone())).await.unwrap();
        let out = String::from_utf8(console.output).unwrap();
        std::fs::remove_file(path).unwrap();

        assert!(out.contains("Loaded 5 questions"));
        assert!(out.contains("Start [1]: "));
        assert!(out.contains("End [5]: "));
        assert!(out.contains(
            "requested count exceeds available questions in range (available: 5, requested: 10)"
        ));
        assert!(out.contains("Question 1 of 3"));
        assert!(out.contains("Question 3 of 3"));
        assert!(out.contains("Q#2 Question 2?"));
        assert!(out.contains(" * B) b2"));
        assert!(out.contains("Choose an option"));
        assert!(out.contains("Quiz complete: answered 1 of 3."));
        assert!(out.contains("Question file (empty to quit): "));
        assert!(out.ends_with("Bye.\n"));
    }

    #[tokio::test]
    async fn quit_leaves_the_quiz() {
        let path = write_document("console-quit", 3);
        let mut console = console("1\n3\n2\nq\n");

        console.run(Some(path.clone())).await.unwrap();
        let out = String::from_utf8(console.output).unwrap();
        std::fs::remove_file(path).unwrap();

        assert!(out.contains("Question 1 of 2"));
        assert!(!out.contains("Quiz complete"));
        assert!(out.ends_with("Bye.\n"));
    }

    #[tokio::test]
    async fn each_cycle_discards_its_bank() {
        let path = write_document("console-discard", 2);
        // Finish one quiz, upload the same file again, then stop at the range form.
        let script = format!("1\n2\n1\nn\n{}\n", path.display());
        let mut console = console(&script);

        console.run(Some(path.clone())).await.unwrap();
        std::fs::remove_file(&path).unwrap();

        assert!(console.banks.list(10).await.unwrap().is_empty());
        let out = String::from_utf8(console.output).unwrap();
        assert_eq!(out.matches("Loaded 2 questions").count(), 2);
        assert!(out.contains("Quiz complete: answered 0 of 1."));
    }

    #[tokio::test]
    async fn missing_file_goes_back_to_the_upload_prompt() {
        let mut console = console("");
        console
            .run(Some(PathBuf::from("/nonexistent/quiz.txt")))
            .await
            .unwrap();
        let out = String::from_utf8(console.output).unwrap();
        assert!(out.contains("Cannot read /nonexistent/quiz.txt"));
        assert!(out.contains("Question file (empty to quit): "));
    }
}
