mod bank;
mod ids;
mod question;

pub use bank::QuestionBank;
pub use ids::{BankId, ParseIdError, QuestionId};
pub use question::{Question, QuestionError, option_label};
