pub mod engine;
pub mod questions;
pub mod session;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Question {
    pub question_text: String,
    pub options: Vec<String>,
    pub answer: String,
}

impl Question {
    pub fn new(question_text: &str, options: &[&str], answer: &str) -> Self {
        Self {
            question_text: question_text.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            answer: answer.to_string(),
        }
    }

    pub fn is_option(&self, text: &str) -> bool {
        self.options.iter().any(|o| o == text)
    }
}

/// One recorded reply. `is_correct` is fixed when the record is created.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AnswerRecord {
    pub question_id: usize,
    pub user_answer: String,
    pub is_correct: bool,
}

impl AnswerRecord {
    pub fn new(question_id: usize, question: &Question, user_answer: &str) -> Self {
        Self {
            question_id,
            user_answer: user_answer.to_string(),
            is_correct: user_answer == question.answer,
        }
    }
}

/// Per-chat quiz state as it is kept in the dialogue storage.
///
/// `current_question_id` is `None` both before the first question is issued
/// and after the last one has been answered.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SessionData {
    pub current_question_id: Option<usize>,
    #[serde(default)]
    pub answers: Vec<AnswerRecord>,
}
