use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use thiserror::Error;

use crate::quiz::Question;

#[derive(Debug, Error)]
pub enum QuestionBankError {
    #[error("Failed to open question file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse question file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Question {0} has no text.")]
    EmptyText(usize),

    #[error("Question {0} has no options.")]
    NoOptions(usize),

    #[error("Question {number}: answer {answer:?} is not one of its options.")]
    AnswerNotAnOption { number: usize, answer: String },
}

/// The fixed, ordered question list a quiz walks through.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    pub fn new(questions: Vec<Question>) -> Result<Self, QuestionBankError> {
        for (i, question) in questions.iter().enumerate() {
            // Users see 1-based numbers in the summary, so errors use them too
            let number = i + 1;
            if question.question_text.trim().is_empty() {
                return Err(QuestionBankError::EmptyText(number));
            }
            if question.options.is_empty() {
                return Err(QuestionBankError::NoOptions(number));
            }
            if !question.is_option(&question.answer) {
                return Err(QuestionBankError::AnswerNotAnOption {
                    number,
                    answer: question.answer.clone(),
                });
            }
        }
        Ok(Self { questions })
    }

    /// Reads a JSON array of `{question_text, options, answer}` objects.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, QuestionBankError> {
        let questions: Vec<Question> = serde_json::from_reader(reader)?;
        Self::new(questions)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, QuestionBankError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Built-in Python quiz used when no question file is configured.
    pub fn python() -> Self {
        Self {
            questions: vec![
                Question::new(
                    "What is the output of print(2 ** 3)?",
                    &["6", "8", "9", "5"],
                    "8",
                ),
                Question::new(
                    "Which keyword defines a function in Python?",
                    &["func", "define", "def", "function"],
                    "def",
                ),
                Question::new(
                    "What is the type of the literal (1,)?",
                    &["list", "tuple", "int", "set"],
                    "tuple",
                ),
                Question::new(
                    "Which of these is immutable?",
                    &["list", "dict", "set", "str"],
                    "str",
                ),
                Question::new(
                    "What does len({'a': 1, 'b': 2}) return?",
                    &["1", "2", "4", "Error"],
                    "2",
                ),
                Question::new(
                    "Which statement handles exceptions?",
                    &["try", "catch", "rescue", "handle"],
                    "try",
                ),
                Question::new(
                    "What is the result of 7 // 2?",
                    &["3.5", "3", "4", "1"],
                    "3",
                ),
                Question::new(
                    "Which built-in returns an object's memory identity?",
                    &["hash", "id", "ref", "addr"],
                    "id",
                ),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_questions_are_valid() {
        let bank = QuestionBank::python();

        assert!(!bank.is_empty());
        assert!(QuestionBank::new(bank.questions.clone()).is_ok());
    }

    #[test]
    fn reads_questions_from_json() {
        let json = r#"[
            {"question_text": "1+1?", "options": ["1", "2", "3"], "answer": "2"},
            {"question_text": "2+2?", "options": ["4", "5"], "answer": "4"}
        ]"#;

        let bank = QuestionBank::from_reader(json.as_bytes()).unwrap();

        assert_eq!(bank.len(), 2);
        assert_eq!(bank.get(1).unwrap().question_text, "2+2?");
        assert!(bank.get(2).is_none());
    }

    #[test]
    fn rejects_answer_outside_options() {
        let json = r#"[
            {"question_text": "1+1?", "options": ["1", "2"], "answer": "2"},
            {"question_text": "2+2?", "options": ["3", "5"], "answer": "4"}
        ]"#;

        let err = QuestionBank::from_reader(json.as_bytes()).unwrap_err();

        assert!(matches!(
            err,
            QuestionBankError::AnswerNotAnOption { number: 2, ref answer } if answer == "4"
        ));
    }

    #[test]
    fn rejects_question_without_options() {
        let questions = vec![Question::new("Anything?", &[], "yes")];

        let err = QuestionBank::new(questions).unwrap_err();

        assert!(matches!(err, QuestionBankError::NoOptions(1)));
    }

    #[test]
    fn rejects_blank_question_text() {
        let questions = vec![Question::new("  ", &["a"], "a")];

        assert!(matches!(
            QuestionBank::new(questions),
            Err(QuestionBankError::EmptyText(1))
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = QuestionBank::from_reader("[{".as_bytes()).unwrap_err();

        assert!(matches!(err, QuestionBankError::Parse(_)));
    }
}
