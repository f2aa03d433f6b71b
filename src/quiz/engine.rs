use log::{debug, info};
use thiserror::Error;

use crate::quiz::questions::QuestionBank;
use crate::quiz::session::Session;
use crate::quiz::AnswerRecord;

pub const BOT_WELCOME_MESSAGE: &str = "Hello! I'm the Python quiz bot. \
I'll ask you a few multiple-choice questions one at a time, \
reply with one of the offered options. You'll get your score at the end.";

/// Problems with the user's reply. The `Display` text is sent back as is.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnswerError {
    #[error("No current question to answer.")]
    NoPendingQuestion,

    #[error("Invalid answer. Please choose a valid option.")]
    InvalidAnswer,
}

/// The session and the question list disagree. Not something the user can fix.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuizError {
    #[error("Session points at question {id}, but only {total} questions are loaded")]
    QuestionOutOfRange { id: usize, total: usize },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error(transparent)]
    Answer(#[from] AnswerError),

    #[error(transparent)]
    Quiz(#[from] QuizError),
}

pub struct QuizEngine {
    questions: QuestionBank,
    welcome: String,
}

impl QuizEngine {
    pub fn new(questions: QuestionBank, welcome: String) -> Self {
        Self { questions, welcome }
    }

    pub fn questions(&self) -> &QuestionBank {
        &self.questions
    }

    /// Handles one incoming reply and returns the messages to send, in order.
    ///
    /// A session with no pending question gets the welcome message first.
    /// Recording still runs for it, so the very first reply of a session
    /// always ends in `AnswerError::NoPendingQuestion`; use [`Self::start`]
    /// to issue the first question.
    pub fn generate_responses(
        &self,
        incoming_answer: &str,
        session: &mut impl Session,
    ) -> Result<Vec<String>, QuizError> {
        let mut responses = Vec::new();

        let current_question_id = session.current_question_id();
        if current_question_id.is_none() {
            responses.push(self.welcome.clone());
        }

        match self.record_current_answer(incoming_answer, current_question_id, session) {
            Ok(()) => {}
            Err(RecordError::Answer(err)) => {
                debug!("Answer {:?} not recorded: {}", incoming_answer, err);
                responses.push(err.to_string());
                return Ok(responses);
            }
            Err(RecordError::Quiz(err)) => return Err(err),
        }

        let next_question_id = match self.next_question(current_question_id) {
            Some((id, text)) => {
                responses.push(text.to_string());
                Some(id)
            }
            None => {
                responses.push(self.final_response(&*session));
                None
            }
        };

        session.set_current_question_id(next_question_id);
        session.save();

        Ok(responses)
    }

    /// Validates `answer` against the pending question and appends it to the session.
    ///
    /// Saves the session only when a record was appended.
    pub fn record_current_answer(
        &self,
        answer: &str,
        current_question_id: Option<usize>,
        session: &mut impl Session,
    ) -> Result<(), RecordError> {
        let id = current_question_id.ok_or(AnswerError::NoPendingQuestion)?;
        let question = self
            .questions
            .get(id)
            .ok_or(QuizError::QuestionOutOfRange {
                id,
                total: self.questions.len(),
            })?;

        if !question.is_option(answer) {
            return Err(AnswerError::InvalidAnswer.into());
        }

        let record = AnswerRecord::new(id, question, answer);
        debug!(
            "Recorded answer {:?} for question {} (correct: {})",
            record.user_answer, id, record.is_correct
        );
        session.push_answer(record);
        session.save();

        Ok(())
    }

    /// The question after `current_question_id`, or the first one when nothing is pending.
    pub fn next_question(&self, current_question_id: Option<usize>) -> Option<(usize, &str)> {
        let next_question_id = current_question_id.map_or(0, |id| id + 1);
        self.questions
            .get(next_question_id)
            .map(|q| (next_question_id, q.question_text.as_str()))
    }

    pub fn final_response(&self, session: &impl Session) -> String {
        let answers = session.answers();
        let total_questions = self.questions.len();
        let correct_answers = answers.iter().filter(|a| a.is_correct).count();

        info!(
            "Quiz completed with score {}/{}",
            correct_answers, total_questions
        );

        let summary = answers
            .iter()
            .map(|a| {
                format!(
                    "Q{}: {} (Your Answer: {})",
                    a.question_id + 1,
                    if a.is_correct { "Correct" } else { "Wrong" },
                    a.user_answer
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "Quiz Completed!\nYour Score: {}/{}\n\nSummary:\n{}",
            correct_answers, total_questions, summary
        )
    }

    /// Begins a fresh attempt: drops earlier answers, sends the welcome
    /// message and issues the first question. Saves once.
    pub fn start(&self, session: &mut impl Session) -> Vec<String> {
        session.clear_answers();

        let mut responses = vec![self.welcome.clone()];
        let first_question_id = match self.next_question(None) {
            Some((id, text)) => {
                responses.push(text.to_string());
                Some(id)
            }
            None => {
                responses.push(self.final_response(&*session));
                None
            }
        };

        session.set_current_question_id(first_question_id);
        session.save();

        responses
    }
}
