use crate::quiz::{AnswerRecord, SessionData};

/// Key-value state of one user's quiz attempt.
///
/// Setters only touch the working copy; nothing is durable until `save`.
pub trait Session {
    fn current_question_id(&self) -> Option<usize>;
    fn set_current_question_id(&mut self, id: Option<usize>);

    fn answers(&self) -> &[AnswerRecord];
    fn push_answer(&mut self, record: AnswerRecord);
    fn clear_answers(&mut self);

    fn save(&mut self);
}

/// A session over `SessionData` that keeps the last saved copy aside.
///
/// The bot writes `saved()` back to the dialogue storage after a turn, so a
/// turn that never called `save` leaves the stored state as it was.
#[derive(Debug, Clone, Default)]
pub struct SnapshotSession {
    working: SessionData,
    saved: Option<SessionData>,
    saves: usize,
}

impl SnapshotSession {
    pub fn new(data: SessionData) -> Self {
        Self {
            working: data,
            saved: None,
            saves: 0,
        }
    }

    pub fn saved(&self) -> Option<&SessionData> {
        self.saved.as_ref()
    }

    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl Session for SnapshotSession {
    fn current_question_id(&self) -> Option<usize> {
        self.working.current_question_id
    }

    fn set_current_question_id(&mut self, id: Option<usize>) {
        self.working.current_question_id = id;
    }

    fn answers(&self) -> &[AnswerRecord] {
        &self.working.answers
    }

    fn push_answer(&mut self, record: AnswerRecord) {
        self.working.answers.push(record);
    }

    fn clear_answers(&mut self) {
        self.working.answers.clear();
    }

    fn save(&mut self) {
        self.saved = Some(self.working.clone());
        self.saves += 1;
    }
}
