mod config;
mod quiz;

use std::sync::Arc;

use config::Config;
use dotenv::dotenv;
use log::{debug, error, info, warn};
use quiz::{
    engine::QuizEngine,
    questions::QuestionBank,
    session::{Session, SnapshotSession},
    SessionData,
};
use teloxide::{
    dispatching::dialogue::{serializer::Json, ErasedStorage, SqliteStorage, Storage},
    prelude::*,
    types::{KeyboardButton, KeyboardMarkup},
};

type QuizDialogue = Dialogue<State, ErasedStorage<State>>;
type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(Clone, Default, serde::Serialize, serde::Deserialize)]
pub enum State {
    #[default]
    Start,
    InQuiz {
        session: SessionData,
    },
}

type QuizStorage = std::sync::Arc<ErasedStorage<State>>;

const START_COMMAND: &str = "/start";

#[tokio::main]
async fn main() {
    // A missing .env is fine, the variables may come from the environment
    dotenv().ok();

    pretty_env_logger::init();

    if let Err(err) = run().await {
        error!("Quiz bot stopped: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> HandlerResult {
    let config = Config::from_env()?;
    info!("Starting quiz bot...");

    let questions = match &config.questions_path {
        Some(path) => {
            info!("Loading questions from {}", path.display());
            QuestionBank::load(path)?
        }
        None => QuestionBank::python(),
    };
    info!("{} questions loaded", questions.len());
    if questions.is_empty() {
        warn!("Question list is empty, every quiz ends right away");
    }

    debug!("Opening session storage at {}", config.db_path);
    let storage: QuizStorage = SqliteStorage::open(&config.db_path, Json).await?.erase();

    let bot = Bot::new(config.token.clone());

    let engine = Arc::new(QuizEngine::new(questions, config.welcome_message.clone()));
    let engine_for_answers = engine.clone();

    Dispatcher::builder(
        bot,
        Update::filter_message()
            .enter_dialogue::<Message, ErasedStorage<State>, State>()
            .branch(dptree::case![State::Start].endpoint(
                move |bot: Bot, dialogue: QuizDialogue, msg: Message| {
                    start(engine.clone(), bot, dialogue, msg)
                },
            ))
            .branch(dptree::case![State::InQuiz { session }].endpoint(
                move |bot: Bot, dialogue: QuizDialogue, session: SessionData, msg: Message| {
                    receive_answer(engine_for_answers.clone(), bot, dialogue, session, msg)
                },
            )),
    )
    .dependencies(dptree::deps![storage])
    .enable_ctrlc_handler()
    .build()
    .dispatch()
    .await;

    Ok(())
}

async fn start(
    engine: Arc<QuizEngine>,
    bot: Bot,
    dialogue: QuizDialogue,
    msg: Message,
) -> HandlerResult {
    info!("Starting a quiz in chat {}", msg.chat.id);

    let mut session = SnapshotSession::default();
    let responses = engine.start(&mut session);

    send_responses(&engine, &bot, &dialogue, msg.chat.id, responses, session).await
}

async fn receive_answer(
    engine: Arc<QuizEngine>,
    bot: Bot,
    dialogue: QuizDialogue,
    session: SessionData,
    msg: Message,
) -> HandlerResult {
    let answer = match msg.text() {
        Some(START_COMMAND) => return start(engine, bot, dialogue, msg).await,
        Some(text) => text,
        None => {
            bot.send_message(msg.chat.id, "Please answer with one of the options (as text)")
                .await?;
            return Ok(());
        }
    };

    let mut session = SnapshotSession::new(session);
    let responses = match engine.generate_responses(answer, &mut session) {
        Ok(responses) => responses,
        Err(err) => {
            error!("Quiz state is broken in chat {}: {}", msg.chat.id, err);
            return Err(err.into());
        }
    };

    send_responses(&engine, &bot, &dialogue, msg.chat.id, responses, session).await
}

/// Stores whatever the engine saved during the turn, then sends the
/// messages in order with the keyboard on the last one.
async fn send_responses(
    engine: &QuizEngine,
    bot: &Bot,
    dialogue: &QuizDialogue,
    chat_id: ChatId,
    responses: Vec<String>,
    session: SnapshotSession,
) -> HandlerResult {
    let (keyboard, state) = finish_turn(engine, &session);

    // Store before sending so a failed send can't leave the stored question behind
    if let Some(state) = state {
        debug!(
            "Storing session for chat {} after {} saves",
            chat_id,
            session.save_count()
        );
        dialogue.update(state).await?;
    }

    let last = responses.len().saturating_sub(1);
    for (i, text) in responses.into_iter().enumerate() {
        let mut request = bot.send_message(chat_id, text);
        if i == last {
            request = request.reply_markup(keyboard.clone());
        }
        request.await?;
    }
    Ok(())
}

/// The keyboard for the last message and the state to store, if the turn saved anything.
fn finish_turn(engine: &QuizEngine, session: &SnapshotSession) -> (KeyboardMarkup, Option<State>) {
    let keyboard = reply_keyboard(engine, session.current_question_id());
    let state = session.saved().map(|data| State::InQuiz {
        session: data.clone(),
    });
    (keyboard, state)
}

fn reply_keyboard(engine: &QuizEngine, current_question_id: Option<usize>) -> KeyboardMarkup {
    match current_question_id.and_then(|id| engine.questions().get(id)) {
        Some(question) => KeyboardMarkup::new(
            question
                .options
                .iter()
                .map(|o| vec![KeyboardButton::new(o.clone())])
                .collect::<Vec<_>>(),
        ),
        None => KeyboardMarkup::new(vec![vec![KeyboardButton::new(START_COMMAND)]]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::Question;

    fn engine() -> QuizEngine {
        let questions = QuestionBank::new(vec![
            Question::new("1+1?", &["1", "2", "3"], "2"),
            Question::new("2+2?", &["3", "4"], "4"),
        ])
        .unwrap();
        QuizEngine::new(questions, "welcome".to_string())
    }

    fn buttons(keyboard: &KeyboardMarkup) -> Vec<Vec<String>> {
        keyboard
            .keyboard
            .iter()
            .map(|row| row.iter().map(|b| b.text.clone()).collect())
            .collect()
    }

    fn pending(id: usize) -> SnapshotSession {
        SnapshotSession::new(SessionData {
            current_question_id: Some(id),
            answers: Vec::new(),
        })
    }

    #[test]
    fn pending_question_gets_one_row_per_option() {
        let keyboard = reply_keyboard(&engine(), Some(0));

        assert_eq!(buttons(&keyboard), vec![vec!["1"], vec!["2"], vec!["3"]]);
    }

    #[test]
    fn no_pending_question_offers_start() {
        let engine = engine();

        assert_eq!(buttons(&reply_keyboard(&engine, None)), vec![vec![START_COMMAND]]);
        assert_eq!(buttons(&reply_keyboard(&engine, Some(9))), vec![vec![START_COMMAND]]);
    }

    #[test]
    fn rejected_answer_stores_nothing() {
        let engine = engine();
        let mut session = pending(0);
        engine.generate_responses("7", &mut session).unwrap();

        let (keyboard, state) = finish_turn(&engine, &session);

        assert!(state.is_none());
        assert_eq!(buttons(&keyboard), vec![vec!["1"], vec!["2"], vec!["3"]]);
    }

    #[test]
    fn recorded_answer_stores_advanced_session() {
        let engine = engine();
        let mut session = pending(0);
        engine.generate_responses("2", &mut session).unwrap();

        let (keyboard, state) = finish_turn(&engine, &session);

        match state {
            Some(State::InQuiz { session }) => {
                assert_eq!(session.current_question_id, Some(1));
                assert_eq!(session.answers.len(), 1);
            }
            _ => panic!("expected a stored quiz session"),
        }
        assert_eq!(buttons(&keyboard), vec![vec!["3"], vec!["4"]]);
    }

    #[test]
    fn finished_quiz_stores_session_and_offers_start() {
        let engine = engine();
        let mut session = pending(1);
        engine.generate_responses("4", &mut session).unwrap();

        let (keyboard, state) = finish_turn(&engine, &session);

        match state {
            Some(State::InQuiz { session }) => assert_eq!(session.current_question_id, None),
            _ => panic!("expected a stored quiz session"),
        }
        assert_eq!(buttons(&keyboard), vec![vec![START_COMMAND]]);
    }
}
