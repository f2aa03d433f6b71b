use std::path::PathBuf;

use thiserror::Error;

use crate::quiz::engine::BOT_WELCOME_MESSAGE;

const DEFAULT_DB_PATH: &str = "db.sqlite";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("TELOXIDE_TOKEN is not set")]
    MissingToken,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub db_path: String,
    /// JSON question list. The built-in Python quiz is used when unset.
    pub questions_path: Option<PathBuf>,
    pub welcome_message: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let token = lookup("TELOXIDE_TOKEN").ok_or(ConfigError::MissingToken)?;

        Ok(Self {
            token,
            db_path: lookup("QUIZ_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
            questions_path: lookup("QUIZ_QUESTIONS_PATH").map(PathBuf::from),
            welcome_message: lookup("QUIZ_WELCOME_MESSAGE")
                .unwrap_or_else(|| BOT_WELCOME_MESSAGE.to_string()),
        })
    }
}
