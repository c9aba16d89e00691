//! Error types for talkingtext

use std::io;
use thiserror::Error;

/// Main error type for talkingtext
#[derive(Error, Debug)]
pub enum TalkError {
    /// The synthesizer refused to deliver utterance callbacks
    #[error("Failed to bind speech synthesizer: {0}")]
    Bind(String),

    #[error("No speech synthesizer bound")]
    NotBound,

    #[error("Speech synthesis error: {0}")]
    Speech(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("INI parse error: {0}")]
    IniParse(String),

    #[error("Saved state error: {0}")]
    State(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for talkingtext operations
pub type Result<T> = std::result::Result<T, TalkError>;

impl From<String> for TalkError {
    fn from(s: String) -> Self {
        TalkError::Other(s)
    }
}

impl From<&str> for TalkError {
    fn from(s: &str) -> Self {
        TalkError::Other(s.to_string())
    }
}
