//! Structured error types for Colonnade.
//!
//! Layout never fails: a missing content block or column template degrades
//! to a smaller layout. The variants here cover the places where something
//! outside the engine can go wrong: JSON input and configuration, session
//! restore, and page navigation.

use thiserror::Error;

use crate::session::persistence::RestoreError;

/// The unified error type returned by the public Colonnade API.
#[derive(Debug, Error)]
pub enum ColonnadeError {
    /// JSON input (configuration or a session snapshot) failed to parse.
    #[error("Failed to parse JSON: {source}{}", render_hint(.hint))]
    ParseError {
        source: serde_json::Error,
        hint: String,
    },
    /// Configuration parsed but describes a layout that cannot be measured.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    /// A saved session could not be brought back.
    #[error("Restore error: {0}")]
    Restore(#[from] RestoreError),
    /// Navigation named a page type nobody registered.
    #[error("Unknown page type: {0}")]
    UnknownPage(String),
    /// A frame was registered under a session key that is already taken.
    #[error("Frame already registered under key {0:?}")]
    FrameAlreadyRegistered(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn render_hint(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for ColonnadeError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the expected shape. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input, is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        ColonnadeError::ParseError { source: e, hint }
    }
}
