use thiserror::Error;

use crate::value::Value;

#[derive(Error, Debug)]
pub enum QuarryError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    /// A well-formed response whose status signals failure. Only produced when
    /// the client raises on error; the decoded body rides along.
    #[error("{message}")]
    Application {
        message: String,
        result: Value,
        status_code: u16,
    },

    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    #[cfg(feature = "rpc")]
    #[error("Serialization error: {0}")]
    Serialization(#[from] postcard::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl QuarryError {
    /// Status code of an application error; `None` for every other kind.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            QuarryError::Application { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// Decoded response body of an application error.
    pub fn result(&self) -> Option<&Value> {
        match self {
            QuarryError::Application { result, .. } => Some(result),
            _ => None,
        }
    }

    /// True for failures that happened before a response was received.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            QuarryError::Transport(_)
                | QuarryError::Connection(_)
                | QuarryError::Timeout(_)
                | QuarryError::Io(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, QuarryError>;
