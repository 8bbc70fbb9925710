use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TinifyError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Transport error")]
    Transport(#[from] reqwest::Error),

    #[error("Tinify API call failed, HTTP status was {status}. Error: {error} Message: {message}")]
    Api {
        status: u16,
        error: String,
        message: String,
    },

    #[error("Tinify API call failed, HTTP status was {status:?}, couldn't decode JSON body")]
    Decoding {
        status: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error")]
    Io(#[from] std::io::Error),

    #[error("Failed to write result to {path:?}")]
    Write {
        path: PathBuf,
        compression_count: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("Result returned zero bytes")]
    EmptyResult { compression_count: u64 },
}

impl TinifyError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        TinifyError::Validation(message.into())
    }

    /// Compression count reported by a fetch that succeeded before a later step failed.
    pub fn compression_count(&self) -> Option<u64> {
        match self {
            TinifyError::Write {
                compression_count, ..
            }
            | TinifyError::EmptyResult { compression_count } => Some(*compression_count),
            _ => None,
        }
    }

    pub fn is_api_error(&self) -> bool {
        matches!(self, TinifyError::Api { .. } | TinifyError::Decoding { .. })
    }
}

pub type Result<T> = std::result::Result<T, TinifyError>;
