use thiserror::Error;

use crate::backend::BackendError;
use crate::speech::SpeechError;

#[derive(Error, Debug)]
pub enum LumenError {
    /// Rejected locally before any backend call.
    #[error("{title}: {description}")]
    Validation { title: String, description: String },

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Speech(#[from] SpeechError),

    /// A platform capability or document type this client cannot handle.
    #[error("{0}")]
    Unsupported(String),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LumenError {
    pub fn validation(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::Validation {
            title: title.into(),
            description: description.into(),
        }
    }

    /// Text shown as the notice description for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { description, .. } => description.clone(),
            Self::Backend(e) => e.message(),
            other => other.to_string(),
        }
    }
}
