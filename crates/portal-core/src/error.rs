use thiserror::Error;

use crate::cell::CellId;

pub type Result<T> = std::result::Result<T, PortalError>;

#[derive(Debug, Error)]
pub enum PortalError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} fetching {url}")]
    HttpStatus { status: u16, url: String },

    #[error("catalog is empty: {catalog}")]
    EmptyCatalog { catalog: &'static str },

    #[error("duplicate id in {catalog}: {id}")]
    DuplicateId { catalog: &'static str, id: String },

    #[error("no content record for cell {id}")]
    MissingContent { id: CellId },

    #[error("unsupported language: {language}")]
    UnsupportedLanguage { language: String },

    #[error("invalid configuration: {message}")]
    Config { message: String },
}

impl PortalError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::EmptyCatalog { .. }
            | Self::DuplicateId { .. }
            | Self::MissingContent { .. }
            | Self::UnsupportedLanguage { .. }
            | Self::Config { .. } => 2,
            _ => 1,
        }
    }

    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this error is a startup-time configuration invariant violation.
    #[must_use]
    pub fn is_config(&self) -> bool {
        self.exit_code() == 2
    }
}
