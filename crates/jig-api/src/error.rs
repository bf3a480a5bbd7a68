use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Rejected locally, no request was made
    #[error("{0}")]
    InvalidInput(String),

    /// The backend answered with a non-success status
    #[error("{message}")]
    Backend { status: u16, message: String },

    #[error("Could not connect to the backend server at {base_url}")]
    Unreachable {
        base_url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unexpected response from {endpoint}: {detail}")]
    InvalidResponse {
        endpoint: &'static str,
        detail: String,
    },

    #[error("Failed to create HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("Failed to write {}: {detail}", path.display())]
    Write { path: PathBuf, detail: String },
}

impl ApiError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        ApiError::InvalidInput(message.into())
    }

    /// HTTP status for backend errors
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
