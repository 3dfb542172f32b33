//! # Error Module
//!
//! Error types for the commit history pager.
//!
//! ## Design Principles
//! - **Never panic** on backend failures - they come back as values
//! - **Include context** - revisions, repository paths, what went wrong
//! - **User-friendly messages** - page fetch failures are shown to the user

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Server error: {0}")]
    Server(#[from] ServerError),

    #[error("Failed to open repository at {path}: {reason}")]
    Repository { path: PathBuf, reason: String },

    #[error("{caption}: {message}")]
    Fetch { caption: String, message: String },

    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors reported by a history backend for a single request
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerError {
    #[error("Revision not found: {revision}")]
    RevisionNotFound { revision: String },

    #[error("Backend failure: {0}")]
    Backend(String),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Request was abandoned before a response arrived")]
    Abandoned,
}

impl ServerError {
    /// Message suitable for an error dialog
    pub fn user_message(&self) -> String {
        match self {
            ServerError::RevisionNotFound { revision } => {
                format!("The revision '{}' could not be found.", revision)
            }
            ServerError::Backend(reason) => reason.clone(),
            ServerError::Unavailable(_) => {
                "Unable to reach the version control service. Please try again.".to_string()
            }
            ServerError::Abandoned => "The request was cancelled.".to_string(),
        }
    }
}

impl From<git2::Error> for ServerError {
    fn from(error: git2::Error) -> Self {
        ServerError::Backend(error.message().to_string())
    }
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, HistoryError>;
