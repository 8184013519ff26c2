//! Error handling for the clinic back-office

use clinic_desk_gateway::GatewayError;
use std::fmt;
use thiserror::Error;

/// Unified error type of the back-office managers
#[derive(Error, Debug)]
pub enum Error {
    /// Input failed a local precondition; nothing was sent
    #[error("{0}")]
    Validation(String),

    /// The data gateway reported a failure
    #[error("Database error: {0}")]
    Remote(#[from] GatewayError),

    /// A submission from the same form has not finished yet
    #[error("A submission is already in progress")]
    SubmissionInFlight,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Create a new validation error
    pub fn validation<T: fmt::Display>(msg: T) -> Self {
        Error::Validation(msg.to_string())
    }

    /// Create a new configuration error
    pub fn config<T: fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// The row was changed by someone else since it was loaded
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Remote(e) if e.is_conflict())
    }

    /// The row no longer exists
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Remote(e) if e.is_not_found())
    }

    /// Short text for a toast
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation(msg) => msg.clone(),
            Error::Remote(e) if e.is_conflict() => {
                "This entry was changed by someone else. Reload and try again.".to_string()
            }
            Error::Remote(e) if e.is_not_found() => "This entry no longer exists.".to_string(),
            Error::Remote(_) | Error::Http(_) => {
                "Could not reach the clinic database. Please try again.".to_string()
            }
            Error::SubmissionInFlight => "Please wait for the current save to finish.".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
