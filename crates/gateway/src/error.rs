//! Errors reported by a data gateway

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Error body returned by PostgREST on a failed request
#[derive(Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ApiErrorDetails {
    pub code: Option<String>,
    pub message: Option<String>,
    pub details: Option<String>,
    pub hint: Option<String>,
}

impl fmt::Display for ApiErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(code) = &self.code {
            parts.push(format!("Code: {}", code));
        }
        if let Some(message) = &self.message {
            parts.push(format!("Message: {}", message));
        }
        if let Some(details) = &self.details {
            parts.push(format!("Details: {}", details));
        }
        if let Some(hint) = &self.hint {
            parts.push(format!("Hint: {}", hint));
        }
        write!(f, "{}", parts.join(", "))
    }
}

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("API error: {details} (Status: {status})")]
    Api {
        details: ApiErrorDetails,
        status: reqwest::StatusCode,
    },

    #[error("API error (unparsed): {message} (Status: {status})")]
    UnparsedApi {
        message: String,
        status: reqwest::StatusCode,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("No row with id {id} in {table}")]
    NotFound { table: String, id: String },

    #[error("Row {id} in {table} was changed by someone else")]
    Conflict { table: String, id: String },

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
}

impl GatewayError {
    /// Build an API error from a failed response body, keeping the raw text
    /// when it is not a PostgREST error document.
    pub fn from_response(status: reqwest::StatusCode, body: String) -> Self {
        match serde_json::from_str::<ApiErrorDetails>(&body) {
            Ok(details) => GatewayError::Api { details, status },
            Err(_) => GatewayError::UnparsedApi {
                message: body,
                status,
            },
        }
    }

    /// HTTP status of the failed request, if the server answered at all
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            GatewayError::Api { status, .. } | GatewayError::UnparsedApi { status, .. } => {
                Some(*status)
            }
            GatewayError::Network(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, GatewayError::Conflict { .. })
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
