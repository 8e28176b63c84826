//! Error types for Kasparro

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Request rejected before any provider call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Deployment is missing required configuration (e.g. provider credential)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Provider answered with a non-success status
    #[error("Provider error {status}: {details}")]
    Provider { status: u16, details: String },

    /// Provider could not be reached or did not answer usefully
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl Error {
    /// Whether this error is raised before any external call is attempted
    pub fn is_precondition(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::Configuration(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
