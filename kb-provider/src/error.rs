//! Errors raised before a Kuboard request can be sent.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Invalid credentials for site '{site}': {reason}")]
    InvalidCredentials { site: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
