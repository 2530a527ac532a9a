//! Error handling for the supa client

use thiserror::Error;

use supa_auth::AuthError;
use supa_postgrest::PostgrestError;
use supa_storage::StorageError;

/// Unified error type for the supa client
#[derive(Error, Debug)]
pub enum Error {
    /// The API key was empty or whitespace
    #[error("apiKey is mandatory")]
    EmptyApiKey,

    /// Inconsistent or unusable configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Building the HTTP client failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Postgrest(#[from] PostgrestError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl Error {
    pub fn config<T: std::fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
