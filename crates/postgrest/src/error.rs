use http::StatusCode;
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Error body returned by PostgREST on a non-2xx response.
///
/// Every field is optional: the server omits `hint` and `details` for most
/// errors, and proxies in front of it may drop `code`.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct PostgrestApiErrorDetails {
    pub code: Option<String>,
    pub message: Option<String>,
    pub details: Option<String>,
    pub hint: Option<String>,
}

impl fmt::Display for PostgrestApiErrorDetails {
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

/// Errors produced by the data API client.
#[derive(Error, Debug)]
pub enum PostgrestError {
    /// The server answered with a non-2xx status and a well-formed error body.
    #[error("API error: {details} (Status: {status})")]
    ApiError {
        details: PostgrestApiErrorDetails,
        status: StatusCode,
    },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),

    /// The request payload could not be turned into JSON.
    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// A response body (success or error) was not the JSON we expected.
    #[error("Deserialization error: {0}")]
    DeserializationError(#[source] serde_json::Error),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
}

impl PostgrestError {
    /// HTTP status attached to an API error.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            PostgrestError::ApiError { status, .. } => Some(*status),
            PostgrestError::NetworkError(e) => e.status(),
            _ => None,
        }
    }

    /// Machine-readable PostgREST error code (e.g. `PGRST116`, `23505`).
    pub fn code(&self) -> Option<&str> {
        match self {
            PostgrestError::ApiError { details, .. } => details.code.as_deref(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PostgrestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_details_display_skips_missing_parts() {
        let details = PostgrestApiErrorDetails {
            code: Some("23505".to_string()),
            message: Some("duplicate key value".to_string()),
            details: None,
            hint: None,
        };
        assert_eq!(
            details.to_string(),
            "Code: 23505, Message: duplicate key value"
        );
    }

    #[test]
    fn test_error_accessors() {
        let err = PostgrestError::ApiError {
            details: PostgrestApiErrorDetails {
                code: Some("PGRST116".to_string()),
                ..Default::default()
            },
            status: StatusCode::NOT_ACCEPTABLE,
        };
        assert_eq!(err.status(), Some(StatusCode::NOT_ACCEPTABLE));
        assert_eq!(err.code(), Some("PGRST116"));

        let err = PostgrestError::InvalidParameters("bad".to_string());
        assert_eq!(err.status(), None);
        assert_eq!(err.code(), None);
    }
}
