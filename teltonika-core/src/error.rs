//! Error types for Teltonika API operations

use thiserror::Error;

/// Core error type for Teltonika API operations
#[derive(Error, Debug)]
pub enum TeltonikaError {
    /// Transport-level failure: DNS, refused connection, timeout, TLS
    #[error("Connection error: {0}")]
    Connection(String),

    /// Credentials or bearer token rejected by the device
    #[error("Authentication error: {message}")]
    Auth { message: String, code: Option<i64> },

    /// Login rejected with HTTP 401
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Response body is not JSON or does not match the expected schema
    #[error("Decode error: {0}")]
    Decode(String),

    /// Device reported a non-authentication error
    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TeltonikaError {
    /// Build an authentication error without a device error code.
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
            code: None,
        }
    }

    /// Whether the device rejected the credentials or token.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. } | Self::InvalidCredentials)
    }

    /// Device error code carried by this error, if any.
    ///
    /// A 401 login counts as code 121 ("login failed").
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Auth { code, .. } => *code,
            Self::InvalidCredentials => Some(crate::ErrorCode::LoginFailed.code()),
            Self::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Result type alias for Teltonika operations
pub type Result<T> = std::result::Result<T, TeltonikaError>;

impl From<serde_json::Error> for TeltonikaError {
    fn from(err: serde_json::Error) -> Self {
        TeltonikaError::Decode(err.to_string())
    }
}
