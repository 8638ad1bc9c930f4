//! Error types for the bistro client.
//!
//! A single error type with explicit variants for transport, authentication,
//! protocol, input validation and credential storage failures.

use std::fmt;
use thiserror::Error;

/// The unified error type for bistro operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication and session errors.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Non-success responses from the API.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Input validation errors.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// Durable credential storage errors.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl Error {
    /// Returns true when the server rejected the attached access credential.
    pub fn is_expired_credential(&self) -> bool {
        matches!(self, Error::Protocol(err) if err.is_expired_credential())
    }

    /// Returns the HTTP status if this error came from an API response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Protocol(err) => Some(err.status),
            _ => None,
        }
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Authentication-related errors.
///
/// Cloneable so that the outcome of a single refresh can be handed to every
/// request that was waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// A refresh was needed but no refresh token is stored.
    #[error("no refresh token available")]
    NoRefreshToken,

    /// The refresh endpoint rejected the refresh token, failed, or timed out.
    #[error("token refresh rejected: {reason}")]
    RefreshRejected { reason: String },

    /// The task driving the refresh went away before it finished.
    #[error("token refresh abandoned before completion")]
    RefreshAbandoned,

    /// The session has already been terminated; sign in again.
    #[error("session terminated")]
    SessionTerminated,

    /// Provisioning was attempted without a setup token.
    #[error("no setup token; sign in or verify your email first")]
    SetupTokenMissing,

    /// The server answered an auth call with a shape we do not understand.
    #[error("unexpected auth response: {reason}")]
    UnexpectedResponse { reason: String },
}

/// Protocol-level errors from API responses.
#[derive(Debug, Clone)]
pub struct ProtocolError {
    /// HTTP status code.
    pub status: u16,
    /// Machine-readable error code (if present).
    pub error: Option<String>,
    /// Error message from the server.
    pub message: Option<String>,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref error) = self.error {
            write!(f, " [{}]", error)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(status: u16, error: Option<String>, message: Option<String>) -> Self {
        Self {
            status,
            error,
            message,
        }
    }

    /// Check if the server reported the access credential as invalid or expired.
    pub fn is_expired_credential(&self) -> bool {
        self.status == 401
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// Request or response body could not be (de)serialized.
    #[error("invalid JSON body: {message}")]
    Json { message: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidInput(InvalidInputError::Json {
            message: err.to_string(),
        })
    }
}

/// Durable credential storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing store failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The backing store holds data we cannot decode.
    #[error("corrupt credential store: {message}")]
    Corrupt { message: String },

    /// The backend is unavailable for another reason.
    #[error("credential store unavailable: {message}")]
    Unavailable { message: String },
}
