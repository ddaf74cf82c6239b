//! Error types for the shared helpers

use thiserror::Error;

/// Result type alias for helpers in this crate
pub type Result<T> = std::result::Result<T, CommonError>;

#[derive(Error, Debug)]
pub enum CommonError {
    #[error("Payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Payload is empty")]
    EmptyPayload,

    #[error("Invalid logging configuration: {0}")]
    LogConfig(String),
}
