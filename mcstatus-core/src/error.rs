//! Error types for `mcstatus`
//!
//! This module defines the error types used throughout the core library,
//! covering configuration storage, the editor wire codec, and live status
//! queries.
//!
//! "Not found" is never an error here: the store reports missing groups and
//! servers through `bool` and `Option` returns.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for `mcstatus` operations
#[derive(Debug, Error)]
pub enum McStatusError {
    /// Configuration and storage errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Editor codec errors
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Live status query errors
    #[error("Status error: {0}")]
    Status(#[from] StatusError),

    /// I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to configuration storage and validation
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse a configuration file
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {reason}")]
    Validation {
        /// The field that failed validation
        field: String,
        /// The reason for validation failure
        reason: String,
    },

    /// Configuration directory could not be determined
    #[error("Configuration directory not found: {0}")]
    NotFound(PathBuf),

    /// Failed to write a configuration file
    #[error("Failed to write configuration: {0}")]
    Write(String),

    /// Failed to serialize configuration
    #[error("Failed to serialize configuration: {0}")]
    Serialize(String),

    /// Failed to deserialize configuration
    #[error("Failed to deserialize configuration: {0}")]
    Deserialize(String),
}

impl ConfigError {
    /// Shorthand for a [`ConfigError::Validation`]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Errors produced while encoding or decoding an editor string
#[derive(Debug, Error)]
pub enum CodecError {
    /// Input is not valid URL-safe base64
    #[error("Invalid base64 data: {0}")]
    Base64(String),

    /// Compressed stream is corrupt or truncated
    #[error("Failed to decompress data: {0}")]
    Decompress(String),

    /// Decompressed payload is not valid JSON
    #[error("Invalid JSON payload: {0}")]
    Json(String),

    /// Payload is valid JSON but not the expected positional layout
    #[error("Unexpected payload shape: {0}")]
    Shape(String),

    /// Decompressed payload exceeds the size limit
    #[error("Decoded payload exceeds {limit} bytes")]
    TooLarge {
        /// The maximum accepted decoded size
        limit: usize,
    },

    /// Failed to serialize or compress a configuration
    #[error("Failed to encode configuration: {0}")]
    Serialize(String),
}

/// Errors related to live status queries
#[derive(Debug, Error)]
pub enum StatusError {
    /// The status request failed at the transport level
    #[error("Status request for {query} failed: {reason}")]
    Request {
        /// The query string that was sent
        query: String,
        /// The failure reason
        reason: String,
    },

    /// The status request did not complete in time
    #[error("Status request for {query} timed out after {seconds}s")]
    Timeout {
        /// The query string that was sent
        query: String,
        /// The timeout that elapsed
        seconds: u64,
    },

    /// The status response could not be understood
    #[error("Invalid status response: {0}")]
    InvalidResponse(String),
}

/// Result type alias for `mcstatus` operations
pub type Result<T> = std::result::Result<T, McStatusError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for codec operations
pub type CodecResult<T> = std::result::Result<T, CodecError>;

/// Result type alias for status operations
pub type StatusResult<T> = std::result::Result<T, StatusError>;
