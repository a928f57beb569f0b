//! Error types for quotesign

use thiserror::Error;

/// Main error type for quotesign operations
#[derive(Error, Debug)]
pub enum QuoteSignError {
    // Payload errors
    #[error("Format error: {0}")]
    FormatError(String),

    #[error("Decode error ({stage}): {reason}")]
    DecodeError { stage: &'static str, reason: String },

    // Cryptographic errors
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Invalid key format: {0}")]
    InvalidKeyFormat(String),

    // Workflow errors
    #[error("Unsupported network: {0}")]
    UnsupportedNetwork(String),

    #[error("Invalid quote: {0}")]
    InvalidQuote(String),

    // Storage errors
    #[error("Storage error: {0}")]
    StorageError(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl QuoteSignError {
    /// Build a decode error for the named parsing stage
    pub fn decode(stage: &'static str, reason: impl Into<String>) -> Self {
        QuoteSignError::DecodeError {
            stage,
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for QuoteSignError {
    fn from(err: std::io::Error) -> Self {
        QuoteSignError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for QuoteSignError {
    fn from(err: serde_json::Error) -> Self {
        QuoteSignError::StorageError(format!("JSON error: {}", err))
    }
}

impl From<rlp::DecoderError> for QuoteSignError {
    fn from(err: rlp::DecoderError) -> Self {
        QuoteSignError::decode("rlp", err.to_string())
    }
}

impl From<base64::DecodeError> for QuoteSignError {
    fn from(err: base64::DecodeError) -> Self {
        QuoteSignError::decode("base64", err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, QuoteSignError>;
