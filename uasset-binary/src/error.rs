//! Error types for package decoding and encoding

use thiserror::Error;
use uasset_core::UassetError;

/// Result type for package codec operations
pub type Result<T> = std::result::Result<T, BinaryError>;

/// Errors that can occur while decoding or encoding a package
#[derive(Error, Debug)]
pub enum BinaryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Legacy or object version outside the supported set
    #[error("Unsupported package version: {0}")]
    UnsupportedVersion(String),

    /// Malformed counts, strings or references
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A read ran past the end of its slice
    #[error("Not enough data: expected {expected}, got {actual}")]
    NotEnoughData { expected: usize, actual: usize },

    #[error("Invalid signature: expected {expected}, got {actual}")]
    InvalidSignature { expected: String, actual: String },

    /// Compressed, chunked or cook-extra packages
    #[error("Unsupported feature: {0}")]
    Unsupported(String),

    /// Structural limit hit (nesting depth, header reserve, patch bounds)
    #[error("Structural error: {0}")]
    Structural(String),

    /// Document content that cannot be encoded
    #[error("Document error: {0}")]
    Document(#[from] UassetError),

    #[error("Error: {0}")]
    Generic(String),
}

impl BinaryError {
    pub fn unsupported_version<S: Into<String>>(version: S) -> Self {
        Self::UnsupportedVersion(version.into())
    }

    pub fn invalid_data<S: Into<String>>(msg: S) -> Self {
        Self::InvalidData(msg.into())
    }

    pub fn not_enough_data(expected: usize, actual: usize) -> Self {
        Self::NotEnoughData { expected, actual }
    }

    pub fn invalid_signature<S: Into<String>>(expected: S, actual: S) -> Self {
        Self::InvalidSignature {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn unsupported<S: Into<String>>(feature: S) -> Self {
        Self::Unsupported(feature.into())
    }

    pub fn structural<S: Into<String>>(msg: S) -> Self {
        Self::Structural(msg.into())
    }

    pub fn generic<S: Into<String>>(msg: S) -> Self {
        Self::Generic(msg.into())
    }

    /// Whether encoding can move on to the next body source
    ///
    /// Bad content inside one export is recoverable; I/O failures, version
    /// problems and invalid documents stop the whole pass.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            BinaryError::InvalidData(_)
                | BinaryError::NotEnoughData { .. }
                | BinaryError::Structural(_)
                | BinaryError::Generic(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_enough_data_error() {
        let err = BinaryError::not_enough_data(100, 50);
        assert!(matches!(err, BinaryError::NotEnoughData { .. }));
        assert_eq!(err.to_string(), "Not enough data: expected 100, got 50");
    }

    #[test]
    fn test_invalid_signature_error() {
        let err = BinaryError::invalid_signature("0x9E2A83C1", "0x00000000");
        assert_eq!(
            err.to_string(),
            "Invalid signature: expected 0x9E2A83C1, got 0x00000000"
        );
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(BinaryError::structural("too deep").is_recoverable());
        assert!(BinaryError::invalid_data("negative count").is_recoverable());
        assert!(!BinaryError::unsupported("compressed chunks").is_recoverable());
        assert!(!BinaryError::unsupported_version("-4").is_recoverable());
    }
}
