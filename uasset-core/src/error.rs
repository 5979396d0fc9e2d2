//! Error types for document handling

use std::io;
use thiserror::Error;

/// Result type alias for document operations
pub type Result<T> = std::result::Result<T, UassetError>;

/// Main error type for document load/save and value conversion
#[derive(Error, Debug)]
pub enum UassetError {
    /// IO errors when reading/writing files
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML (de)serialization errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Document content that cannot be interpreted
    #[error("Document format error: {0}")]
    Format(String),

    /// Raw data block that cannot be decoded back into bytes
    #[error("Raw data error: {message}")]
    RawData { message: String },

    /// Type conversion errors
    #[error("Type conversion error: cannot convert {from} to {to}")]
    TypeConversion { from: String, to: String },
}

impl UassetError {
    /// Create a format error
    pub fn format<S: Into<String>>(message: S) -> Self {
        Self::Format(message.into())
    }

    /// Create a raw data error
    pub fn raw_data<S: Into<String>>(message: S) -> Self {
        Self::RawData {
            message: message.into(),
        }
    }

    /// Create a type conversion error
    pub fn type_conversion<S: Into<String>>(from: S, to: S) -> Self {
        Self::TypeConversion {
            from: from.into(),
            to: to.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = UassetError::format("test message");
        assert!(matches!(err, UassetError::Format(_)));
    }

    #[test]
    fn test_error_display() {
        let err = UassetError::type_conversion("Int32", "Name");
        let msg = format!("{}", err);
        assert!(msg.contains("Int32"));
        assert!(msg.contains("Name"));
    }
}
