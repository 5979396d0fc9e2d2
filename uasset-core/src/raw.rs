//! Raw-byte fallback blocks
//!
//! Every export in the document keeps the exact bytes it was decoded from.
//! The bytes are base64 encoded and split into fixed-width lines so the
//! document stays diff-friendly, and a SHA-1 digest records what the bytes
//! looked like when they were captured.

use crate::constants::DEFAULT_CHUNK_WIDTH;
use crate::error::{Result, UassetError};
use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

/// Raw bytes preserved alongside structured properties
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawData {
    /// Lower-case hex SHA-1 of the original bytes
    pub hash: String,
    /// Base64 text split into lines of a fixed width
    pub data: Vec<String>,
}

impl RawData {
    /// Capture bytes using the default line width
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::from_bytes_with_width(bytes, DEFAULT_CHUNK_WIDTH)
    }

    /// Capture bytes, splitting the encoded text every `width` characters
    pub fn from_bytes_with_width(bytes: &[u8], width: usize) -> Self {
        let encoded = general_purpose::STANDARD.encode(bytes);
        Self {
            hash: digest(bytes),
            data: chunk_text(&encoded, width.max(4)),
        }
    }

    /// Decode the stored text back into bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let joined: String = self.data.iter().map(|line| line.trim()).collect();
        general_purpose::STANDARD
            .decode(joined.as_bytes())
            .map_err(|e| UassetError::raw_data(format!("Invalid base64 payload: {}", e)))
    }

    /// Check that the stored digest still matches the stored bytes
    pub fn verify(&self) -> Result<bool> {
        let bytes = self.to_bytes()?;
        Ok(digest(&bytes).eq_ignore_ascii_case(&self.hash))
    }

    /// Total number of encoded characters
    pub fn encoded_len(&self) -> usize {
        self.data.iter().map(String::len).sum()
    }
}

/// Lower-case hex SHA-1 digest
pub fn digest(bytes: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn chunk_text(text: &str, width: usize) -> Vec<String> {
    // base64 output is ASCII, so byte chunks are char chunks
    text.as_bytes()
        .chunks(width)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect()
}

/// Serde adapter for byte buffers stored as a single base64 string
pub mod base64_bytes {
    use base64::{Engine as _, engine::general_purpose};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&general_purpose::STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        general_purpose::STANDARD
            .decode(text.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_width() {
        let bytes: Vec<u8> = (0..=255).collect();
        let raw = RawData::from_bytes(&bytes);
        assert!(raw.data.len() > 1);
        for line in &raw.data[..raw.data.len() - 1] {
            assert_eq!(line.len(), DEFAULT_CHUNK_WIDTH);
        }
        assert!(raw.data.last().unwrap().len() <= DEFAULT_CHUNK_WIDTH);
        assert_eq!(raw.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_digest_is_sha1() {
        // SHA-1 of the empty string
        assert_eq!(digest(b""), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
        let raw = RawData::from_bytes(b"");
        assert!(raw.data.is_empty());
        assert!(raw.verify().unwrap());
    }

    #[test]
    fn test_verify_detects_edits() {
        let mut raw = RawData::from_bytes_with_width(b"hello world", 8);
        assert!(raw.verify().unwrap());
        raw.data = RawData::from_bytes(b"hello there").data;
        assert!(!raw.verify().unwrap());
    }

    #[test]
    fn test_invalid_payload() {
        let raw = RawData {
            hash: String::new(),
            data: vec!["not base64!".to_string()],
        };
        assert!(raw.to_bytes().is_err());
    }
}
