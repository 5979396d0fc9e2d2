//! 128-bit identifiers
//!
//! Packages carry several GUIDs (package GUID, persistent GUID, struct and
//! property GUIDs). On disk they are 16 raw bytes; in the document they are
//! written as 32 upper-case hex digits.

use crate::error::UassetError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Guid(pub [u8; 16]);

impl Guid {
    pub const ZERO: Guid = Guid([0; 16]);

    pub fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; 16]
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode_upper(self.0))
    }
}

impl FromStr for Guid {
    type Err = UassetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned: String = s.chars().filter(|c| *c != '-').collect();
        let bytes = hex::decode(&cleaned)
            .map_err(|e| UassetError::format(format!("Invalid GUID '{}': {}", s, e)))?;
        let bytes: [u8; 16] = bytes
            .try_into()
            .map_err(|_| UassetError::format(format!("GUID '{}' is not 16 bytes", s)))?;
        Ok(Self(bytes))
    }
}

impl Serialize for Guid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Guid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
