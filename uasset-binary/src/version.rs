//! Package versioning
//!
//! Format constants, object-version gates and the engine version tuple
//! stored in the package header.

use crate::error::{BinaryError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Package tag in native byte order
pub const PACKAGE_FILE_TAG: u32 = 0x9E2A83C1;
/// Package tag as read from a foreign-endian file
pub const PACKAGE_FILE_TAG_SWAPPED: u32 = 0xC1832A9E;

/// Legacy file versions this codec understands
pub const SUPPORTED_LEGACY_VERSIONS: &[i32] = &[-6, -7, -8];

/// Legacy version that introduced the UE5 version field
pub const LEGACY_VERSION_UE5: i32 = -8;
/// Legacy versions above this carry a texture allocation count
pub const LEGACY_VERSION_TEXTURE_ALLOCATIONS: i32 = -7;

/// Package flag marking editor-only data as stripped
pub const PKG_FILTER_EDITOR_ONLY: u32 = 0x8000_0000;

/// UE4 object version gates
pub mod ue4 {
    pub const WORLD_LEVEL_INFO: i32 = 224;
    pub const ADDED_CHUNKID_TO_ASSETDATA_AND_UPACKAGE: i32 = 278;
    pub const CHANGED_CHUNKID_TO_BE_AN_ARRAY_OF_CHUNKIDS: i32 = 326;
    pub const ENGINE_VERSION_OBJECT: i32 = 336;
    pub const ADD_STRING_ASSET_REFERENCES_MAP: i32 = 384;
    pub const PACKAGE_SUMMARY_HAS_COMPATIBLE_ENGINE_VERSION: i32 = 444;
    pub const SERIALIZE_TEXT_IN_PACKAGES: i32 = 459;
    pub const NAME_HASHES_SERIALIZED: i32 = 504;
    pub const PRELOAD_DEPENDENCIES_IN_COOKED_EXPORTS: i32 = 507;
    pub const ADDED_SEARCHABLE_NAMES: i32 = 510;
    pub const ADDED_PACKAGE_SUMMARY_LOCALIZATION_ID: i32 = 516;
    pub const ADDED_PACKAGE_OWNER: i32 = 518;
    pub const NON_OUTER_PACKAGE_IMPORT: i32 = 520;
}

/// Check whether a legacy file version is supported
pub fn is_supported_legacy_version(version: i32) -> bool {
    SUPPORTED_LEGACY_VERSIONS.contains(&version)
}

/// Object versions of one package, used to answer "is this field present"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectVersion {
    pub legacy: i32,
    pub ue4: i32,
    pub ue5: Option<i32>,
}

impl ObjectVersion {
    pub fn new(legacy: i32, ue4: i32, ue5: Option<i32>) -> Self {
        Self { legacy, ue4, ue5 }
    }

    /// UE4 version is at least `gate`
    pub fn at_least(&self, gate: i32) -> bool {
        self.ue4 >= gate
    }

    pub fn has_ue5_version(&self) -> bool {
        self.legacy <= LEGACY_VERSION_UE5
    }

    pub fn has_texture_allocations(&self) -> bool {
        self.legacy > LEGACY_VERSION_TEXTURE_ALLOCATIONS
    }

    pub fn has_owner_persistent_guid(&self) -> bool {
        self.at_least(ue4::ADDED_PACKAGE_OWNER) && self.ue4 < ue4::NON_OUTER_PACKAGE_IMPORT
    }

    pub fn has_single_chunk_id(&self) -> bool {
        self.at_least(ue4::ADDED_CHUNKID_TO_ASSETDATA_AND_UPACKAGE)
            && self.ue4 < ue4::CHANGED_CHUNKID_TO_BE_AN_ARRAY_OF_CHUNKIDS
    }

    /// Imports carry the extra opaque pair
    pub fn has_import_extras(&self, package_flags: u32) -> bool {
        self.at_least(ue4::NON_OUTER_PACKAGE_IMPORT) && package_flags & PKG_FILTER_EDITOR_ONLY == 0
    }
}

static ENGINE_VERSION_REGEX: Lazy<std::result::Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"^(\d+)\.(\d+)\.(\d+)-(\d+)\+(.*)$"));

/// Engine version tuple: `major.minor.patch-changelist+branch`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Default, Serialize, Deserialize)]
pub struct EngineVersion {
    pub major: u16,
    pub minor: u16,
    pub patch: u16,
    pub changelist: u32,
    pub branch: String,
}

impl EngineVersion {
    pub fn new<S: Into<String>>(major: u16, minor: u16, patch: u16, changelist: u32, branch: S) -> Self {
        Self {
            major,
            minor,
            patch,
            changelist,
            branch: branch.into(),
        }
    }

    /// Version recorded as a bare changelist by old packages
    pub fn from_changelist(changelist: i32) -> Self {
        Self::new(4, 0, 0, changelist as u32, "")
    }

    /// Parse a version string
    pub fn parse_version(version: &str) -> Result<Self> {
        let regex = ENGINE_VERSION_REGEX
            .as_ref()
            .map_err(|e| BinaryError::generic(format!("Failed to compile regex: {}", e)))?;
        let captures = regex
            .captures(version.trim())
            .ok_or_else(|| BinaryError::invalid_data(format!("Invalid engine version: {}", version)))?;

        let number = |i: usize| -> Result<u32> {
            captures[i]
                .parse::<u32>()
                .map_err(|_| BinaryError::invalid_data(format!("Invalid engine version: {}", version)))
        };
        let component = |i: usize| -> Result<u16> {
            u16::try_from(number(i)?)
                .map_err(|_| BinaryError::invalid_data(format!("Invalid engine version: {}", version)))
        };

        Ok(Self {
            major: component(1)?,
            minor: component(2)?,
            patch: component(3)?,
            changelist: number(4)?,
            branch: captures[5].to_string(),
        })
    }

    pub fn as_tuple(&self) -> (u16, u16, u16, u32) {
        (self.major, self.minor, self.patch, self.changelist)
    }
}

impl fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}-{}+{}",
            self.major, self.minor, self.patch, self.changelist, self.branch
        )
    }
}

impl FromStr for EngineVersion {
    type Err = BinaryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_version(s)
    }
}
