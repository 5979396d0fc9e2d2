//! The document tree
//!
//! A [`Document`] is the editable form of one package: version information,
//! the preserved name and import tables, gatherable text stubs, thumbnails and
//! the export map keyed by fully-qualified object path.

use crate::error::{Result, UassetError};
use crate::guid::Guid;
use crate::raw::{RawData, base64_bytes};
use crate::value::PropertyMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Supported document encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentFormat {
    #[default]
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Pick a format from a file extension, defaulting to JSON
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => DocumentFormat::Yaml,
            _ => DocumentFormat::Json,
        }
    }

    /// Parse a format name (`json`, `yaml`)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "json" => Some(DocumentFormat::Json),
            "yaml" | "yml" => Some(DocumentFormat::Yaml),
            _ => None,
        }
    }
}

/// Full converted package
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Document {
    #[serde(default)]
    pub summary: PackageInfo,
    /// Original name table, in table order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<String>,
    /// Original import table, in table order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<ImportDesc>,
    #[serde(default)]
    pub text_data: Vec<GatherableTextStub>,
    #[serde(default)]
    pub thumbnails: Thumbnails,
    #[serde(default)]
    pub exports: IndexMap<String, ExportDesc>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of exports
    pub fn export_count(&self) -> usize {
        self.exports.len()
    }

    /// Look up an export by its fully-qualified path
    pub fn export(&self, path: &str) -> Option<&ExportDesc> {
        self.exports.get(path)
    }

    /// Filter exports by class identifier
    pub fn exports_of_class<'a>(
        &'a self,
        class: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a ExportDesc)> + 'a {
        self.exports.iter().filter(move |(_, e)| e.class == class)
    }

    /// Serialize to text in the given format
    pub fn to_string_as(&self, format: DocumentFormat) -> Result<String> {
        match format {
            DocumentFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            DocumentFormat::Yaml => Ok(serde_yaml::to_string(self)?),
        }
    }

    /// Parse from text in the given format
    pub fn from_str_as(text: &str, format: DocumentFormat) -> Result<Self> {
        match format {
            DocumentFormat::Json => Ok(serde_json::from_str(text)?),
            DocumentFormat::Yaml => Ok(serde_yaml::from_str(text)?),
        }
    }

    /// Load a document, choosing the format from the file extension
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let format = DocumentFormat::from_path(&path);
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_str_as(&text, format)
    }

    /// Save a document, choosing the format from the file extension
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let format = DocumentFormat::from_path(&path);
        let text = self.to_string_as(format)?;
        std::fs::write(path.as_ref(), text)?;
        Ok(())
    }
}

/// Version and identity information from the package header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PackageInfo {
    pub legacy_file_version: i32,
    pub legacy_ue3_version: i32,
    #[serde(rename = "FileVersionUE4")]
    pub file_version_ue4: i32,
    #[serde(rename = "FileVersionUE5", default, skip_serializing_if = "Option::is_none")]
    pub file_version_ue5: Option<i32>,
    pub file_version_licensee: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_versions: Vec<CustomVersion>,
    #[serde(default = "default_folder_name")]
    pub folder_name: String,
    #[serde(default)]
    pub package_flags: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localization_id: Option<String>,
    #[serde(default)]
    pub guid: Guid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistent_guid: Option<Guid>,
    /// `major.minor.patch-changelist+branch`
    pub saved_by_engine_version: String,
    pub compatible_engine_version: String,
    #[serde(default)]
    pub package_source: u32,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub big_endian: bool,
}

fn default_folder_name() -> String {
    crate::constants::NONE_NAME.to_string()
}

impl Default for PackageInfo {
    fn default() -> Self {
        Self {
            legacy_file_version: -7,
            legacy_ue3_version: 864,
            file_version_ue4: 522,
            file_version_ue5: None,
            file_version_licensee: 0,
            custom_versions: Vec::new(),
            folder_name: default_folder_name(),
            package_flags: 0,
            localization_id: None,
            guid: Guid::ZERO,
            persistent_guid: None,
            saved_by_engine_version: "4.27.2-0+++UE4+Release-4.27".to_string(),
            compatible_engine_version: "4.27.0-0+++UE4+Release-4.27".to_string(),
            package_source: 0,
            big_endian: false,
        }
    }
}

/// One custom version entry (GUID key + version number)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomVersion {
    pub key: Guid,
    pub version: i32,
}

/// Import table entry, names already resolved to text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImportDesc {
    pub class_package: String,
    pub class_name: String,
    /// Raw cross-reference to the outer object
    pub outer_index: i32,
    pub object_name: String,
}

/// Placeholder for one gatherable text entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GatherableTextStub {
    pub index: usize,
}

/// Thumbnail section: image blobs plus the index naming their objects
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Thumbnails {
    #[serde(default)]
    pub thumbnails: Vec<ThumbnailBlob>,
    #[serde(default)]
    pub index: Vec<ThumbnailIndexEntry>,
}

impl Thumbnails {
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ThumbnailBlob {
    pub width: i32,
    pub height: i32,
    #[serde(with = "base64_bytes")]
    pub image: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ThumbnailIndexEntry {
    pub object_class_name: String,
    pub object_path_without_package_name: String,
    /// Position of the matching blob in [`Thumbnails::thumbnails`]
    pub blob: usize,
}

/// One export in the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExportDesc {
    /// Resolved class identifier (`/Script/Package.Class` or an export name)
    pub class: String,
    /// Import the class was read from, when it is not spelled by `class`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_import: Option<String>,
    #[serde(rename = "Super", default, skip_serializing_if = "Option::is_none")]
    pub super_struct: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default)]
    pub object_flags: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outer: Option<String>,
    #[serde(default)]
    pub forced_export: bool,
    #[serde(default)]
    pub not_for_client: bool,
    #[serde(default)]
    pub not_for_server: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_asset: bool,
    /// Legacy placement of the raw fallback, consulted after `Value.RawData`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_data: Option<RawData>,
    #[serde(default)]
    pub value: ExportValue,
}

impl ExportDesc {
    pub fn new<S: Into<String>>(class: S) -> Self {
        Self {
            class: class.into(),
            class_import: None,
            super_struct: None,
            template: None,
            object_flags: 0,
            outer: None,
            forced_export: false,
            not_for_client: false,
            not_for_server: false,
            is_asset: false,
            raw_data: None,
            value: ExportValue::default(),
        }
    }
}

/// Payload of an export: structured view and raw fallback
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExportValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<PropertyMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_data: Option<RawData>,
    /// Synthesized scaffolding; never written back to the package
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub sub_objects: IndexMap<String, SyntheticObject>,
    /// Soft failures recorded while decoding this export
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<String>,
}

/// Sub-object that exists only in the document form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SyntheticObject {
    pub class: String,
}

/// Read a document file from disk
pub fn load_document<P: AsRef<Path>>(path: P) -> Result<Document> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(UassetError::format(format!(
            "Document not found: {}",
            path.display()
        )));
    }
    Document::load(path)
}
