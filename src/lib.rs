//! Asset Package Converter
//!
//! Converts versioned engine asset packages into an editable document tree
//! and back, keeping every export's original bytes so an unedited document
//! writes out the package it came from.
//!
//! # Examples
//!
//! ```rust,no_run
//! use uasset::{DocumentFormat, EncodeOptions};
//!
//! // Package to document
//! let options = uasset::decode_options_for("Content/UI/WBP_Menu.uasset");
//! let decoded = uasset::decode_file("Content/UI/WBP_Menu.uasset", &options)?;
//! uasset::save_document(&decoded.value, "WBP_Menu.json", DocumentFormat::Json)?;
//!
//! // Document back to package
//! let diagnostics =
//!     uasset::encode_file("WBP_Menu.json", "WBP_Menu.uasset", &EncodeOptions::default())?;
//! println!("{} warnings", diagnostics.warning_count());
//!
//! # Ok::<(), uasset::BinaryError>(())
//! ```

pub use uasset_binary::{
    BinaryError, BodySource, DecodeOptions, Decoded, Diagnostic, DiagnosticKind, DiagnosticLevel,
    Diagnostics, EncodeOptions, Encoded, ImportRepairTable, Result, VerifyReport, decode_package,
    encode_document, verify_round_trip,
};
pub use uasset_core::{
    Delegate, Document, DocumentFormat, ExportDesc, ExportValue, ImportDesc, PackageInfo,
    Property, PropertyMap, PropertyValue, RawData, StructValue, UassetError, constants,
};

#[cfg(feature = "async")]
pub use uasset_binary::{decode_package_async, encode_document_async, verify_round_trip_async};

use std::path::Path;
use tracing::info;

/// Decode options rooted at `/Game/{file stem}`
pub fn decode_options_for<P: AsRef<Path>>(path: P) -> DecodeOptions {
    let stem = path
        .as_ref()
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Package");
    DecodeOptions::default().with_package_from_file_stem(stem)
}

/// Read and decode a package file
pub fn decode_file<P: AsRef<Path>>(path: P, options: &DecodeOptions) -> Result<Decoded<Document>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    info!(path = %path.display(), bytes = bytes.len(), "Read package");
    decode_package(&bytes, options)
}

/// Write a document as JSON or YAML
pub fn save_document<P: AsRef<Path>>(
    document: &Document,
    path: P,
    format: DocumentFormat,
) -> Result<()> {
    let text = document.to_string_as(format)?;
    std::fs::write(path.as_ref(), text)?;
    Ok(())
}

/// Load a document file and write the package it describes
///
/// Returns the writer's diagnostics; the bytes are already on disk.
pub fn encode_file<P: AsRef<Path>, Q: AsRef<Path>>(
    document_path: P,
    output: Q,
    options: &EncodeOptions,
) -> Result<Diagnostics> {
    let document = Document::load(document_path.as_ref())?;
    let encoded = encode_document(&document, options)?;
    std::fs::write(output.as_ref(), &encoded.bytes)?;
    info!(
        path = %output.as_ref().display(),
        bytes = encoded.bytes.len(),
        "Wrote package"
    );
    Ok(encoded.diagnostics)
}

/// Round-trip a package file in memory
pub fn verify_file<P: AsRef<Path>>(
    path: P,
    decode_options: &DecodeOptions,
    encode_options: &EncodeOptions,
) -> Result<VerifyReport> {
    let bytes = std::fs::read(path.as_ref())?;
    verify_round_trip(&bytes, decode_options, encode_options)
}
