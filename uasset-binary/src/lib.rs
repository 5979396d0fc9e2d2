//! Engine Asset Package Codec
//!
//! This crate reads and writes versioned engine asset packages:
//! - Package summary, name, import and export tables
//! - Tagged property streams inside export bodies
//! - Thumbnails and the trailing file tag
//!
//! # Features
//!
//! - **Lossless round trip**: every export keeps its raw bytes next to the
//!   decoded properties, and the writer prefers them by default
//! - **Soft failures**: format quirks become [`Diagnostics`] instead of errors
//! - **Import repair**: known-bad import entries are fixed through a lookup table
//!
//! ## Feature Flags
//!
//! - `async`: blocking-task wrappers around the three host operations
//!
//! # Example
//!
//! ```rust,no_run
//! use uasset_binary::{DecodeOptions, EncodeOptions, decode_package, encode_document};
//! use std::fs;
//!
//! let data = fs::read("SM_Rock.uasset")?;
//! let options = DecodeOptions::default().with_package_name("/Game/Meshes/SM_Rock");
//! let decoded = decode_package(&data, &options)?;
//! for (path, export) in &decoded.value.exports {
//!     println!("{} ({})", path, export.class);
//! }
//! for diagnostic in decoded.diagnostics.iter() {
//!     eprintln!("{}", diagnostic);
//! }
//!
//! let encoded = encode_document(&decoded.value, &EncodeOptions::default())?;
//! fs::write("SM_Rock.out.uasset", encoded.bytes)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod context;
pub mod convert;
pub mod diagnostics;
pub mod error;
pub mod export;
pub mod options;
pub mod package;
pub mod property;
pub mod reader;
pub mod version;
pub mod writer;

pub use convert::{VerifyReport, decode_package, encode_document, verify_round_trip};
pub use diagnostics::{Decoded, Diagnostic, DiagnosticKind, DiagnosticLevel, Diagnostics};
pub use error::{BinaryError, Result};
pub use options::{BodySource, DecodeOptions, EncodeOptions};
pub use package::{Encoded, ImportRepairTable, PackageFile, PackageParser, PackageWriter};
pub use reader::{BinaryReader, ByteOrder};
pub use writer::BinaryWriter;

#[cfg(feature = "async")]
pub use convert::{decode_package_async, encode_document_async, verify_round_trip_async};
