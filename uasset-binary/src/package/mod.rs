//! Package container: summary, tables and the writer that lays them out

pub mod exports;
pub mod imports;
pub mod index;
pub mod names;
pub mod parser;
pub mod repair;
pub mod summary;
pub mod thumbnails;
pub mod writer;

pub use exports::{ExportEntry, SerialRangeSlot};
pub use imports::ImportEntry;
pub use index::PackageIndex;
pub use names::{NameMap, NameReference, NameTable};
pub use parser::{PackageFile, PackageParser};
pub use repair::ImportRepairTable;
pub use summary::PackageSummary;
pub use writer::{Encoded, PackageWriter};
