//! Package parser: summary and tables
//!
//! Produces a [`PackageFile`] holding the decoded tables and a borrow of the
//! input bytes. Export bodies are not touched here.

use super::exports::{EXPORT_ENTRY_SIZE, ExportEntry};
use super::imports::ImportEntry;
use super::names::NameTable;
use super::repair::ImportRepairTable;
use super::summary::PackageSummary;
use super::thumbnails::read_thumbnails;
use crate::diagnostics::{Decoded, DiagnosticKind, Diagnostics};
use crate::error::{BinaryError, Result};
use crate::reader::{BinaryReader, ByteOrder};
use crate::version::ue4;
use tracing::{debug, info};
use uasset_core::{GatherableTextStub, ImportDesc, Thumbnails};

/// A parsed package: header, tables and the bytes they index into
#[derive(Debug, Clone)]
pub struct PackageFile<'a> {
    pub summary: PackageSummary,
    pub names: NameTable,
    pub imports: Vec<ImportEntry>,
    /// Imports with names resolved and repairs applied
    pub import_descs: Vec<ImportDesc>,
    pub exports: Vec<ExportEntry>,
    pub text_data: Vec<GatherableTextStub>,
    pub thumbnails: Thumbnails,
    data: &'a [u8],
}

impl<'a> PackageFile<'a> {
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.summary.byte_order
    }

    /// Body bytes of one export, if its range lies inside the file
    pub fn export_data(&self, export: &ExportEntry) -> Option<&'a [u8]> {
        export.serial_range(self.data.len()).map(|r| &self.data[r])
    }
}

/// Package parser
pub struct PackageParser;

impl PackageParser {
    /// Parse a package with the default import repair table
    pub fn from_bytes(data: &[u8]) -> Result<Decoded<PackageFile<'_>>> {
        Self::from_bytes_with_repair(data, &ImportRepairTable::default())
    }

    pub fn from_bytes_with_repair<'a>(
        data: &'a [u8],
        repair: &ImportRepairTable,
    ) -> Result<Decoded<PackageFile<'a>>> {
        let mut diagnostics = Diagnostics::new();
        let mut reader = BinaryReader::new(data, ByteOrder::Little);

        let summary = PackageSummary::from_reader(&mut reader)?;
        let version = summary.version();
        info!(
            legacy = summary.legacy_file_version,
            ue4 = summary.file_version_ue4,
            names = summary.name_count,
            imports = summary.import_count,
            exports = summary.export_count,
            "Parsed package summary"
        );

        // Tables are addressed by absolute offset
        let names = {
            let count = table_count(summary.name_count, "name")?;
            let mut table_reader = Self::table_reader(&reader, summary.name_offset, count, 5)?;
            NameTable::from_reader(
                &mut table_reader,
                count,
                version.at_least(ue4::NAME_HASHES_SERIALIZED),
            )?
        };

        let has_extra = version.has_import_extras(summary.package_flags);
        let import_count = table_count(summary.import_count, "import")?;
        let mut imports = Vec::with_capacity(import_count);
        {
            let mut table_reader =
                Self::table_reader(&reader, summary.import_offset, import_count, 28)?;
            for _ in 0..import_count {
                imports.push(ImportEntry::from_reader(&mut table_reader, has_extra)?);
            }
        }

        let import_descs = imports
            .iter()
            .enumerate()
            .map(|(i, entry)| entry.describe(i, &names, repair, &mut diagnostics))
            .collect();

        let export_count = table_count(summary.export_count, "export")?;
        let mut exports = Vec::with_capacity(export_count);
        {
            let mut table_reader = Self::table_reader(
                &reader,
                summary.export_offset,
                export_count,
                EXPORT_ENTRY_SIZE,
            )?;
            for _ in 0..export_count {
                exports.push(ExportEntry::from_reader(&mut table_reader)?);
            }
        }

        let text_data = (0..summary.gatherable_text_data_count.max(0) as usize)
            .map(|index| GatherableTextStub { index })
            .collect();

        let thumbnails = match read_thumbnails(&reader, summary.thumbnail_table_offset) {
            Ok(thumbnails) => thumbnails,
            Err(e) => {
                diagnostics.warn(
                    DiagnosticKind::Other,
                    "Thumbnails",
                    format!("Thumbnail table unreadable, skipped: {}", e),
                );
                Thumbnails::default()
            }
        };

        debug!(
            names = names.len(),
            imports = imports.len(),
            exports = exports.len(),
            "Parsed package tables"
        );

        Ok(Decoded::new(
            PackageFile {
                summary,
                names,
                imports,
                import_descs,
                exports,
                text_data,
                thumbnails,
                data,
            },
            diagnostics,
        ))
    }

    /// Reader positioned at a table; checks the table can fit before reading
    fn table_reader<'a>(
        reader: &BinaryReader<'a>,
        offset: i32,
        count: usize,
        min_entry_size: usize,
    ) -> Result<BinaryReader<'a>> {
        if count == 0 {
            return Ok(BinaryReader::new(&[], reader.byte_order()));
        }
        let start = usize::try_from(offset)
            .map_err(|_| BinaryError::invalid_data(format!("Negative table offset: {}", offset)))?;
        if start > reader.len() {
            return Err(BinaryError::not_enough_data(start, reader.len()));
        }
        let available = reader.len() - start;
        let needed = count.saturating_mul(min_entry_size);
        if needed > available {
            return Err(BinaryError::not_enough_data(needed, available));
        }
        reader.sub_reader(start, available)
    }
}

fn table_count(count: i32, what: &str) -> Result<usize> {
    usize::try_from(count)
        .map_err(|_| BinaryError::invalid_data(format!("Negative {} count: {}", what, count)))
}
