//! Two-pass package writer
//!
//! Bodies are encoded first so the name map and import table are complete
//! before any table is written. The file is then laid out front to back with
//! a zeroed region for the summary; serial ranges and the summary itself are
//! patched in once every offset is known.

use super::exports::ExportEntry;
use super::index::PackageIndex;
use super::summary::{Generation, PackageSummary};
use super::thumbnails::{position_i32, write_thumbnails};
use crate::context::WriteContext;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::{BinaryError, Result};
use crate::export::path::object_name_from_path;
use crate::options::{BodySource, EncodeOptions};
use crate::property::encode::{encode_to_vec, register_names};
use crate::reader::ByteOrder;
use crate::version::{PACKAGE_FILE_TAG, ue4};
use crate::writer::BinaryWriter;
use tracing::{debug, info};
use uasset_core::constants::BOOTSTRAP_NAMES;
use uasset_core::raw::digest;
use uasset_core::{Document, ExportDesc, NONE_NAME, PropertyMap, RawData};

/// Bytes of a written package plus what was noticed while writing it
#[derive(Debug, Clone)]
pub struct Encoded {
    pub bytes: Vec<u8>,
    pub diagnostics: Diagnostics,
}

enum BodyCandidate<'a> {
    Raw(&'a RawData),
    Properties(&'a PropertyMap),
}

/// Package writer
pub struct PackageWriter;

impl PackageWriter {
    pub fn write(doc: &Document, options: &EncodeOptions) -> Result<Encoded> {
        let mut summary = PackageSummary::from_info(&doc.summary)?;
        let version = summary.version();
        let byte_order = summary.byte_order;
        let mut ctx = WriteContext::new(options.max_depth);

        info!(
            exports = doc.exports.len(),
            imports = doc.imports.len(),
            names = doc.names.len(),
            "Writing package"
        );

        // Preserved names keep their indices so raw bodies stay valid
        ctx.seed_names(doc.names.iter().map(String::as_str));
        ctx.seed_names(BOOTSTRAP_NAMES.iter().copied());
        ctx.seed_imports(&doc.imports);
        for path in doc.exports.keys() {
            ctx.names.register(object_name_from_path(path));
        }
        ctx.register_exports(doc.exports.keys().map(String::as_str));
        for export in doc.exports.values() {
            if let Some(properties) = &export.value.properties {
                register_names(properties, &mut ctx.names);
            }
        }

        let entries: Vec<ExportEntry> = doc
            .exports
            .iter()
            .map(|(path, export)| export_entry(path, export, &mut ctx))
            .collect();

        let mut bodies = Vec::with_capacity(doc.exports.len());
        for (path, export) in &doc.exports {
            let body = encode_body(path, export, options, byte_order, &mut ctx)?;
            debug!(export = %path, bytes = body.len(), "Encoded export body");
            bodies.push(body);
        }

        let imports = ctx.import_entries();
        let has_hashes = version.at_least(ue4::NAME_HASHES_SERIALIZED);
        let has_extra = version.has_import_extras(summary.package_flags);

        let body_len: usize = bodies.iter().map(Vec::len).sum();
        let mut writer = BinaryWriter::with_capacity(options.header_reserve + body_len, byte_order);
        writer.write_zeros(options.header_reserve)?;

        summary.name_count = ctx.names.len() as i32;
        summary.name_offset = position_i32(&writer)?;
        ctx.names.write_to(&mut writer, has_hashes)?;

        summary.import_count = imports.len() as i32;
        summary.import_offset = position_i32(&writer)?;
        for import in &imports {
            import.write_to(&mut writer, has_extra)?;
        }

        summary.export_count = entries.len() as i32;
        summary.export_offset = position_i32(&writer)?;
        let mut slots = Vec::with_capacity(entries.len());
        for entry in &entries {
            slots.push(entry.write_to(&mut writer)?);
        }

        // One empty dependency list per export
        summary.depends_offset = position_i32(&writer)?;
        for _ in &entries {
            writer.write_i32(0)?;
        }

        if version.at_least(ue4::ADD_STRING_ASSET_REFERENCES_MAP) {
            summary.soft_package_references_count = 0;
            summary.soft_package_references_offset = position_i32(&writer)?;
        }

        summary.thumbnail_table_offset =
            write_thumbnails(&mut writer, &doc.thumbnails, &mut ctx.diagnostics)?;

        summary.asset_registry_data_offset = position_i32(&writer)?;
        writer.write_i32(0)?;

        if version.at_least(ue4::PRELOAD_DEPENDENCIES_IN_COOKED_EXPORTS) {
            summary.preload_dependency_count = 0;
            summary.preload_dependency_offset = position_i32(&writer)?;
        }

        summary.total_header_size = position_i32(&writer)?;
        for (slot, body) in slots.iter().zip(&bodies) {
            let offset = writer.position() as i64;
            writer.write_bytes(body)?;
            writer.patch_i64(slot.size_pos, body.len() as i64)?;
            writer.patch_i64(slot.offset_pos, offset)?;
        }

        summary.bulk_data_start_offset = writer.position() as i64;
        writer.write_u32(PACKAGE_FILE_TAG)?;

        summary.generations = vec![Generation {
            export_count: summary.export_count,
            name_count: summary.name_count,
        }];
        summary.gatherable_text_data_count = 0;
        summary.gatherable_text_data_offset = 0;
        if !doc.text_data.is_empty() {
            ctx.diagnostics.info(
                DiagnosticKind::Other,
                "TextData",
                format!("{} gatherable text entries not written", doc.text_data.len()),
            );
        }

        let mut header = BinaryWriter::new(byte_order);
        summary.write_to(&mut header)?;
        if header.len() > options.header_reserve {
            return Err(BinaryError::structural(format!(
                "Summary needs {} bytes but only {} are reserved",
                header.len(),
                options.header_reserve
            )));
        }
        writer.patch_at(0, header.as_slice())?;

        info!(
            bytes = writer.len(),
            names = summary.name_count,
            imports = summary.import_count,
            warnings = ctx.diagnostics.warning_count(),
            "Wrote package"
        );

        Ok(Encoded {
            bytes: writer.into_inner(),
            diagnostics: ctx.diagnostics,
        })
    }
}

fn export_entry(path: &str, export: &ExportDesc, ctx: &mut WriteContext) -> ExportEntry {
    ExportEntry {
        class_index: ctx.export_class_ref(&export.class, export.class_import.as_deref(), path),
        super_index: optional_ref(ctx, &export.super_struct, path),
        template_index: optional_ref(ctx, &export.template, path),
        outer_index: optional_ref(ctx, &export.outer, path),
        object_name: ctx.name(object_name_from_path(path)),
        object_flags: export.object_flags,
        forced_export: export.forced_export,
        not_for_client: export.not_for_client,
        not_for_server: export.not_for_server,
        is_asset: export.is_asset,
        first_export_dependency: -1,
        ..Default::default()
    }
}

fn optional_ref(ctx: &mut WriteContext, target: &Option<String>, context: &str) -> PackageIndex {
    match target {
        Some(target) => ctx.object_ref(target, context),
        None => PackageIndex::NULL,
    }
}

/// Bytes for one export body, taken from the first usable source
fn encode_body(
    path: &str,
    export: &ExportDesc,
    options: &EncodeOptions,
    byte_order: ByteOrder,
    ctx: &mut WriteContext,
) -> Result<Vec<u8>> {
    let value_raw = export.value.raw_data.as_ref().map(BodyCandidate::Raw);
    let legacy_raw = export.raw_data.as_ref().map(BodyCandidate::Raw);
    let properties = export
        .value
        .properties
        .as_ref()
        .map(BodyCandidate::Properties);

    let order = match options.body_source {
        BodySource::RawFirst => [value_raw, legacy_raw, properties],
        BodySource::PropertiesFirst => [properties, value_raw, legacy_raw],
    };

    for candidate in order.into_iter().flatten() {
        match candidate {
            BodyCandidate::Raw(raw) => match raw.to_bytes() {
                Ok(bytes) => {
                    if options.verify_digests && !digest(&bytes).eq_ignore_ascii_case(&raw.hash) {
                        ctx.diagnostics.warn(
                            DiagnosticKind::DigestMismatch,
                            path,
                            "Raw data does not match its digest, written anyway",
                        );
                    }
                    return Ok(bytes);
                }
                Err(e) => ctx.diagnostics.warn(
                    DiagnosticKind::MissingBody,
                    path,
                    format!("Raw data unreadable: {}", e),
                ),
            },
            BodyCandidate::Properties(map) => match encode_to_vec(map, ctx, byte_order) {
                Ok(bytes) => return Ok(bytes),
                Err(e) if e.is_recoverable() => ctx.diagnostics.warn(
                    DiagnosticKind::MissingBody,
                    path,
                    format!("Properties could not be encoded: {}", e),
                ),
                Err(e) => return Err(e),
            },
        }
    }

    ctx.diagnostics.warn(
        DiagnosticKind::MissingBody,
        path,
        "No raw data or properties, wrote an empty property stream",
    );
    let mut writer = BinaryWriter::new(byte_order);
    let terminator = ctx.name(NONE_NAME);
    writer.write_name_ref(terminator)?;
    Ok(writer.into_inner())
}
