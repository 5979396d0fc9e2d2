//! The three host operations: decode, encode and round-trip verification

use crate::context::DecodeContext;
use crate::diagnostics::{Decoded, Diagnostics};
use crate::error::Result;
use crate::export::body::decode_export_body;
use crate::export::class::{class_import_path, resolve_class};
use crate::export::path::{ObjectResolver, build_export_paths, build_import_paths};
use crate::options::{DecodeOptions, EncodeOptions};
use crate::package::index::PackageIndex;
use crate::package::parser::PackageParser;
use crate::package::writer::{Encoded, PackageWriter};
use indexmap::IndexMap;
use tracing::{debug, info};
use uasset_core::{Document, ExportDesc};

/// Decode a package into a document
pub fn decode_package(bytes: &[u8], options: &DecodeOptions) -> Result<Decoded<Document>> {
    let (file, diagnostics) = PackageParser::from_bytes(bytes)?.into_parts();
    let mut diagnostics = diagnostics;

    let export_names: Vec<String> = file
        .exports
        .iter()
        .map(|export| file.names.resolve(export.object_name))
        .collect();
    let export_paths = build_export_paths(
        &options.package_name,
        &file.exports,
        &file.names,
        &mut diagnostics,
    );
    let resolver = ObjectResolver::new(export_paths, build_import_paths(&file.import_descs));

    let mut ctx = DecodeContext::new(&file.names, &resolver, options.max_depth);
    ctx.diagnostics = diagnostics;

    let mut exports = IndexMap::with_capacity(file.exports.len());
    for (entry, path) in file.exports.iter().zip(resolver.export_paths()) {
        let class = resolve_class(
            entry.class_index,
            &file.import_descs,
            &export_names,
            &mut ctx.diagnostics,
            path,
        );
        let class_import = class_import_path(entry.class_index, &file.import_descs, &class);
        let super_struct = optional_object(&mut ctx, entry.super_index, path);
        let template = optional_object(&mut ctx, entry.template_index, path);
        let outer = optional_object(&mut ctx, entry.outer_index, path);

        let value = decode_export_body(
            file.export_data(entry),
            file.byte_order(),
            &mut ctx,
            options,
            &class,
            path,
        );
        debug!(export = %path, class = %class, "Decoded export");

        exports.insert(
            path.clone(),
            ExportDesc {
                class,
                class_import,
                super_struct,
                template,
                object_flags: entry.object_flags,
                outer,
                forced_export: entry.forced_export,
                not_for_client: entry.not_for_client,
                not_for_server: entry.not_for_server,
                is_asset: entry.is_asset,
                raw_data: None,
                value,
            },
        );
    }

    let diagnostics = ctx.diagnostics;
    let document = Document {
        summary: file.summary.to_info(),
        names: file.names.names().to_vec(),
        imports: file.import_descs.clone(),
        text_data: file.text_data.clone(),
        thumbnails: file.thumbnails.clone(),
        exports,
    };

    info!(
        package = %options.package_name,
        exports = document.exports.len(),
        warnings = diagnostics.warning_count(),
        "Decoded package"
    );
    Ok(Decoded::new(document, diagnostics))
}

fn optional_object(ctx: &mut DecodeContext, index: PackageIndex, context: &str) -> Option<String> {
    (!index.is_null()).then(|| ctx.object(index, context))
}

/// Encode a document into package bytes
pub fn encode_document(document: &Document, options: &EncodeOptions) -> Result<Encoded> {
    PackageWriter::write(document, options)
}

/// Outcome of decoding a package and encoding it again
#[derive(Debug, Clone)]
pub struct VerifyReport {
    pub original_len: usize,
    pub encoded_len: usize,
    /// `encoded_len - original_len`
    pub delta: i64,
    pub exports_before: usize,
    pub exports_after: usize,
    /// Findings from all three passes, in order
    pub diagnostics: Diagnostics,
}

impl VerifyReport {
    /// Same length and same export count
    pub fn is_clean(&self) -> bool {
        self.delta == 0 && self.exports_before == self.exports_after
    }
}

/// Decode, encode, then decode the result again and compare the two
pub fn verify_round_trip(
    bytes: &[u8],
    decode_options: &DecodeOptions,
    encode_options: &EncodeOptions,
) -> Result<VerifyReport> {
    let (document, mut diagnostics) = decode_package(bytes, decode_options)?.into_parts();
    let encoded = encode_document(&document, encode_options)?;
    diagnostics.extend(encoded.diagnostics);

    let (again, redecode) = decode_package(&encoded.bytes, decode_options)?.into_parts();
    diagnostics.extend(redecode);

    let report = VerifyReport {
        original_len: bytes.len(),
        encoded_len: encoded.bytes.len(),
        delta: encoded.bytes.len() as i64 - bytes.len() as i64,
        exports_before: document.exports.len(),
        exports_after: again.exports.len(),
        diagnostics,
    };
    info!(
        original = report.original_len,
        encoded = report.encoded_len,
        delta = report.delta,
        "Verified round trip"
    );
    Ok(report)
}

#[cfg(feature = "async")]
mod non_blocking {
    use super::*;
    use crate::error::BinaryError;
    use tokio::task;

    /// [`decode_package`] on a blocking task
    pub async fn decode_package_async(
        bytes: Vec<u8>,
        options: DecodeOptions,
    ) -> Result<Decoded<Document>> {
        task::spawn_blocking(move || decode_package(&bytes, &options))
            .await
            .map_err(|e| BinaryError::generic(format!("Task join error: {}", e)))?
    }

    /// [`encode_document`] on a blocking task
    pub async fn encode_document_async(
        document: Document,
        options: EncodeOptions,
    ) -> Result<Encoded> {
        task::spawn_blocking(move || encode_document(&document, &options))
            .await
            .map_err(|e| BinaryError::generic(format!("Task join error: {}", e)))?
    }

    /// [`verify_round_trip`] on a blocking task
    pub async fn verify_round_trip_async(
        bytes: Vec<u8>,
        decode_options: DecodeOptions,
        encode_options: EncodeOptions,
    ) -> Result<VerifyReport> {
        task::spawn_blocking(move || verify_round_trip(&bytes, &decode_options, &encode_options))
            .await
            .map_err(|e| BinaryError::generic(format!("Task join error: {}", e)))?
    }
}

#[cfg(feature = "async")]
pub use non_blocking::{decode_package_async, encode_document_async, verify_round_trip_async};
