//! Thumbnail table
//!
//! The table is a count followed by (class, path, blob offset) entries; each
//! blob is width, height and a length-prefixed image payload.

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::{BinaryError, Result};
use crate::reader::BinaryReader;
use crate::writer::BinaryWriter;
use std::collections::HashMap;
use uasset_core::{ThumbnailBlob, ThumbnailIndexEntry, Thumbnails};

/// Read the table at `table_offset`; a zero offset means no thumbnails
pub fn read_thumbnails(data_reader: &BinaryReader, table_offset: i32) -> Result<Thumbnails> {
    let mut thumbnails = Thumbnails::default();
    if table_offset <= 0 {
        return Ok(thumbnails);
    }

    let offset = table_offset as usize;
    if offset > data_reader.len() {
        return Err(BinaryError::not_enough_data(offset, data_reader.len()));
    }
    let mut reader = data_reader.sub_reader(offset, data_reader.len() - offset)?;

    let count = reader.read_i32()?;
    if count < 0 {
        return Err(BinaryError::invalid_data(format!(
            "Negative thumbnail count: {}",
            count
        )));
    }

    let mut blob_by_offset: HashMap<i32, usize> = HashMap::new();
    for _ in 0..count {
        let object_class_name = reader.read_fstring()?;
        let object_path_without_package_name = reader.read_fstring()?;
        let file_offset = reader.read_i32()?;

        let blob = match blob_by_offset.get(&file_offset) {
            Some(&blob) => blob,
            None => {
                thumbnails
                    .thumbnails
                    .push(read_blob(data_reader, file_offset)?);
                let blob = thumbnails.thumbnails.len() - 1;
                blob_by_offset.insert(file_offset, blob);
                blob
            }
        };

        thumbnails.index.push(ThumbnailIndexEntry {
            object_class_name,
            object_path_without_package_name,
            blob,
        });
    }

    Ok(thumbnails)
}

fn read_blob(data_reader: &BinaryReader, file_offset: i32) -> Result<ThumbnailBlob> {
    let offset = usize::try_from(file_offset).map_err(|_| {
        BinaryError::invalid_data(format!("Negative thumbnail offset: {}", file_offset))
    })?;
    if offset > data_reader.len() {
        return Err(BinaryError::not_enough_data(offset, data_reader.len()));
    }
    let mut reader = data_reader.sub_reader(offset, data_reader.len() - offset)?;

    let width = reader.read_i32()?;
    let height = reader.read_i32()?;
    let size = reader.read_i32()?;
    let size = usize::try_from(size)
        .map_err(|_| BinaryError::invalid_data(format!("Negative thumbnail size: {}", size)))?;
    let image = reader.read_bytes(size)?;

    Ok(ThumbnailBlob {
        width,
        height,
        image,
    })
}

/// Write blobs then the table; returns the table offset, or 0 when empty
pub fn write_thumbnails(
    writer: &mut BinaryWriter,
    thumbnails: &Thumbnails,
    diagnostics: &mut Diagnostics,
) -> Result<i32> {
    if thumbnails.is_empty() {
        return Ok(0);
    }

    let mut blob_offsets = Vec::with_capacity(thumbnails.thumbnails.len());
    for blob in &thumbnails.thumbnails {
        blob_offsets.push(position_i32(writer)?);
        writer.write_i32(blob.width)?;
        writer.write_i32(blob.height)?;
        writer.write_i32(blob.image.len() as i32)?;
        writer.write_bytes(&blob.image)?;
    }

    let entries: Vec<(&ThumbnailIndexEntry, i32)> = thumbnails
        .index
        .iter()
        .filter_map(|entry| match blob_offsets.get(entry.blob) {
            Some(&offset) => Some((entry, offset)),
            None => {
                diagnostics.warn(
                    DiagnosticKind::IndexOutOfRange,
                    "Thumbnails",
                    format!(
                        "Entry {} points at missing blob {}",
                        entry.object_path_without_package_name, entry.blob
                    ),
                );
                None
            }
        })
        .collect();

    let table_offset = position_i32(writer)?;
    writer.write_i32(entries.len() as i32)?;
    for (entry, offset) in entries {
        writer.write_fstring(&entry.object_class_name)?;
        writer.write_fstring(&entry.object_path_without_package_name)?;
        writer.write_i32(offset)?;
    }

    Ok(table_offset)
}

pub(crate) fn position_i32(writer: &BinaryWriter) -> Result<i32> {
    i32::try_from(writer.position())
        .map_err(|_| BinaryError::structural("Package larger than 2 GiB"))
}
