//! Export table entries

use super::index::PackageIndex;
use super::names::NameReference;
use crate::error::Result;
use crate::reader::BinaryReader;
use crate::writer::BinaryWriter;
use uasset_core::Guid;

/// Bytes occupied by one export entry on disk
pub const EXPORT_ENTRY_SIZE: usize = 108;

/// Offset of the serial size field within an entry
const SERIAL_SIZE_FIELD: u64 = 28;

/// One export as stored on disk
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExportEntry {
    pub class_index: PackageIndex,
    pub super_index: PackageIndex,
    pub template_index: PackageIndex,
    pub outer_index: PackageIndex,
    pub object_name: NameReference,
    pub object_flags: u32,
    pub serial_size: i64,
    pub serial_offset: i64,
    pub forced_export: bool,
    pub not_for_client: bool,
    pub not_for_server: bool,
    pub is_inherited_instance: bool,
    pub package_guid: Guid,
    pub package_flags: u32,
    pub not_always_loaded_for_editor_game: bool,
    pub is_asset: bool,
    pub first_export_dependency: i32,
    pub serialization_before_serialization_dependencies: i32,
    pub create_before_serialization_dependencies: i32,
    pub serialization_before_create_dependencies: i32,
    pub create_before_create_dependencies: i32,
}

/// Position of an entry's serial range, for patching after the body is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialRangeSlot {
    pub size_pos: u64,
    pub offset_pos: u64,
}

impl ExportEntry {
    pub fn from_reader(reader: &mut BinaryReader) -> Result<Self> {
        Ok(Self {
            class_index: PackageIndex(reader.read_i32()?),
            super_index: PackageIndex(reader.read_i32()?),
            template_index: PackageIndex(reader.read_i32()?),
            outer_index: PackageIndex(reader.read_i32()?),
            object_name: reader.read_name_ref()?,
            object_flags: reader.read_u32()?,
            serial_size: reader.read_i64()?,
            serial_offset: reader.read_i64()?,
            forced_export: reader.read_bool32()?,
            not_for_client: reader.read_bool32()?,
            not_for_server: reader.read_bool32()?,
            is_inherited_instance: reader.read_bool32()?,
            package_guid: reader.read_guid()?,
            package_flags: reader.read_u32()?,
            not_always_loaded_for_editor_game: reader.read_bool32()?,
            is_asset: reader.read_bool32()?,
            first_export_dependency: reader.read_i32()?,
            serialization_before_serialization_dependencies: reader.read_i32()?,
            create_before_serialization_dependencies: reader.read_i32()?,
            serialization_before_create_dependencies: reader.read_i32()?,
            create_before_create_dependencies: reader.read_i32()?,
        })
    }

    /// Write the entry and return where its serial range lives
    pub fn write_to(&self, writer: &mut BinaryWriter) -> Result<SerialRangeSlot> {
        let start = writer.position();
        writer.write_i32(self.class_index.0)?;
        writer.write_i32(self.super_index.0)?;
        writer.write_i32(self.template_index.0)?;
        writer.write_i32(self.outer_index.0)?;
        writer.write_name_ref(self.object_name)?;
        writer.write_u32(self.object_flags)?;
        writer.write_i64(self.serial_size)?;
        writer.write_i64(self.serial_offset)?;
        writer.write_bool32(self.forced_export)?;
        writer.write_bool32(self.not_for_client)?;
        writer.write_bool32(self.not_for_server)?;
        writer.write_bool32(self.is_inherited_instance)?;
        writer.write_guid(&self.package_guid)?;
        writer.write_u32(self.package_flags)?;
        writer.write_bool32(self.not_always_loaded_for_editor_game)?;
        writer.write_bool32(self.is_asset)?;
        writer.write_i32(self.first_export_dependency)?;
        writer.write_i32(self.serialization_before_serialization_dependencies)?;
        writer.write_i32(self.create_before_serialization_dependencies)?;
        writer.write_i32(self.serialization_before_create_dependencies)?;
        writer.write_i32(self.create_before_create_dependencies)?;

        Ok(SerialRangeSlot {
            size_pos: start + SERIAL_SIZE_FIELD,
            offset_pos: start + SERIAL_SIZE_FIELD + 8,
        })
    }

    /// Byte range of the export body, if it has one inside `len` bytes
    pub fn serial_range(&self, len: usize) -> Option<std::ops::Range<usize>> {
        let start = usize::try_from(self.serial_offset).ok()?;
        let size = usize::try_from(self.serial_size).ok()?;
        let end = start.checked_add(size)?;
        (end <= len).then_some(start..end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::ByteOrder;

    fn sample() -> ExportEntry {
        ExportEntry {
            class_index: PackageIndex(-3),
            outer_index: PackageIndex(1),
            object_name: NameReference::new(5, 2),
            object_flags: 0x0000_0008,
            serial_size: 120,
            serial_offset: 4096,
            not_for_server: true,
            is_asset: true,
            first_export_dependency: -1,
            ..Default::default()
        }
    }

    #[test]
    fn test_entry_size_and_round_trip() {
        let entry = sample();
        let mut writer = BinaryWriter::default();
        entry.write_to(&mut writer).unwrap();
        assert_eq!(writer.len(), EXPORT_ENTRY_SIZE);

        let bytes = writer.into_inner();
        let mut reader = BinaryReader::new(&bytes, ByteOrder::Little);
        assert_eq!(ExportEntry::from_reader(&mut reader).unwrap(), entry);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_serial_slot_patching() {
        let mut writer = BinaryWriter::default();
        writer.write_zeros(10).unwrap();
        let slot = ExportEntry::default().write_to(&mut writer).unwrap();
        writer.patch_i64(slot.size_pos, 77).unwrap();
        writer.patch_i64(slot.offset_pos, 9000).unwrap();

        let bytes = writer.into_inner();
        let mut reader = BinaryReader::new(&bytes, ByteOrder::Little);
        reader.skip(10).unwrap();
        let entry = ExportEntry::from_reader(&mut reader).unwrap();
        assert_eq!(entry.serial_size, 77);
        assert_eq!(entry.serial_offset, 9000);
    }

    #[test]
    fn test_serial_range_bounds() {
        let entry = sample();
        assert_eq!(entry.serial_range(5000), Some(4096..4216));
        assert_eq!(entry.serial_range(4100), None);

        let negative = ExportEntry {
            serial_size: -1,
            ..Default::default()
        };
        assert_eq!(negative.serial_range(100), None);
    }
}
