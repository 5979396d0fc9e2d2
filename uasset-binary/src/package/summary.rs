//! Package summary (file header)
//!
//! The summary is read front to back with many fields present only from a
//! given object version on. Writing uses the same gates, so a summary read
//! from a file writes back with the same shape.

use crate::error::{BinaryError, Result};
use crate::reader::{BinaryReader, ByteOrder};
use crate::version::{
    EngineVersion, ObjectVersion, PACKAGE_FILE_TAG, PACKAGE_FILE_TAG_SWAPPED,
    is_supported_legacy_version, ue4,
};
use crate::writer::BinaryWriter;
use uasset_core::{CustomVersion, Guid, PackageInfo};

/// One generation entry (export and name counts at a past save)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Generation {
    pub export_count: i32,
    pub name_count: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSummary {
    pub byte_order: ByteOrder,
    pub legacy_file_version: i32,
    pub legacy_ue3_version: i32,
    pub file_version_ue4: i32,
    pub file_version_ue5: Option<i32>,
    pub file_version_licensee: i32,
    pub custom_versions: Vec<CustomVersion>,
    pub total_header_size: i32,
    pub folder_name: String,
    pub package_flags: u32,
    pub name_count: i32,
    pub name_offset: i32,
    pub localization_id: Option<String>,
    pub gatherable_text_data_count: i32,
    pub gatherable_text_data_offset: i32,
    pub export_count: i32,
    pub export_offset: i32,
    pub import_count: i32,
    pub import_offset: i32,
    pub depends_offset: i32,
    pub soft_package_references_count: i32,
    pub soft_package_references_offset: i32,
    pub searchable_names_offset: i32,
    pub thumbnail_table_offset: i32,
    pub guid: Guid,
    pub persistent_guid: Option<Guid>,
    pub owner_persistent_guid: Option<Guid>,
    pub generations: Vec<Generation>,
    pub saved_by_engine_version: EngineVersion,
    pub compatible_engine_version: EngineVersion,
    pub compression_flags: u32,
    pub package_source: u32,
    pub asset_registry_data_offset: i32,
    pub bulk_data_start_offset: i64,
    pub world_tile_info_data_offset: i32,
    pub chunk_id: i32,
    pub preload_dependency_count: i32,
    pub preload_dependency_offset: i32,
}

impl Default for PackageSummary {
    fn default() -> Self {
        Self {
            byte_order: ByteOrder::Little,
            legacy_file_version: -7,
            legacy_ue3_version: 864,
            file_version_ue4: 522,
            file_version_ue5: None,
            file_version_licensee: 0,
            custom_versions: Vec::new(),
            total_header_size: 0,
            folder_name: "None".to_string(),
            package_flags: 0,
            name_count: 0,
            name_offset: 0,
            localization_id: None,
            gatherable_text_data_count: 0,
            gatherable_text_data_offset: 0,
            export_count: 0,
            export_offset: 0,
            import_count: 0,
            import_offset: 0,
            depends_offset: 0,
            soft_package_references_count: 0,
            soft_package_references_offset: 0,
            searchable_names_offset: 0,
            thumbnail_table_offset: 0,
            guid: Guid::ZERO,
            persistent_guid: None,
            owner_persistent_guid: None,
            generations: Vec::new(),
            saved_by_engine_version: EngineVersion::default(),
            compatible_engine_version: EngineVersion::default(),
            compression_flags: 0,
            package_source: 0,
            asset_registry_data_offset: 0,
            bulk_data_start_offset: 0,
            world_tile_info_data_offset: 0,
            chunk_id: 0,
            preload_dependency_count: 0,
            preload_dependency_offset: 0,
        }
    }
}

impl PackageSummary {
    pub fn version(&self) -> ObjectVersion {
        ObjectVersion::new(
            self.legacy_file_version,
            self.file_version_ue4,
            self.file_version_ue5,
        )
    }

    /// Parse the summary, switching the reader's byte order if the file is foreign-endian
    pub fn from_reader(reader: &mut BinaryReader) -> Result<Self> {
        let tag = reader.read_u32()?;
        if tag == PACKAGE_FILE_TAG_SWAPPED {
            reader.set_byte_order(reader.byte_order().swapped());
        } else if tag != PACKAGE_FILE_TAG {
            return Err(BinaryError::invalid_signature(
                format!("0x{:08X}", PACKAGE_FILE_TAG),
                format!("0x{:08X}", tag),
            ));
        }

        let mut summary = PackageSummary {
            byte_order: reader.byte_order(),
            ..Default::default()
        };

        summary.legacy_file_version = reader.read_i32()?;
        if !is_supported_legacy_version(summary.legacy_file_version) {
            return Err(BinaryError::unsupported_version(format!(
                "legacy file version {}",
                summary.legacy_file_version
            )));
        }

        summary.legacy_ue3_version = reader.read_i32()?;
        summary.file_version_ue4 = reader.read_i32()?;
        let early = summary.version();
        if early.has_ue5_version() {
            summary.file_version_ue5 = Some(reader.read_i32()?);
        }
        summary.file_version_licensee = reader.read_i32()?;

        let custom_count = read_count(reader, 20, "custom versions")?;
        for _ in 0..custom_count {
            let key = reader.read_guid()?;
            let version = reader.read_i32()?;
            summary.custom_versions.push(CustomVersion { key, version });
        }

        let v = summary.version();

        summary.total_header_size = reader.read_i32()?;
        summary.folder_name = reader.read_fstring()?;
        summary.package_flags = reader.read_u32()?;
        summary.name_count = reader.read_i32()?;
        summary.name_offset = reader.read_i32()?;

        if v.at_least(ue4::ADDED_PACKAGE_SUMMARY_LOCALIZATION_ID) {
            // An empty id is what a package without one stores
            let id = reader.read_fstring()?;
            summary.localization_id = (!id.is_empty()).then_some(id);
        }
        if v.at_least(ue4::SERIALIZE_TEXT_IN_PACKAGES) {
            summary.gatherable_text_data_count = reader.read_i32()?;
            summary.gatherable_text_data_offset = reader.read_i32()?;
        }

        summary.export_count = reader.read_i32()?;
        summary.export_offset = reader.read_i32()?;
        summary.import_count = reader.read_i32()?;
        summary.import_offset = reader.read_i32()?;
        summary.depends_offset = reader.read_i32()?;

        if v.at_least(ue4::ADD_STRING_ASSET_REFERENCES_MAP) {
            summary.soft_package_references_count = reader.read_i32()?;
            summary.soft_package_references_offset = reader.read_i32()?;
        }
        if v.at_least(ue4::ADDED_SEARCHABLE_NAMES) {
            summary.searchable_names_offset = reader.read_i32()?;
        }
        summary.thumbnail_table_offset = reader.read_i32()?;
        summary.guid = reader.read_guid()?;

        if v.at_least(ue4::ADDED_PACKAGE_OWNER) {
            summary.persistent_guid = Some(reader.read_guid()?);
        }
        if v.has_owner_persistent_guid() {
            summary.owner_persistent_guid = Some(reader.read_guid()?);
        }

        let generation_count = read_count(reader, 8, "generations")?;
        for _ in 0..generation_count {
            summary.generations.push(Generation {
                export_count: reader.read_i32()?,
                name_count: reader.read_i32()?,
            });
        }

        if v.at_least(ue4::ENGINE_VERSION_OBJECT) {
            summary.saved_by_engine_version = read_engine_version(reader)?;
        } else {
            summary.saved_by_engine_version = EngineVersion::from_changelist(reader.read_i32()?);
        }
        if v.at_least(ue4::PACKAGE_SUMMARY_HAS_COMPATIBLE_ENGINE_VERSION) {
            summary.compatible_engine_version = read_engine_version(reader)?;
        } else {
            summary.compatible_engine_version = summary.saved_by_engine_version.clone();
        }

        summary.compression_flags = reader.read_u32()?;
        let compressed_chunks = reader.read_i32()?;
        if compressed_chunks != 0 {
            return Err(BinaryError::unsupported(format!(
                "compressed package ({} chunks)",
                compressed_chunks
            )));
        }

        summary.package_source = reader.read_u32()?;

        let additional_packages = reader.read_i32()?;
        if additional_packages != 0 {
            return Err(BinaryError::unsupported(format!(
                "{} additional packages to cook",
                additional_packages
            )));
        }

        if v.has_texture_allocations() {
            let texture_allocations = reader.read_i32()?;
            if texture_allocations != 0 {
                return Err(BinaryError::unsupported(format!(
                    "{} texture allocations",
                    texture_allocations
                )));
            }
        }

        summary.asset_registry_data_offset = reader.read_i32()?;
        summary.bulk_data_start_offset = reader.read_i64()?;

        if v.at_least(ue4::WORLD_LEVEL_INFO) {
            summary.world_tile_info_data_offset = reader.read_i32()?;
        }

        if v.at_least(ue4::CHANGED_CHUNKID_TO_BE_AN_ARRAY_OF_CHUNKIDS) {
            let chunk_count = reader.read_i32()?;
            if chunk_count != 0 {
                return Err(BinaryError::unsupported(format!(
                    "chunked package ({} chunk ids)",
                    chunk_count
                )));
            }
        } else if v.has_single_chunk_id() {
            summary.chunk_id = reader.read_i32()?;
        }

        if v.at_least(ue4::PRELOAD_DEPENDENCIES_IN_COOKED_EXPORTS) {
            summary.preload_dependency_count = reader.read_i32()?;
            summary.preload_dependency_offset = reader.read_i32()?;
        }

        Ok(summary)
    }

    /// Write the summary using the writer's byte order
    pub fn write_to(&self, writer: &mut BinaryWriter) -> Result<()> {
        let v = self.version();

        writer.write_u32(PACKAGE_FILE_TAG)?;
        writer.write_i32(self.legacy_file_version)?;
        writer.write_i32(self.legacy_ue3_version)?;
        writer.write_i32(self.file_version_ue4)?;
        if v.has_ue5_version() {
            writer.write_i32(self.file_version_ue5.unwrap_or(0))?;
        }
        writer.write_i32(self.file_version_licensee)?;

        writer.write_i32(self.custom_versions.len() as i32)?;
        for custom in &self.custom_versions {
            writer.write_guid(&custom.key)?;
            writer.write_i32(custom.version)?;
        }

        writer.write_i32(self.total_header_size)?;
        writer.write_fstring(&self.folder_name)?;
        writer.write_u32(self.package_flags)?;
        writer.write_i32(self.name_count)?;
        writer.write_i32(self.name_offset)?;

        if v.at_least(ue4::ADDED_PACKAGE_SUMMARY_LOCALIZATION_ID) {
            writer.write_fstring(self.localization_id.as_deref().unwrap_or(""))?;
        }
        if v.at_least(ue4::SERIALIZE_TEXT_IN_PACKAGES) {
            writer.write_i32(self.gatherable_text_data_count)?;
            writer.write_i32(self.gatherable_text_data_offset)?;
        }

        writer.write_i32(self.export_count)?;
        writer.write_i32(self.export_offset)?;
        writer.write_i32(self.import_count)?;
        writer.write_i32(self.import_offset)?;
        writer.write_i32(self.depends_offset)?;

        if v.at_least(ue4::ADD_STRING_ASSET_REFERENCES_MAP) {
            writer.write_i32(self.soft_package_references_count)?;
            writer.write_i32(self.soft_package_references_offset)?;
        }
        if v.at_least(ue4::ADDED_SEARCHABLE_NAMES) {
            writer.write_i32(self.searchable_names_offset)?;
        }
        writer.write_i32(self.thumbnail_table_offset)?;
        writer.write_guid(&self.guid)?;

        if v.at_least(ue4::ADDED_PACKAGE_OWNER) {
            writer.write_guid(&self.persistent_guid.unwrap_or(Guid::ZERO))?;
        }
        if v.has_owner_persistent_guid() {
            writer.write_guid(&self.owner_persistent_guid.unwrap_or(Guid::ZERO))?;
        }

        writer.write_i32(self.generations.len() as i32)?;
        for generation in &self.generations {
            writer.write_i32(generation.export_count)?;
            writer.write_i32(generation.name_count)?;
        }

        if v.at_least(ue4::ENGINE_VERSION_OBJECT) {
            write_engine_version(writer, &self.saved_by_engine_version)?;
        } else {
            writer.write_i32(self.saved_by_engine_version.changelist as i32)?;
        }
        if v.at_least(ue4::PACKAGE_SUMMARY_HAS_COMPATIBLE_ENGINE_VERSION) {
            write_engine_version(writer, &self.compatible_engine_version)?;
        }

        writer.write_u32(self.compression_flags)?;
        writer.write_i32(0)?; // compressed chunks
        writer.write_u32(self.package_source)?;
        writer.write_i32(0)?; // additional packages to cook
        if v.has_texture_allocations() {
            writer.write_i32(0)?;
        }

        writer.write_i32(self.asset_registry_data_offset)?;
        writer.write_i64(self.bulk_data_start_offset)?;

        if v.at_least(ue4::WORLD_LEVEL_INFO) {
            writer.write_i32(self.world_tile_info_data_offset)?;
        }
        if v.at_least(ue4::CHANGED_CHUNKID_TO_BE_AN_ARRAY_OF_CHUNKIDS) {
            writer.write_i32(0)?;
        } else if v.has_single_chunk_id() {
            writer.write_i32(self.chunk_id)?;
        }
        if v.at_least(ue4::PRELOAD_DEPENDENCIES_IN_COOKED_EXPORTS) {
            writer.write_i32(self.preload_dependency_count)?;
            writer.write_i32(self.preload_dependency_offset)?;
        }

        Ok(())
    }

    /// Document view of the version and identity fields
    pub fn to_info(&self) -> PackageInfo {
        PackageInfo {
            legacy_file_version: self.legacy_file_version,
            legacy_ue3_version: self.legacy_ue3_version,
            file_version_ue4: self.file_version_ue4,
            file_version_ue5: self.file_version_ue5,
            file_version_licensee: self.file_version_licensee,
            custom_versions: self.custom_versions.clone(),
            folder_name: self.folder_name.clone(),
            package_flags: self.package_flags,
            localization_id: self.localization_id.clone(),
            guid: self.guid,
            persistent_guid: self.persistent_guid,
            saved_by_engine_version: self.saved_by_engine_version.to_string(),
            compatible_engine_version: self.compatible_engine_version.to_string(),
            package_source: self.package_source,
            big_endian: self.byte_order == ByteOrder::Big,
        }
    }

    /// Summary skeleton for writing a document; offsets and counts are filled in later
    pub fn from_info(info: &PackageInfo) -> Result<Self> {
        if !is_supported_legacy_version(info.legacy_file_version) {
            return Err(BinaryError::unsupported_version(format!(
                "legacy file version {}",
                info.legacy_file_version
            )));
        }

        let saved_by_engine_version = EngineVersion::parse_version(&info.saved_by_engine_version)?;
        let compatible_engine_version =
            EngineVersion::parse_version(&info.compatible_engine_version)?;

        Ok(Self {
            byte_order: if info.big_endian {
                ByteOrder::Big
            } else {
                ByteOrder::Little
            },
            legacy_file_version: info.legacy_file_version,
            legacy_ue3_version: info.legacy_ue3_version,
            file_version_ue4: info.file_version_ue4,
            file_version_ue5: info.file_version_ue5,
            file_version_licensee: info.file_version_licensee,
            custom_versions: info.custom_versions.clone(),
            folder_name: info.folder_name.clone(),
            package_flags: info.package_flags,
            localization_id: info.localization_id.clone(),
            guid: info.guid,
            persistent_guid: info.persistent_guid,
            saved_by_engine_version,
            compatible_engine_version,
            package_source: info.package_source,
            ..Default::default()
        })
    }
}

/// Read an element count, rejecting values the remaining data cannot hold
fn read_count(reader: &mut BinaryReader, element_size: usize, what: &str) -> Result<usize> {
    let count = reader.read_i32()?;
    let count = usize::try_from(count)
        .map_err(|_| BinaryError::invalid_data(format!("Negative {} count: {}", what, count)))?;
    let needed = count.saturating_mul(element_size);
    if needed > reader.remaining() {
        return Err(BinaryError::not_enough_data(needed, reader.remaining()));
    }
    Ok(count)
}

fn read_engine_version(reader: &mut BinaryReader) -> Result<EngineVersion> {
    let major = reader.read_u16()?;
    let minor = reader.read_u16()?;
    let patch = reader.read_u16()?;
    let changelist = reader.read_u32()?;
    let branch = reader.read_fstring()?;
    Ok(EngineVersion::new(major, minor, patch, changelist, branch))
}

fn write_engine_version(writer: &mut BinaryWriter, version: &EngineVersion) -> Result<()> {
    writer.write_u16(version.major)?;
    writer.write_u16(version.minor)?;
    writer.write_u16(version.patch)?;
    writer.write_u32(version.changelist)?;
    writer.write_fstring(&version.branch)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(summary: &PackageSummary) -> PackageSummary {
        let mut writer = BinaryWriter::new(summary.byte_order);
        summary.write_to(&mut writer).unwrap();
        let bytes = writer.into_inner();
        let mut reader = BinaryReader::new(&bytes, ByteOrder::Little);
        let back = PackageSummary::from_reader(&mut reader).unwrap();
        assert_eq!(reader.remaining(), 0);
        back
    }

    fn sample() -> PackageSummary {
        PackageSummary {
            folder_name: "None".to_string(),
            name_count: 12,
            name_offset: 4096,
            localization_id: Some("6F3B2C".to_string()),
            export_count: 2,
            export_offset: 5000,
            persistent_guid: Some(Guid::ZERO),
            generations: vec![Generation {
                export_count: 2,
                name_count: 12,
            }],
            saved_by_engine_version: EngineVersion::new(4, 27, 2, 0, "++UE4+Release-4.27"),
            compatible_engine_version: EngineVersion::new(4, 27, 0, 0, "++UE4+Release-4.27"),
            bulk_data_start_offset: 9000,
            ..Default::default()
        }
    }

    #[test]
    fn test_round_trip_ue4() {
        let summary = sample();
        assert_eq!(round_trip(&summary), summary);
    }

    #[test]
    fn test_round_trip_ue5_big_endian() {
        let summary = PackageSummary {
            byte_order: ByteOrder::Big,
            legacy_file_version: -8,
            file_version_ue5: Some(1004),
            ..sample()
        };
        assert_eq!(round_trip(&summary), summary);
    }

    #[test]
    fn test_missing_localization_id_stays_missing() {
        let summary = PackageSummary {
            localization_id: None,
            ..sample()
        };
        assert!(summary.file_version_ue4 >= ue4::ADDED_PACKAGE_SUMMARY_LOCALIZATION_ID);
        let back = round_trip(&summary);
        assert_eq!(back.localization_id, None);
        assert_eq!(back, summary);
    }

    #[test]
    fn test_old_version_gates() {
        let summary = PackageSummary {
            legacy_file_version: -6,
            file_version_ue4: 300,
            localization_id: None,
            persistent_guid: None,
            chunk_id: 3,
            saved_by_engine_version: EngineVersion::from_changelist(42),
            compatible_engine_version: EngineVersion::from_changelist(42),
            ..sample()
        };
        let back = round_trip(&summary);
        assert_eq!(back.chunk_id, 3);
        assert_eq!(back.saved_by_engine_version.to_string(), "4.0.0-42+");
        assert_eq!(back.compatible_engine_version, back.saved_by_engine_version);
    }

    #[test]
    fn test_bad_magic() {
        let bytes = [0u8; 64];
        let mut reader = BinaryReader::new(&bytes, ByteOrder::Little);
        let err = PackageSummary::from_reader(&mut reader).unwrap_err();
        assert!(matches!(err, BinaryError::InvalidSignature { .. }));
    }

    #[test]
    fn test_unsupported_legacy_version() {
        let mut writer = BinaryWriter::default();
        writer.write_u32(PACKAGE_FILE_TAG).unwrap();
        writer.write_i32(-4).unwrap();
        let bytes = writer.into_inner();
        let mut reader = BinaryReader::new(&bytes, ByteOrder::Little);
        let err = PackageSummary::from_reader(&mut reader).unwrap_err();
        assert!(matches!(err, BinaryError::UnsupportedVersion(_)));
    }

    #[test]
    fn test_info_conversion() {
        let summary = sample();
        let info = summary.to_info();
        assert_eq!(info.saved_by_engine_version, "4.27.2-0+++UE4+Release-4.27");
        let back = PackageSummary::from_info(&info).unwrap();
        assert_eq!(back.saved_by_engine_version, summary.saved_by_engine_version);
        assert_eq!(back.localization_id, summary.localization_id);
    }
}
