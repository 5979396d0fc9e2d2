//! Import table entries

use super::index::PackageIndex;
use super::names::{NameReference, NameTable};
use super::repair::ImportRepairTable;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::Result;
use crate::reader::BinaryReader;
use crate::writer::BinaryWriter;
use uasset_core::ImportDesc;

/// One import as stored on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEntry {
    pub class_package: NameReference,
    pub class_name: NameReference,
    pub outer_index: PackageIndex,
    pub object_name: NameReference,
    /// Two trailing fields of newer versions, carried as-is
    pub extra: Option<[i32; 2]>,
}

impl ImportEntry {
    pub fn from_reader(reader: &mut BinaryReader, has_extra: bool) -> Result<Self> {
        let class_package = reader.read_name_ref()?;
        let class_name = reader.read_name_ref()?;
        let outer_index = PackageIndex(reader.read_i32()?);
        let object_name = reader.read_name_ref()?;
        let extra = if has_extra {
            Some([reader.read_i32()?, reader.read_i32()?])
        } else {
            None
        };

        Ok(Self {
            class_package,
            class_name,
            outer_index,
            object_name,
            extra,
        })
    }

    pub fn write_to(&self, writer: &mut BinaryWriter, has_extra: bool) -> Result<()> {
        writer.write_name_ref(self.class_package)?;
        writer.write_name_ref(self.class_name)?;
        writer.write_i32(self.outer_index.0)?;
        writer.write_name_ref(self.object_name)?;
        if has_extra {
            let [a, b] = self.extra.unwrap_or([0, 0]);
            writer.write_i32(a)?;
            writer.write_i32(b)?;
        }
        Ok(())
    }

    /// Resolve names to text and apply the repair table
    pub fn describe(
        &self,
        position: usize,
        names: &NameTable,
        repair: &ImportRepairTable,
        diagnostics: &mut Diagnostics,
    ) -> ImportDesc {
        let context = format!("Import[{}]", position);
        let class_package = names.resolve_checked(self.class_package, diagnostics, &context);
        let class_name = names.resolve_checked(self.class_name, diagnostics, &context);
        let object_name = names.resolve_checked(self.object_name, diagnostics, &context);

        let mut desc = ImportDesc {
            class_package,
            class_name,
            outer_index: self.outer_index.0,
            object_name,
        };

        if let Some(fix) = repair.repair(&desc.class_package, &desc.class_name) {
            diagnostics.warn(
                DiagnosticKind::ImportRepaired,
                &context,
                format!(
                    "Repaired {}.{} to {}.{}",
                    desc.class_package, desc.class_name, fix.class_package, fix.class_name
                ),
            );
            desc.class_package = fix.class_package;
            desc.class_name = fix.class_name;
        }

        desc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::ByteOrder;

    fn names() -> NameTable {
        NameTable::new(
            ["None", "/Script/CoreUObject", "Class", "/Script/None", "CanvasPanel"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
    }

    #[test]
    fn test_round_trip_with_extra() {
        let entry = ImportEntry {
            class_package: NameReference::new(1, 0),
            class_name: NameReference::new(2, 0),
            outer_index: PackageIndex(-2),
            object_name: NameReference::new(4, 0),
            extra: Some([7, 0]),
        };

        let mut writer = BinaryWriter::default();
        entry.write_to(&mut writer, true).unwrap();
        assert_eq!(writer.len(), 36);

        let bytes = writer.into_inner();
        let mut reader = BinaryReader::new(&bytes, ByteOrder::Little);
        assert_eq!(ImportEntry::from_reader(&mut reader, true).unwrap(), entry);
    }

    #[test]
    fn test_without_extra() {
        let mut writer = BinaryWriter::default();
        let entry = ImportEntry {
            class_package: NameReference::new(1, 0),
            class_name: NameReference::new(2, 0),
            outer_index: PackageIndex::NULL,
            object_name: NameReference::new(4, 0),
            extra: Some([1, 2]),
        };
        entry.write_to(&mut writer, false).unwrap();
        assert_eq!(writer.len(), 28);
    }

    #[test]
    fn test_describe_repairs_placeholder_package() {
        let entry = ImportEntry {
            class_package: NameReference::new(3, 0),
            class_name: NameReference::new(4, 0),
            outer_index: PackageIndex::NULL,
            object_name: NameReference::new(4, 0),
            extra: None,
        };
        let mut diags = Diagnostics::new();
        let desc = entry.describe(0, &names(), &ImportRepairTable::default(), &mut diags);
        assert_eq!(desc.class_package, "/Script/UMG");
        assert_eq!(desc.class_name, "CanvasPanel");
        assert_eq!(diags.count_of(DiagnosticKind::ImportRepaired), 1);
    }
}
