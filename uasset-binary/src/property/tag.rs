//! Property tags
//!
//! Every property in a stream starts with a tag: name, type, declared value
//! size and array index, then metadata that depends on the type, then an
//! optional property GUID. A tag whose name is `None` ends the stream.

use super::structs::struct_name_of;
use crate::context::{DecodeContext, WriteContext};
use crate::error::{BinaryError, Result};
use crate::reader::BinaryReader;
use crate::writer::BinaryWriter;
use uasset_core::{Guid, NONE_NAME, Property, PropertyValue};

pub mod types {
    pub const BOOL: &str = "BoolProperty";
    pub const BYTE: &str = "ByteProperty";
    pub const ENUM: &str = "EnumProperty";
    pub const INT8: &str = "Int8Property";
    pub const INT16: &str = "Int16Property";
    pub const INT: &str = "IntProperty";
    pub const INT64: &str = "Int64Property";
    pub const UINT16: &str = "UInt16Property";
    pub const UINT32: &str = "UInt32Property";
    pub const UINT64: &str = "UInt64Property";
    pub const FLOAT: &str = "FloatProperty";
    pub const DOUBLE: &str = "DoubleProperty";
    pub const NAME: &str = "NameProperty";
    pub const STR: &str = "StrProperty";
    pub const OBJECT: &str = "ObjectProperty";
    pub const CLASS: &str = "ClassProperty";
    pub const INTERFACE: &str = "InterfaceProperty";
    pub const WEAK_OBJECT: &str = "WeakObjectProperty";
    pub const SOFT_OBJECT: &str = "SoftObjectProperty";
    pub const SOFT_CLASS: &str = "SoftClassProperty";
    pub const DELEGATE: &str = "DelegateProperty";
    pub const MULTICAST_DELEGATE: &str = "MulticastDelegateProperty";
    pub const MULTICAST_INLINE_DELEGATE: &str = "MulticastInlineDelegateProperty";
    pub const MULTICAST_SPARSE_DELEGATE: &str = "MulticastSparseDelegateProperty";
    pub const STRUCT: &str = "StructProperty";
    pub const ARRAY: &str = "ArrayProperty";
    pub const SET: &str = "SetProperty";
    pub const MAP: &str = "MapProperty";
}

/// Type name a value is normally stored under
pub fn type_name_of(value: &PropertyValue) -> &'static str {
    match value {
        PropertyValue::Bool(_) => types::BOOL,
        PropertyValue::Int8(_) => types::INT8,
        PropertyValue::Int16(_) => types::INT16,
        PropertyValue::Int32(_) => types::INT,
        PropertyValue::Int64(_) => types::INT64,
        PropertyValue::UInt8(_) => types::BYTE,
        PropertyValue::UInt16(_) => types::UINT16,
        PropertyValue::UInt32(_) => types::UINT32,
        PropertyValue::UInt64(_) => types::UINT64,
        PropertyValue::Float(_) => types::FLOAT,
        PropertyValue::Double(_) => types::DOUBLE,
        PropertyValue::Str(_) => types::STR,
        PropertyValue::Name(_) => types::NAME,
        PropertyValue::Object(_) => types::OBJECT,
        PropertyValue::SoftObject { .. } => types::SOFT_OBJECT,
        PropertyValue::Delegate(_) => types::DELEGATE,
        PropertyValue::MulticastDelegate(_) => types::MULTICAST_DELEGATE,
        PropertyValue::Struct(_) => types::STRUCT,
        PropertyValue::Array(_) => types::ARRAY,
        PropertyValue::Map { .. } => types::MAP,
        PropertyValue::Raw(_) => types::BYTE,
    }
}

/// A property header with every name already resolved to text
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PropertyTag {
    pub name: String,
    pub type_name: String,
    pub size: i32,
    pub array_index: i32,
    pub struct_type: Option<String>,
    pub struct_guid: Option<Guid>,
    pub bool_value: bool,
    pub enum_name: Option<String>,
    pub inner_type: Option<String>,
    pub value_type: Option<String>,
    pub property_guid: Option<Guid>,
}

impl PropertyTag {
    /// Read the next tag, or `None` at the end of the stream
    pub fn read(reader: &mut BinaryReader, ctx: &mut DecodeContext) -> Result<Option<Self>> {
        let name_ref = reader.read_name_ref()?;
        if ctx.names.is_none(name_ref) {
            return Ok(None);
        }
        let name = ctx.name(name_ref, "PropertyTag");
        let type_ref = reader.read_name_ref()?;
        let type_name = ctx.name(type_ref, &name);
        let size = reader.read_i32()?;
        let array_index = reader.read_i32()?;

        let mut tag = PropertyTag {
            name,
            type_name,
            size,
            array_index,
            ..Default::default()
        };

        match tag.type_name.as_str() {
            types::STRUCT => {
                let struct_ref = reader.read_name_ref()?;
                tag.struct_type = Some(ctx.name(struct_ref, &tag.name));
                let guid = reader.read_guid()?;
                tag.struct_guid = (!guid.is_zero()).then_some(guid);
            }
            types::BOOL => tag.bool_value = reader.read_bool()?,
            types::BYTE | types::ENUM => {
                let enum_ref = reader.read_name_ref()?;
                tag.enum_name = Some(ctx.name(enum_ref, &tag.name));
            }
            types::ARRAY | types::SET => {
                let inner_ref = reader.read_name_ref()?;
                tag.inner_type = Some(ctx.name(inner_ref, &tag.name));
            }
            types::MAP => {
                let key_ref = reader.read_name_ref()?;
                tag.inner_type = Some(ctx.name(key_ref, &tag.name));
                let value_ref = reader.read_name_ref()?;
                tag.value_type = Some(ctx.name(value_ref, &tag.name));
            }
            _ => {}
        }

        if reader.read_bool()? {
            tag.property_guid = Some(reader.read_guid()?);
        }

        if tag.size < 0 {
            return Err(BinaryError::invalid_data(format!(
                "Property {} declares negative size {}",
                tag.name, tag.size
            )));
        }

        Ok(Some(tag))
    }

    /// Tag for a document property; size is filled in after the value is written
    pub fn from_property(name: &str, property: &Property) -> Self {
        let struct_type = property.struct_type.clone().or_else(|| match &property.value {
            PropertyValue::Struct(value) => struct_name_of(value).map(str::to_string),
            _ => None,
        });
        let inner_type = property.inner_type.clone().or_else(|| match &property.value {
            PropertyValue::Array(items) => items.first().map(|v| type_name_of(v).to_string()),
            _ => None,
        });

        PropertyTag {
            name: name.to_string(),
            type_name: property.type_name.clone(),
            size: 0,
            array_index: property.array_index,
            struct_type,
            struct_guid: property.struct_guid,
            bool_value: property.value.as_bool().unwrap_or(false),
            enum_name: property.enum_name.clone(),
            inner_type,
            value_type: property.value_type.clone(),
            property_guid: property.property_guid,
        }
    }

    /// Build the document entry for this tag
    pub fn into_property(self, value: PropertyValue) -> Property {
        Property {
            type_name: self.type_name,
            array_index: self.array_index,
            struct_type: self.struct_type,
            struct_guid: self.struct_guid,
            enum_name: self.enum_name,
            inner_type: self.inner_type,
            value_type: self.value_type,
            property_guid: self.property_guid,
            value,
        }
    }

    /// Write the tag; returns the position of the size field for backpatching
    pub fn write(&self, writer: &mut BinaryWriter, ctx: &mut WriteContext) -> Result<u64> {
        writer.write_name_ref(ctx.name(&self.name))?;
        writer.write_name_ref(ctx.name(&self.type_name))?;
        let size_pos = writer.position();
        writer.write_i32(self.size)?;
        writer.write_i32(self.array_index)?;

        let or_none = |value: &Option<String>| value.clone().unwrap_or_else(|| NONE_NAME.to_string());
        match self.type_name.as_str() {
            types::STRUCT => {
                writer.write_name_ref(ctx.name(&or_none(&self.struct_type)))?;
                writer.write_guid(&self.struct_guid.unwrap_or(Guid::ZERO))?;
            }
            types::BOOL => writer.write_bool(self.bool_value)?,
            types::BYTE | types::ENUM => {
                writer.write_name_ref(ctx.name(&or_none(&self.enum_name)))?;
            }
            types::ARRAY | types::SET => {
                writer.write_name_ref(ctx.name(&or_none(&self.inner_type)))?;
            }
            types::MAP => {
                writer.write_name_ref(ctx.name(&or_none(&self.inner_type)))?;
                writer.write_name_ref(ctx.name(&or_none(&self.value_type)))?;
            }
            _ => {}
        }

        match &self.property_guid {
            Some(guid) => {
                writer.write_bool(true)?;
                writer.write_guid(guid)?;
            }
            None => writer.write_bool(false)?,
        }

        Ok(size_pos)
    }

    /// Names this tag will write
    pub fn names(&self) -> Vec<&str> {
        let mut names = vec![self.name.as_str(), self.type_name.as_str()];
        match self.type_name.as_str() {
            types::STRUCT => names.push(self.struct_type.as_deref().unwrap_or(NONE_NAME)),
            types::BYTE | types::ENUM => names.push(self.enum_name.as_deref().unwrap_or(NONE_NAME)),
            types::ARRAY | types::SET => names.push(self.inner_type.as_deref().unwrap_or(NONE_NAME)),
            types::MAP => {
                names.push(self.inner_type.as_deref().unwrap_or(NONE_NAME));
                names.push(self.value_type.as_deref().unwrap_or(NONE_NAME));
            }
            _ => {}
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::path::ObjectResolver;
    use crate::package::names::NameTable;
    use crate::reader::ByteOrder;

    fn write_tag(tag: &PropertyTag) -> (Vec<u8>, Vec<String>) {
        let mut ctx = WriteContext::new(8);
        ctx.seed_names([NONE_NAME]);
        let mut writer = BinaryWriter::default();
        tag.write(&mut writer, &mut ctx).unwrap();
        (writer.into_inner(), ctx.names.iter().map(str::to_string).collect())
    }

    fn read_tag(bytes: &[u8], names: Vec<String>) -> (Option<PropertyTag>, u64) {
        let table = NameTable::new(names);
        let objects = ObjectResolver::default();
        let mut ctx = DecodeContext::new(&table, &objects, 8);
        let mut reader = BinaryReader::new(bytes, ByteOrder::Little);
        let tag = PropertyTag::read(&mut reader, &mut ctx).unwrap();
        (tag, reader.position())
    }

    #[test]
    fn test_bool_tag_is_26_bytes() {
        let tag = PropertyTag {
            name: "bIsEnabled".into(),
            type_name: types::BOOL.into(),
            bool_value: true,
            ..Default::default()
        };
        let (bytes, names) = write_tag(&tag);
        assert_eq!(bytes.len(), 26);

        let (back, consumed) = read_tag(&bytes, names);
        assert_eq!(consumed, 26);
        let back = back.unwrap();
        assert!(back.bool_value);
        assert_eq!(back.size, 0);
        assert_eq!(back, tag);
    }

    #[test]
    fn test_struct_tag_metadata() {
        let guid = Guid::new([7; 16]);
        let tag = PropertyTag {
            name: "Padding".into(),
            type_name: types::STRUCT.into(),
            size: 16,
            struct_type: Some("Margin".into()),
            property_guid: Some(guid),
            ..Default::default()
        };
        let (bytes, names) = write_tag(&tag);
        // 24 fixed + 8 struct name + 16 struct guid + 1 flag + 16 guid
        assert_eq!(bytes.len(), 65);

        let (back, _) = read_tag(&bytes, names);
        let back = back.unwrap();
        assert_eq!(back.struct_type.as_deref(), Some("Margin"));
        assert_eq!(back.struct_guid, None);
        assert_eq!(back.property_guid, Some(guid));
        assert_eq!(back.size, 16);
    }

    #[test]
    fn test_map_tag_carries_key_and_value_types() {
        let tag = PropertyTag {
            name: "Lookup".into(),
            type_name: types::MAP.into(),
            size: 8,
            inner_type: Some(types::NAME.into()),
            value_type: Some(types::INT.into()),
            ..Default::default()
        };
        let (bytes, names) = write_tag(&tag);
        let (back, consumed) = read_tag(&bytes, names);
        assert_eq!(consumed, 41);
        assert_eq!(back.unwrap(), tag);
    }

    #[test]
    fn test_none_terminates() {
        let mut writer = BinaryWriter::default();
        writer.write_i32(0).unwrap();
        writer.write_i32(0).unwrap();
        let (tag, consumed) = read_tag(&writer.into_inner(), vec![NONE_NAME.to_string()]);
        assert!(tag.is_none());
        assert_eq!(consumed, 8);
    }

    #[test]
    fn test_from_property_infers_types() {
        let property = Property::new(
            types::ARRAY,
            PropertyValue::Array(vec![PropertyValue::Float(1.0)]),
        );
        let tag = PropertyTag::from_property("Weights", &property);
        assert_eq!(tag.inner_type.as_deref(), Some(types::FLOAT));

        let property = Property::new(types::BOOL, PropertyValue::Bool(true));
        assert!(PropertyTag::from_property("bFlag", &property).bool_value);
    }
}
