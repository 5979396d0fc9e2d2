//! Tagged property stream encoding
//!
//! Each tag is written with a zero size, the value follows, and the size is
//! patched once the value's length is known.

use super::structs::{struct_name_of, write_fixed};
use super::tag::{PropertyTag, types};
use crate::context::WriteContext;
use crate::error::{BinaryError, Result};
use crate::package::names::NameMap;
use crate::reader::ByteOrder;
use crate::writer::BinaryWriter;
use uasset_core::value::property_name_from_key;
use uasset_core::{Delegate, NONE_NAME, Property, PropertyMap, PropertyValue, StructValue};

/// Write every property followed by the `None` terminator
pub fn encode_properties(
    writer: &mut BinaryWriter,
    properties: &PropertyMap,
    ctx: &mut WriteContext,
    depth: usize,
) -> Result<()> {
    if depth > ctx.max_depth {
        return Err(BinaryError::structural(format!(
            "Property nesting deeper than {} levels",
            ctx.max_depth
        )));
    }
    for (key, property) in properties {
        write_property(writer, property_name_from_key(key), property, ctx, depth)?;
    }
    let terminator = ctx.name(NONE_NAME);
    writer.write_name_ref(terminator)
}

/// Encode a stream into a fresh buffer
pub fn encode_to_vec(
    properties: &PropertyMap,
    ctx: &mut WriteContext,
    byte_order: ByteOrder,
) -> Result<Vec<u8>> {
    let mut writer = BinaryWriter::new(byte_order);
    encode_properties(&mut writer, properties, ctx, 0)?;
    Ok(writer.into_inner())
}

pub fn write_property(
    writer: &mut BinaryWriter,
    name: &str,
    property: &Property,
    ctx: &mut WriteContext,
    depth: usize,
) -> Result<()> {
    let tag = PropertyTag::from_property(name, property);
    let size_pos = tag.write(writer, ctx)?;
    if tag.type_name == types::BOOL {
        return Ok(());
    }
    let start = writer.position();
    write_value(writer, &tag, &property.value, ctx, depth)?;
    patch_size(writer, size_pos, start)
}

fn patch_size(writer: &mut BinaryWriter, size_pos: u64, start: u64) -> Result<()> {
    let size = i32::try_from(writer.position() - start)
        .map_err(|_| BinaryError::structural("Property value larger than 2 GiB"))?;
    writer.patch_i32(size_pos, size)
}

fn write_value(
    writer: &mut BinaryWriter,
    tag: &PropertyTag,
    value: &PropertyValue,
    ctx: &mut WriteContext,
    depth: usize,
) -> Result<()> {
    match value {
        PropertyValue::Bool(v) => writer.write_bool(*v),
        PropertyValue::Int8(v) => writer.write_i8(*v),
        PropertyValue::Int16(v) => writer.write_i16(*v),
        PropertyValue::Int32(v) => writer.write_i32(*v),
        PropertyValue::Int64(v) => writer.write_i64(*v),
        PropertyValue::UInt8(v) => writer.write_u8(*v),
        PropertyValue::UInt16(v) => writer.write_u16(*v),
        PropertyValue::UInt32(v) => writer.write_u32(*v),
        PropertyValue::UInt64(v) => writer.write_u64(*v),
        PropertyValue::Float(v) => writer.write_f32(*v),
        PropertyValue::Double(v) => writer.write_f64(*v),
        PropertyValue::Str(s) => writer.write_fstring(s),
        PropertyValue::Name(s) => {
            let name = ctx.name(s);
            writer.write_name_ref(name)
        }
        PropertyValue::Object(path) => {
            let index = ctx.object_ref(path, &tag.name);
            writer.write_i32(index.0)
        }
        PropertyValue::SoftObject {
            asset_path,
            sub_path,
        } => {
            let name = ctx.name(asset_path);
            writer.write_name_ref(name)?;
            writer.write_fstring(sub_path)
        }
        PropertyValue::Delegate(delegate) => write_delegate(writer, tag, delegate, ctx),
        PropertyValue::MulticastDelegate(bindings) => {
            writer.write_i32(bindings.len() as i32)?;
            for delegate in bindings {
                write_delegate(writer, tag, delegate, ctx)?;
            }
            Ok(())
        }
        PropertyValue::Struct(value) => write_struct(writer, value, ctx, depth + 1),
        PropertyValue::Array(items) => write_array(writer, tag, items, ctx, depth + 1),
        PropertyValue::Map { .. } => {
            // Keys to remove, then entries; both empty
            writer.write_i32(0)?;
            writer.write_i32(0)
        }
        PropertyValue::Raw(bytes) => writer.write_bytes(bytes),
    }
}

fn write_delegate(
    writer: &mut BinaryWriter,
    tag: &PropertyTag,
    delegate: &Delegate,
    ctx: &mut WriteContext,
) -> Result<()> {
    let object = ctx.object_ref(&delegate.object, &tag.name);
    writer.write_i32(object.0)?;
    let function = ctx.name(&delegate.function);
    writer.write_name_ref(function)
}

fn write_struct(
    writer: &mut BinaryWriter,
    value: &StructValue,
    ctx: &mut WriteContext,
    depth: usize,
) -> Result<()> {
    if write_fixed(writer, value)? {
        return Ok(());
    }
    match value {
        StructValue::Generic(properties) => encode_properties(writer, properties, ctx, depth),
        StructValue::Opaque(bytes) => writer.write_bytes(bytes),
        _ => Ok(()),
    }
}

/// Inner tag shared by every element of a struct array
fn struct_element_tag(tag: &PropertyTag, items: &[PropertyValue]) -> PropertyTag {
    let struct_type = tag
        .struct_type
        .clone()
        .or_else(|| {
            items.iter().find_map(|item| match item {
                PropertyValue::Struct(value) => struct_name_of(value).map(str::to_string),
                _ => None,
            })
        })
        .unwrap_or_else(|| NONE_NAME.to_string());
    PropertyTag {
        name: tag.name.clone(),
        type_name: types::STRUCT.to_string(),
        struct_type: Some(struct_type),
        struct_guid: tag.struct_guid,
        ..Default::default()
    }
}

fn write_array(
    writer: &mut BinaryWriter,
    tag: &PropertyTag,
    items: &[PropertyValue],
    ctx: &mut WriteContext,
    depth: usize,
) -> Result<()> {
    if depth > ctx.max_depth {
        return Err(BinaryError::structural(format!(
            "Property nesting deeper than {} levels",
            ctx.max_depth
        )));
    }
    writer.write_i32(items.len() as i32)?;

    if tag.inner_type.as_deref() != Some(types::STRUCT) {
        for item in items {
            write_value(writer, tag, item, ctx, depth)?;
        }
        return Ok(());
    }

    let inner = struct_element_tag(tag, items);
    let size_pos = inner.write(writer, ctx)?;
    let start = writer.position();
    for item in items {
        match item {
            PropertyValue::Struct(value) => write_struct(writer, value, ctx, depth)?,
            other => write_value(writer, &inner, other, ctx, depth)?,
        }
    }
    patch_size(writer, size_pos, start)
}

/// Add every name a stream will use, in traversal order
pub fn register_names(properties: &PropertyMap, names: &mut NameMap) {
    for (key, property) in properties {
        let tag = PropertyTag::from_property(property_name_from_key(key), property);
        for name in tag.names() {
            names.register(name);
        }
        register_value_names(&tag, &property.value, names);
    }
    names.register(NONE_NAME);
}

fn register_value_names(tag: &PropertyTag, value: &PropertyValue, names: &mut NameMap) {
    match value {
        PropertyValue::Name(s) => names.register(s),
        PropertyValue::SoftObject { asset_path, .. } => names.register(asset_path),
        PropertyValue::Delegate(delegate) => names.register(&delegate.function),
        PropertyValue::MulticastDelegate(bindings) => {
            for delegate in bindings {
                names.register(&delegate.function);
            }
        }
        PropertyValue::Struct(StructValue::Generic(properties)) => {
            register_names(properties, names)
        }
        PropertyValue::Array(items) => {
            if tag.inner_type.as_deref() == Some(types::STRUCT) {
                for name in struct_element_tag(tag, items).names() {
                    names.register(name);
                }
            }
            for item in items {
                register_value_names(tag, item, names);
            }
        }
        _ => {}
    }
}
