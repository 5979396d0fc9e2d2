//! Tagged property stream decoding
//!
//! A stream is a run of `(tag, value)` pairs ended by a `None` tag. Structs,
//! arrays and maps are decoded on a reader bounded to their declared size, so
//! whatever happens inside them the parent continues right after the span.
//! Scalars are read in place; a size that disagrees with the bytes read is
//! recorded and decoding continues from where the value ended.

use super::structs::read_fixed;
use super::tag::{PropertyTag, types};
use crate::context::DecodeContext;
use crate::diagnostics::DiagnosticKind;
use crate::error::{BinaryError, Result};
use crate::package::index::PackageIndex;
use crate::reader::{BinaryReader, ByteOrder};
use uasset_core::value::property_key;
use uasset_core::{Delegate, NONE_NAME, Property, PropertyMap, PropertyValue, StructValue};

/// Decode a complete stream from a byte slice
pub fn decode_properties(
    data: &[u8],
    byte_order: ByteOrder,
    ctx: &mut DecodeContext,
) -> Result<PropertyMap> {
    let mut reader = BinaryReader::new(data, byte_order);
    let mut properties = PropertyMap::new();
    decode_stream(&mut reader, ctx, 0, &mut properties)?;
    Ok(properties)
}

/// Decode properties into `out` until a `None` tag or the end of the reader
///
/// On error `out` keeps every property decoded before the failure.
pub fn decode_stream(
    reader: &mut BinaryReader,
    ctx: &mut DecodeContext,
    depth: usize,
    out: &mut PropertyMap,
) -> Result<()> {
    check_depth(depth, ctx)?;
    while reader.remaining() > 0 {
        let Some(tag) = PropertyTag::read(reader, ctx)? else {
            return Ok(());
        };
        let key = property_key(&tag.name, tag.array_index);
        let property = read_property(reader, tag, ctx, depth)?;
        if out.insert(key.clone(), property).is_some() {
            ctx.diagnostics.warn(
                DiagnosticKind::Other,
                &key,
                "Property appears twice, later value kept",
            );
        }
    }
    Ok(())
}

fn check_depth(depth: usize, ctx: &DecodeContext) -> Result<()> {
    if depth > ctx.max_depth {
        return Err(BinaryError::structural(format!(
            "Property nesting deeper than {} levels",
            ctx.max_depth
        )));
    }
    Ok(())
}

/// Read the value that follows `tag`
pub fn read_property(
    reader: &mut BinaryReader,
    mut tag: PropertyTag,
    ctx: &mut DecodeContext,
    depth: usize,
) -> Result<Property> {
    let size = tag.size as usize;
    let context = tag.name.clone();
    let type_name = tag.type_name.clone();

    let value = match type_name.as_str() {
        // Value lives in the tag
        types::BOOL => PropertyValue::Bool(tag.bool_value),
        types::STRUCT => {
            let mut span = reader.take_sub_reader(size)?;
            let struct_type = tag.struct_type.as_deref().unwrap_or(NONE_NAME);
            PropertyValue::Struct(read_struct_span(&mut span, struct_type, ctx, depth, &context))
        }
        types::ARRAY => {
            let mut span = reader.take_sub_reader(size)?;
            read_array_span(&mut span, &mut tag, ctx, depth, &context)
        }
        types::MAP => {
            let mut span = reader.take_sub_reader(size)?;
            let count = if span.has_bytes(4) { span.read_i32()? } else { 0 };
            ctx.diagnostics.info(
                DiagnosticKind::MapSkipped,
                &context,
                format!("Map payload of {} bytes not decoded", size),
            );
            PropertyValue::Map { count }
        }
        type_name => {
            let start = reader.position();
            match read_scalar(reader, type_name, tag.enum_name.as_deref(), ctx, &context)? {
                Some(value) => {
                    let consumed = (reader.position() - start) as usize;
                    if consumed != size {
                        ctx.diagnostics.warn(
                            DiagnosticKind::SizeMismatch,
                            &context,
                            format!(
                                "{} declared {} bytes but used {}",
                                type_name, size, consumed
                            ),
                        );
                    }
                    value
                }
                None => {
                    ctx.diagnostics.warn(
                        DiagnosticKind::UnknownPropertyType,
                        &context,
                        format!("No decoder for {}, kept {} raw bytes", type_name, size),
                    );
                    PropertyValue::Raw(reader.read_bytes(size)?)
                }
            }
        }
    };

    Ok(tag.into_property(value))
}

/// Decode a struct over its own span; failures keep the span verbatim
fn read_struct_span(
    span: &mut BinaryReader,
    struct_type: &str,
    ctx: &mut DecodeContext,
    depth: usize,
    context: &str,
) -> StructValue {
    let bytes = span.remaining_slice();
    match read_struct(span, struct_type, ctx, depth + 1) {
        Ok(value) if span.remaining() == 0 => value,
        Ok(value) => {
            ctx.diagnostics.warn(
                DiagnosticKind::SizeMismatch,
                context,
                format!(
                    "{} left {} of {} bytes unread",
                    struct_type,
                    span.remaining(),
                    bytes.len()
                ),
            );
            match value {
                // A fixed layout that does not fill its span is the wrong layout
                StructValue::Generic(_) => value,
                _ => StructValue::Opaque(bytes.to_vec()),
            }
        }
        Err(e) => {
            ctx.diagnostics.warn(
                DiagnosticKind::NestedDecodeFailed,
                context,
                format!("{} kept as {} opaque bytes: {}", struct_type, bytes.len(), e),
            );
            StructValue::Opaque(bytes.to_vec())
        }
    }
}

/// One struct value: a fixed layout or a nested property stream
pub fn read_struct(
    reader: &mut BinaryReader,
    struct_type: &str,
    ctx: &mut DecodeContext,
    depth: usize,
) -> Result<StructValue> {
    check_depth(depth, ctx)?;
    if let Some(value) = read_fixed(reader, struct_type)? {
        return Ok(value);
    }
    let mut properties = PropertyMap::new();
    decode_stream(reader, ctx, depth, &mut properties)?;
    Ok(StructValue::Generic(properties))
}

fn read_array_span(
    span: &mut BinaryReader,
    tag: &mut PropertyTag,
    ctx: &mut DecodeContext,
    depth: usize,
    context: &str,
) -> PropertyValue {
    let bytes = span.remaining_slice();
    match read_array(span, tag, ctx, depth + 1, context) {
        Ok(items) => {
            if span.remaining() > 0 {
                ctx.diagnostics.warn(
                    DiagnosticKind::SizeMismatch,
                    context,
                    format!(
                        "Array of {} left {} bytes unread",
                        items.len(),
                        span.remaining()
                    ),
                );
            }
            PropertyValue::Array(items)
        }
        Err(e) => {
            ctx.diagnostics.warn(
                DiagnosticKind::NestedDecodeFailed,
                context,
                format!("Array kept as {} raw bytes: {}", bytes.len(), e),
            );
            PropertyValue::Raw(bytes.to_vec())
        }
    }
}

fn read_array(
    reader: &mut BinaryReader,
    tag: &mut PropertyTag,
    ctx: &mut DecodeContext,
    depth: usize,
    context: &str,
) -> Result<Vec<PropertyValue>> {
    check_depth(depth, ctx)?;
    let count = reader.read_i32()?;
    let count = usize::try_from(count)
        .map_err(|_| BinaryError::invalid_data(format!("Negative array count {}", count)))?;
    let inner_type = tag.inner_type.clone().unwrap_or_else(|| NONE_NAME.to_string());
    let mut items = Vec::with_capacity(count.min(reader.remaining()));

    if inner_type == types::STRUCT {
        if reader.remaining() == 0 {
            return Ok(items);
        }
        // One tag describes every element
        let Some(inner) = PropertyTag::read(reader, ctx)? else {
            return Ok(items);
        };
        tag.struct_type = inner.struct_type.clone();
        tag.struct_guid = inner.struct_guid;
        let struct_type = inner.struct_type.as_deref().unwrap_or(NONE_NAME);

        let mut elements = reader.take_sub_reader(inner.size as usize)?;
        for i in 0..count {
            if elements.remaining() == 0 {
                ctx.diagnostics.warn(
                    DiagnosticKind::SizeMismatch,
                    context,
                    format!(
                        "Struct elements ran out after {} of {} elements",
                        i, count
                    ),
                );
                break;
            }
            items.push(PropertyValue::Struct(read_struct(
                &mut elements,
                struct_type,
                ctx,
                depth,
            )?));
        }
        if elements.remaining() > 0 {
            ctx.diagnostics.warn(
                DiagnosticKind::SizeMismatch,
                context,
                format!("Struct elements left {} bytes unread", elements.remaining()),
            );
        }
        return Ok(items);
    }

    for i in 0..count {
        match read_element(reader, &inner_type, ctx, context)? {
            Some(value) => items.push(value),
            None => {
                ctx.diagnostics.warn(
                    DiagnosticKind::UnknownElementType,
                    context,
                    format!(
                        "No decoder for element type {}, stopped after {} of {} elements",
                        inner_type, i, count
                    ),
                );
                break;
            }
        }
    }
    Ok(items)
}

/// One array element; `None` for element types with no decoder
fn read_element(
    reader: &mut BinaryReader,
    inner_type: &str,
    ctx: &mut DecodeContext,
    context: &str,
) -> Result<Option<PropertyValue>> {
    Ok(Some(match inner_type {
        types::BOOL => PropertyValue::Bool(reader.read_bool()?),
        types::BYTE => PropertyValue::UInt8(reader.read_u8()?),
        types::ENUM => {
            let name = reader.read_name_ref()?;
            PropertyValue::Name(ctx.name(name, context))
        }
        _ => return read_scalar(reader, inner_type, None, ctx, context),
    }))
}

/// Decode a value that does not need a bounded span
pub fn read_scalar(
    reader: &mut BinaryReader,
    type_name: &str,
    enum_name: Option<&str>,
    ctx: &mut DecodeContext,
    context: &str,
) -> Result<Option<PropertyValue>> {
    let value = match type_name {
        types::BYTE => match enum_name {
            Some(name) if name != NONE_NAME => {
                let value = reader.read_name_ref()?;
                PropertyValue::Name(ctx.name(value, context))
            }
            _ => PropertyValue::UInt8(reader.read_u8()?),
        },
        types::ENUM | types::NAME => {
            let value = reader.read_name_ref()?;
            PropertyValue::Name(ctx.name(value, context))
        }
        types::INT8 => PropertyValue::Int8(reader.read_i8()?),
        types::INT16 => PropertyValue::Int16(reader.read_i16()?),
        types::INT => PropertyValue::Int32(reader.read_i32()?),
        types::INT64 => PropertyValue::Int64(reader.read_i64()?),
        types::UINT16 => PropertyValue::UInt16(reader.read_u16()?),
        types::UINT32 => PropertyValue::UInt32(reader.read_u32()?),
        types::UINT64 => PropertyValue::UInt64(reader.read_u64()?),
        types::FLOAT => PropertyValue::Float(reader.read_f32()?),
        types::DOUBLE => PropertyValue::Double(reader.read_f64()?),
        types::STR => PropertyValue::Str(reader.read_fstring()?),
        types::OBJECT | types::CLASS | types::INTERFACE | types::WEAK_OBJECT => {
            let index = PackageIndex(reader.read_i32()?);
            PropertyValue::Object(ctx.object(index, context))
        }
        types::SOFT_OBJECT | types::SOFT_CLASS => {
            let asset = reader.read_name_ref()?;
            let asset_path = ctx.name(asset, context);
            let sub_path = reader.read_fstring()?;
            PropertyValue::SoftObject {
                asset_path,
                sub_path,
            }
        }
        types::DELEGATE => PropertyValue::Delegate(read_delegate(reader, ctx, context)?),
        types::MULTICAST_DELEGATE
        | types::MULTICAST_INLINE_DELEGATE
        | types::MULTICAST_SPARSE_DELEGATE => {
            let count = reader.read_i32()?;
            let count = usize::try_from(count).map_err(|_| {
                BinaryError::invalid_data(format!("Negative delegate count {}", count))
            })?;
            let mut bindings = Vec::with_capacity(count.min(reader.remaining() / 12));
            for _ in 0..count {
                bindings.push(read_delegate(reader, ctx, context)?);
            }
            PropertyValue::MulticastDelegate(bindings)
        }
        _ => return Ok(None),
    };
    Ok(Some(value))
}

fn read_delegate(
    reader: &mut BinaryReader,
    ctx: &mut DecodeContext,
    context: &str,
) -> Result<Delegate> {
    let object = PackageIndex(reader.read_i32()?);
    let object = ctx.object(object, context);
    let function = reader.read_name_ref()?;
    Ok(Delegate {
        object,
        function: ctx.name(function, context),
    })
}
