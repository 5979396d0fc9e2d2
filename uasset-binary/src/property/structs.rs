//! Fixed-layout struct values
//!
//! These structs are stored field by field with no nested tags. Every float
//! field is 32-bit; `Color` is stored as B, G, R, A bytes.

use crate::error::Result;
use crate::reader::BinaryReader;
use crate::writer::BinaryWriter;
use uasset_core::StructValue;
use uasset_core::math::{
    Color, GuidValue, IntPoint, IntVector, LinearColor, Margin, Quat, Rotator, Transform, Vector,
    Vector2D, Vector4,
};

/// Struct names with a fixed binary layout
pub const FIXED_STRUCTS: &[&str] = &[
    "Vector",
    "Vector2D",
    "Vector4",
    "IntPoint",
    "IntVector",
    "Rotator",
    "Quat",
    "Color",
    "LinearColor",
    "Transform",
    "Guid",
    "DateTime",
    "Timespan",
    "Margin",
];

pub fn is_fixed_struct(name: &str) -> bool {
    FIXED_STRUCTS.contains(&name)
}

/// Struct name a value is stored under, when the value implies one
pub fn struct_name_of(value: &StructValue) -> Option<&'static str> {
    Some(match value {
        StructValue::Vector(_) => "Vector",
        StructValue::Vector2D(_) => "Vector2D",
        StructValue::Vector4(_) => "Vector4",
        StructValue::IntPoint(_) => "IntPoint",
        StructValue::IntVector(_) => "IntVector",
        StructValue::Rotator(_) => "Rotator",
        StructValue::Quat(_) => "Quat",
        StructValue::Color(_) => "Color",
        StructValue::LinearColor(_) => "LinearColor",
        StructValue::Transform(_) => "Transform",
        StructValue::Guid(_) => "Guid",
        StructValue::DateTime(_) => "DateTime",
        StructValue::Timespan(_) => "Timespan",
        StructValue::Margin(_) => "Margin",
        StructValue::Generic(_) | StructValue::Opaque(_) => return None,
    })
}

fn read_vector(reader: &mut BinaryReader) -> Result<Vector> {
    Ok(Vector {
        x: reader.read_f32()?,
        y: reader.read_f32()?,
        z: reader.read_f32()?,
    })
}

fn read_quat(reader: &mut BinaryReader) -> Result<Quat> {
    Ok(Quat {
        x: reader.read_f32()?,
        y: reader.read_f32()?,
        z: reader.read_f32()?,
        w: reader.read_f32()?,
    })
}

/// Read a fixed-layout struct, or `None` if the name has no fixed layout
pub fn read_fixed(reader: &mut BinaryReader, struct_name: &str) -> Result<Option<StructValue>> {
    let value = match struct_name {
        "Vector" => StructValue::Vector(read_vector(reader)?),
        "Vector2D" => StructValue::Vector2D(Vector2D {
            x: reader.read_f32()?,
            y: reader.read_f32()?,
        }),
        "Vector4" => StructValue::Vector4(Vector4 {
            x: reader.read_f32()?,
            y: reader.read_f32()?,
            z: reader.read_f32()?,
            w: reader.read_f32()?,
        }),
        "IntPoint" => StructValue::IntPoint(IntPoint {
            x: reader.read_i32()?,
            y: reader.read_i32()?,
        }),
        "IntVector" => StructValue::IntVector(IntVector {
            x: reader.read_i32()?,
            y: reader.read_i32()?,
            z: reader.read_i32()?,
        }),
        "Rotator" => StructValue::Rotator(Rotator {
            pitch: reader.read_f32()?,
            yaw: reader.read_f32()?,
            roll: reader.read_f32()?,
        }),
        "Quat" => StructValue::Quat(read_quat(reader)?),
        "Color" => {
            let b = reader.read_u8()?;
            let g = reader.read_u8()?;
            let r = reader.read_u8()?;
            let a = reader.read_u8()?;
            StructValue::Color(Color { r, g, b, a })
        }
        "LinearColor" => StructValue::LinearColor(LinearColor {
            r: reader.read_f32()?,
            g: reader.read_f32()?,
            b: reader.read_f32()?,
            a: reader.read_f32()?,
        }),
        "Transform" => StructValue::Transform(Transform {
            rotation: read_quat(reader)?,
            translation: read_vector(reader)?,
            scale: read_vector(reader)?,
        }),
        "Guid" => StructValue::Guid(GuidValue {
            a: reader.read_u32()?,
            b: reader.read_u32()?,
            c: reader.read_u32()?,
            d: reader.read_u32()?,
        }),
        "DateTime" => StructValue::DateTime(reader.read_i64()?),
        "Timespan" => StructValue::Timespan(reader.read_i64()?),
        "Margin" => StructValue::Margin(Margin {
            left: reader.read_f32()?,
            top: reader.read_f32()?,
            right: reader.read_f32()?,
            bottom: reader.read_f32()?,
        }),
        _ => return Ok(None),
    };
    Ok(Some(value))
}

fn write_vector(writer: &mut BinaryWriter, v: &Vector) -> Result<()> {
    writer.write_f32(v.x)?;
    writer.write_f32(v.y)?;
    writer.write_f32(v.z)
}

fn write_quat(writer: &mut BinaryWriter, q: &Quat) -> Result<()> {
    writer.write_f32(q.x)?;
    writer.write_f32(q.y)?;
    writer.write_f32(q.z)?;
    writer.write_f32(q.w)
}

/// Write a fixed-layout struct; returns `false` for generic and opaque values
pub fn write_fixed(writer: &mut BinaryWriter, value: &StructValue) -> Result<bool> {
    match value {
        StructValue::Vector(v) => write_vector(writer, v)?,
        StructValue::Vector2D(v) => {
            writer.write_f32(v.x)?;
            writer.write_f32(v.y)?;
        }
        StructValue::Vector4(v) => {
            writer.write_f32(v.x)?;
            writer.write_f32(v.y)?;
            writer.write_f32(v.z)?;
            writer.write_f32(v.w)?;
        }
        StructValue::IntPoint(p) => {
            writer.write_i32(p.x)?;
            writer.write_i32(p.y)?;
        }
        StructValue::IntVector(v) => {
            writer.write_i32(v.x)?;
            writer.write_i32(v.y)?;
            writer.write_i32(v.z)?;
        }
        StructValue::Rotator(r) => {
            writer.write_f32(r.pitch)?;
            writer.write_f32(r.yaw)?;
            writer.write_f32(r.roll)?;
        }
        StructValue::Quat(q) => write_quat(writer, q)?,
        StructValue::Color(c) => {
            writer.write_u8(c.b)?;
            writer.write_u8(c.g)?;
            writer.write_u8(c.r)?;
            writer.write_u8(c.a)?;
        }
        StructValue::LinearColor(c) => {
            writer.write_f32(c.r)?;
            writer.write_f32(c.g)?;
            writer.write_f32(c.b)?;
            writer.write_f32(c.a)?;
        }
        StructValue::Transform(t) => {
            write_quat(writer, &t.rotation)?;
            write_vector(writer, &t.translation)?;
            write_vector(writer, &t.scale)?;
        }
        StructValue::Guid(g) => {
            writer.write_u32(g.a)?;
            writer.write_u32(g.b)?;
            writer.write_u32(g.c)?;
            writer.write_u32(g.d)?;
        }
        StructValue::DateTime(ticks) | StructValue::Timespan(ticks) => writer.write_i64(*ticks)?,
        StructValue::Margin(m) => {
            writer.write_f32(m.left)?;
            writer.write_f32(m.top)?;
            writer.write_f32(m.right)?;
            writer.write_f32(m.bottom)?;
        }
        StructValue::Generic(_) | StructValue::Opaque(_) => return Ok(false),
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::ByteOrder;

    fn samples() -> Vec<StructValue> {
        vec![
            StructValue::Vector(Vector {
                x: 1.5,
                y: -2.25,
                z: f32::MAX,
            }),
            StructValue::Vector2D(Vector2D { x: 0.1, y: 0.2 }),
            StructValue::Vector4(Vector4 {
                x: 1.0,
                y: 2.0,
                z: 3.0,
                w: -0.0,
            }),
            StructValue::IntPoint(IntPoint { x: -1, y: 1920 }),
            StructValue::IntVector(IntVector {
                x: i32::MIN,
                y: 0,
                z: i32::MAX,
            }),
            StructValue::Rotator(Rotator {
                pitch: 90.0,
                yaw: -45.5,
                roll: 0.001,
            }),
            StructValue::Quat(Quat {
                x: 0.0,
                y: 0.7071068,
                z: 0.0,
                w: 0.7071068,
            }),
            StructValue::Color(Color {
                r: 255,
                g: 128,
                b: 1,
                a: 0,
            }),
            StructValue::LinearColor(LinearColor {
                r: 0.5,
                g: 0.25,
                b: 1.0,
                a: 1.0,
            }),
            StructValue::Transform(Transform::default()),
            StructValue::Guid(GuidValue {
                a: 0xDEADBEEF,
                b: 1,
                c: 2,
                d: u32::MAX,
            }),
            StructValue::DateTime(637_000_000_000_000_000),
            StructValue::Timespan(-36_000_000_000),
            StructValue::Margin(Margin {
                left: 4.0,
                top: 8.0,
                right: 4.0,
                bottom: 8.0,
            }),
        ]
    }

    #[test]
    fn test_fixed_structs_are_bit_exact() {
        for value in samples() {
            let name = struct_name_of(&value).unwrap();
            let mut writer = BinaryWriter::default();
            assert!(write_fixed(&mut writer, &value).unwrap());
            let bytes = writer.into_inner();

            let mut reader = BinaryReader::new(&bytes, ByteOrder::Little);
            let back = read_fixed(&mut reader, name).unwrap().unwrap();
            assert_eq!(reader.remaining(), 0, "{} left bytes unread", name);

            let mut again = BinaryWriter::default();
            write_fixed(&mut again, &back).unwrap();
            assert_eq!(again.into_inner(), bytes, "{} bytes differ", name);
        }
    }

    #[test]
    fn test_color_disk_order() {
        let bytes = [1u8, 2, 3, 4];
        let mut reader = BinaryReader::new(&bytes, ByteOrder::Little);
        let value = read_fixed(&mut reader, "Color").unwrap().unwrap();
        assert_eq!(
            value,
            StructValue::Color(Color {
                r: 3,
                g: 2,
                b: 1,
                a: 4
            })
        );
    }

    #[test]
    fn test_layout_sizes() {
        let expected = [
            ("Vector", 12),
            ("Vector2D", 8),
            ("Rotator", 12),
            ("Quat", 16),
            ("Color", 4),
            ("Transform", 40),
            ("Guid", 16),
            ("DateTime", 8),
            ("Margin", 16),
        ];
        let zeros = [0u8; 64];
        for (name, size) in expected {
            let mut reader = BinaryReader::new(&zeros, ByteOrder::Little);
            read_fixed(&mut reader, name).unwrap().unwrap();
            assert_eq!(reader.position(), size, "{}", name);
        }
    }

    #[test]
    fn test_unknown_struct() {
        let mut reader = BinaryReader::new(&[], ByteOrder::Little);
        assert!(read_fixed(&mut reader, "SlateBrush").unwrap().is_none());
        assert!(!is_fixed_struct("SlateBrush"));
        assert!(is_fixed_struct("LinearColor"));
    }
}
