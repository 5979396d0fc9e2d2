//! Property value types
//!
//! This module defines the closed set of values a tagged property can decode
//! to. Every decoder branch produces one of these variants, so adding a new
//! property kind is a compile-checked change rather than a new type string.

use crate::guid::Guid;
use crate::math::{
    Color, GuidValue, IntPoint, IntVector, LinearColor, Margin, Quat, Rotator, Transform, Vector,
    Vector2D, Vector4,
};
use crate::raw::base64_bytes;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered property map, keyed by property name (`Name[i]` for static array slots)
pub type PropertyMap = IndexMap<String, Property>;

/// One tagged property: the tag metadata plus its decoded value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Property {
    /// Original property type name (`IntProperty`, `StructProperty`, ...)
    #[serde(rename = "Type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub array_index: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub struct_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub struct_guid: Option<Guid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_name: Option<String>,
    /// Element type for arrays, key type for maps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_guid: Option<Guid>,
    pub value: PropertyValue,
}

fn is_zero(value: &i32) -> bool {
    *value == 0
}

impl Property {
    /// Create a property with no extra tag metadata
    pub fn new<S: Into<String>>(type_name: S, value: PropertyValue) -> Self {
        Self {
            type_name: type_name.into(),
            array_index: 0,
            struct_type: None,
            struct_guid: None,
            enum_name: None,
            inner_type: None,
            value_type: None,
            property_guid: None,
            value,
        }
    }

    pub fn with_struct_type<S: Into<String>>(mut self, struct_type: S) -> Self {
        self.struct_type = Some(struct_type.into());
        self
    }

    pub fn with_inner_type<S: Into<String>>(mut self, inner_type: S) -> Self {
        self.inner_type = Some(inner_type.into());
        self
    }

    pub fn with_enum_name<S: Into<String>>(mut self, enum_name: S) -> Self {
        self.enum_name = Some(enum_name.into());
        self
    }

    pub fn with_array_index(mut self, array_index: i32) -> Self {
        self.array_index = array_index;
        self
    }

    /// Map key used for this property inside a [`PropertyMap`]
    pub fn map_key(&self, name: &str) -> String {
        property_key(name, self.array_index)
    }
}

/// Build the map key for a property name and static array slot
pub fn property_key(name: &str, array_index: i32) -> String {
    if array_index == 0 {
        name.to_string()
    } else {
        format!("{}[{}]", name, array_index)
    }
}

/// Split a map key back into the property name, dropping a `[i]` slot suffix
pub fn property_name_from_key(key: &str) -> &str {
    if let Some(open) = key.rfind('[')
        && key.ends_with(']')
        && key[open + 1..key.len() - 1].parse::<i32>().is_ok()
    {
        return &key[..open];
    }
    key
}

/// Delegate binding: target object plus function name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Delegate {
    pub object: String,
    pub function: String,
}

/// A decoded property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float(f32),
    Double(f64),
    Str(String),
    /// Resolved name text, instance suffix included
    Name(String),
    /// Resolved object path, `None` when the reference is empty
    Object(String),
    SoftObject {
        #[serde(rename = "AssetPath")]
        asset_path: String,
        #[serde(rename = "SubPath")]
        sub_path: String,
    },
    Delegate(Delegate),
    MulticastDelegate(Vec<Delegate>),
    Struct(StructValue),
    Array(Vec<PropertyValue>),
    /// Map payloads are not decoded; only the leading count is kept
    Map {
        #[serde(rename = "Count")]
        count: i32,
    },
    /// Bytes of a value whose type is not understood
    Raw(#[serde(with = "base64_bytes")] Vec<u8>),
}

/// Struct payloads: either a known fixed layout or a nested property map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StructValue {
    Vector(Vector),
    Vector2D(Vector2D),
    Vector4(Vector4),
    IntPoint(IntPoint),
    IntVector(IntVector),
    Rotator(Rotator),
    Quat(Quat),
    Color(Color),
    LinearColor(LinearColor),
    Transform(Transform),
    Guid(GuidValue),
    DateTime(i64),
    Timespan(i64),
    Margin(Margin),
    Generic(PropertyMap),
    /// Nested stream that could not be decoded, kept verbatim
    Opaque(#[serde(with = "base64_bytes")] Vec<u8>),
}

impl PropertyValue {
    /// Get as boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get any integer variant widened to i64
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PropertyValue::Int8(v) => Some(*v as i64),
            PropertyValue::Int16(v) => Some(*v as i64),
            PropertyValue::Int32(v) => Some(*v as i64),
            PropertyValue::Int64(v) => Some(*v),
            PropertyValue::UInt8(v) => Some(*v as i64),
            PropertyValue::UInt16(v) => Some(*v as i64),
            PropertyValue::UInt32(v) => Some(*v as i64),
            PropertyValue::UInt64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Get as float
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Float(f) => Some(*f as f64),
            PropertyValue::Double(f) => Some(*f),
            _ => self.as_i64().map(|i| i as f64),
        }
    }

    /// Get string-like payloads (strings, names, object paths)
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Str(s) | PropertyValue::Name(s) | PropertyValue::Object(s) => Some(s),
            _ => None,
        }
    }

    /// Get as array
    pub fn as_array(&self) -> Option<&Vec<PropertyValue>> {
        match self {
            PropertyValue::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Get as struct
    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            PropertyValue::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Short name of the variant, used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            PropertyValue::Bool(_) => "Bool",
            PropertyValue::Int8(_) => "Int8",
            PropertyValue::Int16(_) => "Int16",
            PropertyValue::Int32(_) => "Int32",
            PropertyValue::Int64(_) => "Int64",
            PropertyValue::UInt8(_) => "UInt8",
            PropertyValue::UInt16(_) => "UInt16",
            PropertyValue::UInt32(_) => "UInt32",
            PropertyValue::UInt64(_) => "UInt64",
            PropertyValue::Float(_) => "Float",
            PropertyValue::Double(_) => "Double",
            PropertyValue::Str(_) => "Str",
            PropertyValue::Name(_) => "Name",
            PropertyValue::Object(_) => "Object",
            PropertyValue::SoftObject { .. } => "SoftObject",
            PropertyValue::Delegate(_) => "Delegate",
            PropertyValue::MulticastDelegate(_) => "MulticastDelegate",
            PropertyValue::Struct(_) => "Struct",
            PropertyValue::Array(_) => "Array",
            PropertyValue::Map { .. } => "Map",
            PropertyValue::Raw(_) => "Raw",
        }
    }
}

impl StructValue {
    /// Nested properties of a generic struct
    pub fn as_generic(&self) -> Option<&PropertyMap> {
        match self {
            StructValue::Generic(map) => Some(map),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Bool(b) => write!(f, "{}", b),
            PropertyValue::Float(v) => write!(f, "{}", v),
            PropertyValue::Double(v) => write!(f, "{}", v),
            PropertyValue::Str(s) | PropertyValue::Name(s) | PropertyValue::Object(s) => {
                write!(f, "{}", s)
            }
            PropertyValue::SoftObject {
                asset_path,
                sub_path,
            } => {
                if sub_path.is_empty() {
                    write!(f, "{}", asset_path)
                } else {
                    write!(f, "{}:{}", asset_path, sub_path)
                }
            }
            PropertyValue::Delegate(d) => write!(f, "{}::{}", d.object, d.function),
            PropertyValue::MulticastDelegate(list) => write!(f, "[{} bindings]", list.len()),
            PropertyValue::Struct(StructValue::Generic(map)) => write!(f, "{{{} fields}}", map.len()),
            PropertyValue::Struct(other) => write!(f, "{:?}", other),
            PropertyValue::Array(arr) => {
                write!(f, "[")?;
                for (i, item) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            PropertyValue::Map { count } => write!(f, "{{map: {} entries}}", count),
            PropertyValue::Raw(bytes) => write!(f, "<{} raw bytes>", bytes.len()),
            other => match other.as_i64() {
                Some(i) => write!(f, "{}", i),
                None => write!(f, "{:?}", other),
            },
        }
    }
}

// Conversion implementations
impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Bool(b)
    }
}

impl From<i32> for PropertyValue {
    fn from(i: i32) -> Self {
        PropertyValue::Int32(i)
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Int64(i)
    }
}

impl From<f32> for PropertyValue {
    fn from(f: f32) -> Self {
        PropertyValue::Float(f)
    }
}

impl From<f64> for PropertyValue {
    fn from(f: f64) -> Self {
        PropertyValue::Double(f)
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Str(s)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Str(s.to_string())
    }
}

impl From<StructValue> for PropertyValue {
    fn from(s: StructValue) -> Self {
        PropertyValue::Struct(s)
    }
}

impl From<Vec<PropertyValue>> for PropertyValue {
    fn from(arr: Vec<PropertyValue>) -> Self {
        PropertyValue::Array(arr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_value_conversions() {
        let bool_val: PropertyValue = true.into();
        assert_eq!(bool_val.as_bool(), Some(true));

        let int_val: PropertyValue = 42i32.into();
        assert_eq!(int_val.as_i64(), Some(42));

        let float_val: PropertyValue = 1.5f32.into();
        assert_eq!(float_val.as_f64(), Some(1.5));

        let string_val: PropertyValue = "test".into();
        assert_eq!(string_val.as_str(), Some("test"));
    }

    #[test]
    fn test_property_key_round_trip() {
        assert_eq!(property_key("Slots", 0), "Slots");
        assert_eq!(property_key("Slots", 2), "Slots[2]");
        assert_eq!(property_name_from_key("Slots[2]"), "Slots");
        assert_eq!(property_name_from_key("Slots"), "Slots");
        assert_eq!(property_name_from_key("Odd[x]"), "Odd[x]");
    }

    #[test]
    fn test_property_json_shape() {
        let prop = Property::new("IntProperty", PropertyValue::Int32(7));
        let json = serde_json::to_value(&prop).unwrap();
        assert_eq!(json["Type"], "IntProperty");
        assert_eq!(json["Value"]["Int32"], 7);
        assert!(json.get("ArrayIndex").is_none());

        let back: Property = serde_json::from_value(json).unwrap();
        assert_eq!(back, prop);
    }

    #[test]
    fn test_struct_value_json_round_trip() {
        let value = PropertyValue::Struct(StructValue::Vector(Vector {
            x: 1.0,
            y: 2.0,
            z: 3.0,
        }));
        let text = serde_json::to_string(&value).unwrap();
        assert!(text.contains("\"Vector\""));
        let back: PropertyValue = serde_json::from_str(&text).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_display() {
        assert_eq!(PropertyValue::Int32(42).to_string(), "42");
        assert_eq!(PropertyValue::Bool(true).to_string(), "true");
        assert_eq!(
            PropertyValue::Array(vec![1i32.into(), 2i32.into()]).to_string(),
            "[1, 2]"
        );
    }
}
