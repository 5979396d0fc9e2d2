//! Tagged property codec

pub mod decode;
pub mod encode;
pub mod structs;
pub mod tag;

pub use decode::{decode_properties, decode_stream};
pub use encode::{encode_properties, encode_to_vec, register_names};
pub use structs::{FIXED_STRUCTS, is_fixed_struct};
pub use tag::{PropertyTag, types};
