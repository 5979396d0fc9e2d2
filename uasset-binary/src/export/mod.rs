//! Export-level decoding: object paths, class identities and bodies

pub mod body;
pub mod class;
pub mod path;

pub use body::decode_export_body;
pub use class::{classify_class_name, resolve_class};
pub use path::{ObjectResolver, build_export_paths, build_import_paths, object_name_from_path};
