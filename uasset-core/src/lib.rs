//! Asset Document Core
//!
//! Core data structures shared by the package codec and its tools.
//! This crate knows nothing about the binary layout; it defines the
//! editable document tree, the closed set of property values, the raw-byte
//! fallback and the lookup tables that drive class and path resolution.

pub mod constants;
pub mod document;
pub mod error;
pub mod guid;
pub mod math;
pub mod raw;
pub mod value;

// Re-export main types
pub use constants::NONE_NAME;
pub use document::{
    CustomVersion, Document, DocumentFormat, ExportDesc, ExportValue, GatherableTextStub,
    ImportDesc, PackageInfo, SyntheticObject, ThumbnailBlob, ThumbnailIndexEntry, Thumbnails,
};
pub use error::{Result, UassetError};
pub use guid::Guid;
pub use raw::RawData;
pub use value::{Delegate, Property, PropertyMap, PropertyValue, StructValue};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_functionality() {
        let export = ExportDesc::new("/Script/Engine.Actor");
        assert_eq!(export.class, "/Script/Engine.Actor");
        assert!(export.value.properties.is_none());
    }
}
