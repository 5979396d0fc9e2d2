//! Decode and encode configuration

use uasset_core::constants::DEFAULT_CHUNK_WIDTH;

/// Default size of the region reserved for the package summary
pub const DEFAULT_HEADER_RESERVE: usize = 4096;

/// Default limit on struct/array nesting inside a property stream
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Package root used when none is given
pub const DEFAULT_PACKAGE_NAME: &str = "/Game/Package";

/// Configuration for turning a package into a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Root of every export path (`/Game/Folder/Asset`)
    pub package_name: String,
    /// Width of one base64 line in raw data blocks
    pub chunk_width: usize,
    pub max_depth: usize,
    /// Add construction-script and scene-root placeholders to blueprint-like exports
    pub synthesize_scaffolding: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            package_name: DEFAULT_PACKAGE_NAME.to_string(),
            chunk_width: DEFAULT_CHUNK_WIDTH,
            max_depth: DEFAULT_MAX_DEPTH,
            synthesize_scaffolding: true,
        }
    }
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_package_name<S: Into<String>>(mut self, package_name: S) -> Self {
        self.package_name = package_name.into();
        self
    }

    /// Derive `/Game/{stem}` from a file name
    pub fn with_package_from_file_stem(self, stem: &str) -> Self {
        self.with_package_name(format!("/Game/{}", stem))
    }

    pub fn with_chunk_width(mut self, chunk_width: usize) -> Self {
        self.chunk_width = chunk_width;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_scaffolding(mut self, enabled: bool) -> Self {
        self.synthesize_scaffolding = enabled;
        self
    }
}

/// Where the writer takes an export's bytes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodySource {
    /// Preserved raw bytes first, re-encoded properties as a fallback
    #[default]
    RawFirst,
    /// Re-encode properties first, so document edits take effect
    PropertiesFirst,
}

/// Configuration for turning a document back into a package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Bytes reserved at the start of the file for the summary
    pub header_reserve: usize,
    pub body_source: BodySource,
    /// Check raw data digests before using the bytes
    pub verify_digests: bool,
    pub max_depth: usize,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            header_reserve: DEFAULT_HEADER_RESERVE,
            body_source: BodySource::RawFirst,
            verify_digests: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl EncodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header_reserve(mut self, header_reserve: usize) -> Self {
        self.header_reserve = header_reserve;
        self
    }

    pub fn with_body_source(mut self, body_source: BodySource) -> Self {
        self.body_source = body_source;
        self
    }

    pub fn with_verify_digests(mut self, verify: bool) -> Self {
        self.verify_digests = verify;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let decode = DecodeOptions::default();
        assert_eq!(decode.chunk_width, 76);
        assert_eq!(decode.max_depth, 64);
        assert!(decode.synthesize_scaffolding);

        let encode = EncodeOptions::default();
        assert_eq!(encode.header_reserve, 4096);
        assert_eq!(encode.body_source, BodySource::RawFirst);
    }

    #[test]
    fn test_builders() {
        let decode = DecodeOptions::new()
            .with_package_from_file_stem("WBP_Menu")
            .with_max_depth(8);
        assert_eq!(decode.package_name, "/Game/WBP_Menu");
        assert_eq!(decode.max_depth, 8);

        let encode = EncodeOptions::new().with_body_source(BodySource::PropertiesFirst);
        assert_eq!(encode.body_source, BodySource::PropertiesFirst);
    }
}
