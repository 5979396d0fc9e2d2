//! Signed cross-references between table entries
//!
//! `0` is no reference, `n > 0` is export `n - 1`, `n < 0` is import `-n - 1`.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PackageIndex(pub i32);

/// Where a [`PackageIndex`] points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexTarget {
    Null,
    Export(usize),
    Import(usize),
}

impl PackageIndex {
    pub const NULL: PackageIndex = PackageIndex(0);

    pub fn from_export(index: usize) -> Self {
        PackageIndex(index as i32 + 1)
    }

    pub fn from_import(index: usize) -> Self {
        PackageIndex(-(index as i32) - 1)
    }

    pub fn is_null(self) -> bool {
        self.0 == 0
    }

    pub fn is_export(self) -> bool {
        self.0 > 0
    }

    pub fn is_import(self) -> bool {
        self.0 < 0
    }

    pub fn target(self) -> IndexTarget {
        match self.0 {
            0 => IndexTarget::Null,
            n if n > 0 => IndexTarget::Export((n - 1) as usize),
            n => IndexTarget::Import((-(n as i64) - 1) as usize),
        }
    }
}

impl fmt::Display for PackageIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target() {
            IndexTarget::Null => write!(f, "None"),
            IndexTarget::Export(i) => write!(f, "Export[{}]", i),
            IndexTarget::Import(i) => write!(f, "Import[{}]", i),
        }
    }
}

impl From<i32> for PackageIndex {
    fn from(value: i32) -> Self {
        PackageIndex(value)
    }
}

impl PackageIndex {
    /// Parse the `Export[i]`/`Import[i]` text produced for out-of-range references
    pub fn parse_placeholder(text: &str) -> Option<Self> {
        let (kind, rest) = text.split_once('[')?;
        let index: usize = rest.strip_suffix(']')?.parse().ok()?;
        match kind {
            "Export" if index < i32::MAX as usize => Some(PackageIndex::from_export(index)),
            "Import" if index <= i32::MAX as usize => Some(PackageIndex::from_import(index)),
            _ => None,
        }
    }
}

/// Join path segments as `Root.Object:Sub.Sub`
pub fn join_object_path<S: AsRef<str>>(segments: &[S]) -> String {
    let mut path = String::new();
    for (i, segment) in segments.iter().enumerate() {
        match i {
            0 => {}
            1 => path.push('.'),
            2 => path.push(':'),
            _ => path.push('.'),
        }
        path.push_str(segment.as_ref());
    }
    path
}
