//! Name table
//!
//! Every string in a package body is a [`NameReference`]: an index into the
//! name table plus an instance number. Instance `0` means the name is used
//! verbatim; instance `n > 0` renders as `Base_{n-1}`.

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::Result;
use crate::reader::BinaryReader;
use crate::writer::BinaryWriter;
use indexmap::IndexSet;
use uasset_core::NONE_NAME;

/// Pointer into the name table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NameReference {
    pub index: i32,
    pub number: i32,
}

impl NameReference {
    pub fn new(index: i32, number: i32) -> Self {
        Self { index, number }
    }
}

/// Render a base name with its instance number
pub fn format_instance(base: &str, number: i32) -> String {
    if number > 0 {
        format!("{}_{}", base, number - 1)
    } else {
        base.to_string()
    }
}

/// Split `Base_N` into `("Base", N + 1)`
///
/// Only a non-empty base followed by a canonical decimal suffix (no leading
/// zeros) is split; anything else is a plain name with instance `0`.
pub fn split_instance(text: &str) -> (&str, i32) {
    if let Some(pos) = text.rfind('_')
        && pos > 0
    {
        let digits = &text[pos + 1..];
        let canonical = !digits.is_empty()
            && digits.bytes().all(|b| b.is_ascii_digit())
            && (digits == "0" || !digits.starts_with('0'));
        if canonical && let Ok(n) = digits.parse::<i32>() && n < i32::MAX {
            return (&text[..pos], n + 1);
        }
    }
    (text, 0)
}

/// Name table as read from a package
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameTable {
    names: Vec<String>,
}

impl NameTable {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Read `count` entries, each optionally followed by the hash pair
    pub fn from_reader(reader: &mut BinaryReader, count: usize, has_hashes: bool) -> Result<Self> {
        let mut names = Vec::with_capacity(count.min(reader.remaining()));
        for _ in 0..count {
            names.push(reader.read_fstring()?);
            if has_hashes {
                // Case-preserving and non-case-preserving hashes; recomputed by the engine
                reader.read_u16()?;
                reader.read_u16()?;
            }
        }
        Ok(Self { names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn into_names(self) -> Vec<String> {
        self.names
    }

    /// Entry at `index`, if in range
    pub fn get(&self, index: i32) -> Option<&str> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.names.get(i))
            .map(String::as_str)
    }

    /// Base text of an entry; out-of-range indices resolve to `None`
    pub fn base(&self, index: i32) -> &str {
        self.get(index).unwrap_or(NONE_NAME)
    }

    /// Resolve a reference to its display text, never failing
    pub fn resolve(&self, name: NameReference) -> String {
        format_instance(self.base(name.index), name.number)
    }

    /// Resolve a reference, recording out-of-range indices
    pub fn resolve_checked(
        &self,
        name: NameReference,
        diagnostics: &mut Diagnostics,
        context: &str,
    ) -> String {
        if self.get(name.index).is_none() {
            diagnostics.warn(
                DiagnosticKind::IndexOutOfRange,
                context,
                format!(
                    "Name index {} outside table of {} entries",
                    name.index,
                    self.names.len()
                ),
            );
        }
        self.resolve(name)
    }

    /// Whether a reference is the stream terminator
    pub fn is_none(&self, name: NameReference) -> bool {
        name.number == 0 && self.base(name.index) == NONE_NAME
    }
}

/// Name table under construction, indices assigned in insertion order
#[derive(Debug, Clone, Default)]
pub struct NameMap {
    names: IndexSet<String>,
}

impl NameMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a string verbatim and return its index
    pub fn add(&mut self, name: &str) -> i32 {
        if let Some(index) = self.names.get_index_of(name) {
            return index as i32;
        }
        let (index, _) = self.names.insert_full(name.to_string());
        index as i32
    }

    /// Build a reference for display text, splitting an instance suffix
    pub fn reference(&mut self, text: &str) -> NameReference {
        let (base, number) = split_instance(text);
        if number > 0 && !self.names.contains(base) && self.names.contains(text) {
            // Already stored verbatim; keep that entry
            return NameReference::new(self.add(text), 0);
        }
        NameReference::new(self.add(base), number)
    }

    /// Register display text without needing the reference
    pub fn register(&mut self, text: &str) {
        self.reference(text);
    }

    pub fn index_of(&self, name: &str) -> Option<i32> {
        self.names.get_index_of(name).map(|i| i as i32)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Write every entry, with a zero hash pair when `has_hashes`
    pub fn write_to(&self, writer: &mut BinaryWriter, has_hashes: bool) -> Result<()> {
        for name in &self.names {
            writer.write_fstring(name)?;
            if has_hashes {
                writer.write_u16(0)?;
                writer.write_u16(0)?;
            }
        }
        Ok(())
    }
}
