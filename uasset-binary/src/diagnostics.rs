//! Non-fatal findings collected during a decode or encode pass
//!
//! Recoverable format quirks are not errors: the codec records them here and
//! keeps going. Each finding is also logged through `tracing` at the point it
//! is detected.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

/// How much a finding matters
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DiagnosticLevel {
    Info,
    Warning,
}

/// Category of a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// Name, import or export index outside its table
    IndexOutOfRange,
    /// Declared property size differs from bytes consumed
    SizeMismatch,
    /// Property type with no decoder, kept as raw bytes
    UnknownPropertyType,
    /// Array element type with no decoder, array truncated
    UnknownElementType,
    /// Map payload skipped
    MapSkipped,
    /// Nested stream failed to decode
    NestedDecodeFailed,
    /// Import entry rewritten by the repair table
    ImportRepaired,
    /// Two exports produced the same path
    DuplicatePath,
    /// Export body could not be sourced while writing
    MissingBody,
    /// Object reference could not be resolved while writing
    UnresolvedReference,
    /// Raw fallback digest does not match its bytes
    DigestMismatch,
    Other,
}

/// One recorded finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub kind: DiagnosticKind,
    /// Where it happened (export path, property name, table)
    pub context: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            DiagnosticLevel::Info => "info",
            DiagnosticLevel::Warning => "warning",
        };
        if self.context.is_empty() {
            write!(f, "{}: {}", level, self.message)
        } else {
            write!(f, "{}: [{}] {}", level, self.context, self.message)
        }
    }
}

/// Ordered collection of findings for one pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record and log a warning
    pub fn warn<C: Into<String>, M: Into<String>>(
        &mut self,
        kind: DiagnosticKind,
        context: C,
        message: M,
    ) {
        let diagnostic = Diagnostic {
            level: DiagnosticLevel::Warning,
            kind,
            context: context.into(),
            message: message.into(),
        };
        warn!(kind = ?diagnostic.kind, context = %diagnostic.context, "{}", diagnostic.message);
        self.entries.push(diagnostic);
    }

    /// Record and log an informational finding
    pub fn info<C: Into<String>, M: Into<String>>(
        &mut self,
        kind: DiagnosticKind,
        context: C,
        message: M,
    ) {
        let diagnostic = Diagnostic {
            level: DiagnosticLevel::Info,
            kind,
            context: context.into(),
            message: message.into(),
        };
        info!(kind = ?diagnostic.kind, context = %diagnostic.context, "{}", diagnostic.message);
        self.entries.push(diagnostic);
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Number of findings of one kind
    pub fn count_of(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    pub fn warning_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Warning)
            .count()
    }

    /// Findings recorded since `mark` (a previous `len()`)
    pub fn since(&self, mark: usize) -> &[Diagnostic] {
        &self.entries[mark.min(self.entries.len())..]
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// A best-effort value plus the findings recorded while producing it
#[derive(Debug, Clone)]
pub struct Decoded<T> {
    pub value: T,
    pub diagnostics: Diagnostics,
}

impl<T> Decoded<T> {
    pub fn new(value: T, diagnostics: Diagnostics) -> Self {
        Self { value, diagnostics }
    }

    pub fn clean(value: T) -> Self {
        Self::new(value, Diagnostics::new())
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Decoded<U> {
        Decoded {
            value: f(self.value),
            diagnostics: self.diagnostics,
        }
    }

    pub fn into_parts(self) -> (T, Diagnostics) {
        (self.value, self.diagnostics)
    }
}
