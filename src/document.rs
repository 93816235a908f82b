//! In-memory diff document model: provenance metadata plus classified sets.

use crate::diff::ClassifiedDiff;
use crate::error::{DiffError, Result};
use std::fmt;
use std::str::FromStr;

/// Categorization of what produced a delta snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// An application was installed.
    Install,
    /// An application was removed.
    Deinstall,
    /// An application was executed.
    Execute,
    /// Anything else.
    Other,
}

impl Action {
    /// Returns the single-letter code used in serialized documents.
    pub fn code(&self) -> &'static str {
        match self {
            Action::Install => "I",
            Action::Deinstall => "D",
            Action::Execute => "E",
            Action::Other => "O",
        }
    }
}

impl FromStr for Action {
    type Err = DiffError;

    /// Parses an action code. Case-insensitive on input; the canonical form
    /// is uppercase.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "I" => Ok(Action::Install),
            "D" => Ok(Action::Deinstall),
            "E" => Ok(Action::Execute),
            "O" => Ok(Action::Other),
            other => Err(DiffError::InvalidAction(other.to_string())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Provenance metadata for a diff document.
///
/// Captured once at document-construction time and immutable afterward.
/// Snapshot objects are not referenced; the document stands alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffMetadata {
    /// Name of the baseline snapshot file.
    pub baseline_file: String,

    /// Hex digest of the baseline snapshot file.
    pub baseline_hash: String,

    /// Name of the delta snapshot file.
    pub delta_file: String,

    /// Hex digest of the delta snapshot file.
    pub delta_hash: String,

    /// Name of the application that produced the delta.
    pub app_name: String,

    /// NSRL application identifier, when known.
    pub nsrl_id: Option<String>,

    /// What produced the delta.
    pub action: Action,

    /// Host CPU architecture.
    pub host_arch: String,

    /// Host system name.
    pub host_system_name: String,

    /// Host operating system name.
    pub host_os_name: String,

    /// Host operating system version.
    pub host_os_version: String,

    /// User that ran the capture.
    pub user: String,

    /// Capture timestamp, stored as opaque text so it round-trips exactly.
    pub timestamp: String,
}

/// A classified diff together with its provenance metadata.
///
/// Built once per baseline/delta pair and then serialized or discarded; it
/// has no further relation to the snapshots it was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffDocument {
    /// Provenance and host metadata.
    pub metadata: DiffMetadata,

    /// The classified added/deleted/modified sets.
    pub diff: ClassifiedDiff,
}

impl DiffDocument {
    /// Creates a document from metadata and a classified diff.
    pub fn new(metadata: DiffMetadata, diff: ClassifiedDiff) -> Self {
        Self { metadata, diff }
    }
}
