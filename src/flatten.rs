//! Flattening of diff documents into tabular records for bulk analysis.
//!
//! One row is produced per changed entry, tagged with its change type.
//! Records are generated lazily while walking a parsed document and written
//! out in a streaming fashion; the full row set is never materialized.
//!
//! Field values are not escaped against the column delimiter. Registry data
//! containing the delimiter will shift columns for that row; this is an
//! accepted limitation of the tabular format, kept for compatibility with
//! its existing consumers.

use crate::document::{DiffDocument, DiffMetadata};
use crate::error::Result;
use crate::patch::{RegKey, RegValue};
use std::io::Write;
use tracing::debug;

/// Column headers in debug mode (provenance included).
pub const DEBUG_COLUMNS: [&str; 18] = [
    "CHANGE_TYPE",
    "BASELINE_NAME",
    "BASELINE_SHA1",
    "DELTA_NAME",
    "DELTA_SHA1",
    "APP_NAME",
    "NSRL_APP_ID",
    "ACTION",
    "ARCH",
    "SYS",
    "OS",
    "OSVER",
    "USER",
    "TIME",
    "ENTRY_TYPE",
    "PATH",
    "VALUE_NAME",
    "VALUE_DATA",
];

/// Column headers outside debug mode.
pub const BASIC_COLUMNS: [&str; 8] = [
    "CHANGE_TYPE",
    "APP_NAME",
    "NSRL_APP_ID",
    "ACTION",
    "ENTRY_TYPE",
    "PATH",
    "VALUE_NAME",
    "VALUE_DATA",
];

/// How an entry changed between baseline and delta.
///
/// `Delete` and `Modify` are distinct tags even though historical exports
/// collapsed them to one literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Entry exists only in the delta snapshot.
    Add,
    /// Entry exists only in the baseline snapshot.
    Delete,
    /// Entry exists in both snapshots with differing data.
    Modify,
}

impl ChangeKind {
    /// Returns the row tag for this change kind.
    pub fn tag(&self) -> &'static str {
        match self {
            ChangeKind::Add => "add",
            ChangeKind::Delete => "del",
            ChangeKind::Modify => "mod",
        }
    }
}

/// Whether a flat record describes a key or a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A registry key marker; value columns are empty.
    Key,
    /// A named registry value.
    Value,
}

impl EntryKind {
    /// Returns the row tag for this entry kind.
    pub fn tag(&self) -> &'static str {
        match self {
            EntryKind::Key => "key",
            EntryKind::Value => "value",
        }
    }
}

/// One tabular row derived from a diff document.
///
/// Ephemeral: borrowed from the document and rendered immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatRecord<'a> {
    /// How the entry changed.
    pub change: ChangeKind,

    /// Key or value.
    pub entry: EntryKind,

    /// Registry path of the entry.
    pub path: &'a str,

    /// Value name (empty for keys).
    pub value_name: &'a str,

    /// Value data (empty for keys).
    pub value_data: &'a str,
}

/// Rendering configuration for flattened output.
///
/// Debug mode is an explicit setting here, threaded into both the header
/// builder and row rendering.
#[derive(Debug, Clone, Copy)]
pub struct FlattenConfig {
    /// Include provenance/host columns in every row.
    pub debug: bool,

    /// Column delimiter (tab by default).
    pub delimiter: char,
}

impl Default for FlattenConfig {
    fn default() -> Self {
        FlattenConfig {
            debug: false,
            delimiter: '\t',
        }
    }
}

impl<'a> FlatRecord<'a> {
    /// Builds the row form of a changed key.
    pub fn for_key(change: ChangeKind, key: &'a RegKey) -> Self {
        FlatRecord {
            change,
            entry: EntryKind::Key,
            path: &key.path,
            value_name: "",
            value_data: "",
        }
    }

    /// Builds the row form of a changed value.
    pub fn for_value(change: ChangeKind, value: &'a RegValue) -> Self {
        FlatRecord {
            change,
            entry: EntryKind::Value,
            path: &value.path,
            value_name: &value.name,
            value_data: &value.data,
        }
    }
}

/// Returns a lazy, restartable iterator over the flat records of a document.
///
/// Emission order: added keys, added values, deleted keys, deleted values,
/// modified values. Modified keys are never emitted; key modification is
/// not a recognized category.
pub fn records(doc: &DiffDocument) -> impl Iterator<Item = FlatRecord<'_>> {
    let diff = &doc.diff;

    diff.keys_added
        .iter()
        .map(|k| FlatRecord::for_key(ChangeKind::Add, k))
        .chain(
            diff.values_added
                .iter()
                .map(|v| FlatRecord::for_value(ChangeKind::Add, v)),
        )
        .chain(
            diff.keys_deleted
                .iter()
                .map(|k| FlatRecord::for_key(ChangeKind::Delete, k)),
        )
        .chain(
            diff.values_deleted
                .iter()
                .map(|v| FlatRecord::for_value(ChangeKind::Delete, v)),
        )
        .chain(
            diff.values_modified
                .iter()
                .map(|v| FlatRecord::for_value(ChangeKind::Modify, v)),
        )
}

/// Builds the header row for the configured column layout.
pub fn header_row(config: &FlattenConfig) -> String {
    let columns: &[&str] = if config.debug {
        &DEBUG_COLUMNS
    } else {
        &BASIC_COLUMNS
    };
    columns.join(&config.delimiter.to_string())
}

/// Renders one record as a delimited row, or `None` when the row carries no
/// content beyond its tags and would be suppressed.
pub fn render_record(
    record: &FlatRecord<'_>,
    metadata: &DiffMetadata,
    config: &FlattenConfig,
) -> Option<String> {
    let nsrl = metadata.nsrl_id.as_deref().unwrap_or("");
    let action = metadata.action.code();

    let fields: Vec<&str> = if config.debug {
        vec![
            record.change.tag(),
            metadata.baseline_file.as_str(),
            metadata.baseline_hash.as_str(),
            metadata.delta_file.as_str(),
            metadata.delta_hash.as_str(),
            metadata.app_name.as_str(),
            nsrl,
            action,
            metadata.host_arch.as_str(),
            metadata.host_system_name.as_str(),
            metadata.host_os_name.as_str(),
            metadata.host_os_version.as_str(),
            metadata.user.as_str(),
            metadata.timestamp.as_str(),
            record.entry.tag(),
            record.path,
            record.value_name,
            record.value_data,
        ]
    } else {
        vec![
            record.change.tag(),
            metadata.app_name.as_str(),
            nsrl,
            action,
            record.entry.tag(),
            record.path,
            record.value_name,
            record.value_data,
        ]
    };

    // The change and entry tags are constant; a row is only worth emitting
    // if some other column is non-empty.
    let entry_tag_index = if config.debug { 14 } else { 4 };
    let has_content = fields
        .iter()
        .enumerate()
        .any(|(i, f)| i != 0 && i != entry_tag_index && !f.is_empty());
    if !has_content {
        return None;
    }

    Some(fields.join(&config.delimiter.to_string()))
}

/// Streams every record of a document to `out` as delimited rows.
///
/// Suppressed rows are skipped entirely, never written as blank lines.
/// Returns the number of rows written.
///
/// # Errors
///
/// Returns an error when writing to `out` fails; such a failure is fatal
/// for the shared output stream.
pub fn write_records<W: Write>(
    doc: &DiffDocument,
    out: &mut W,
    config: &FlattenConfig,
) -> Result<usize> {
    let mut written = 0;
    for record in records(doc) {
        if let Some(row) = render_record(&record, &doc.metadata, config) {
            writeln!(out, "{row}")?;
            written += 1;
        }
    }
    debug!(rows = written, "Flattened document");
    Ok(written)
}
