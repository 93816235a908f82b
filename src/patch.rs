//! Registry patch-file parsing into in-memory snapshots.
//!
//! A patch file is a legacy registry-export text format: a one-line header,
//! key lines of the form `[HKLM\Software\X]`, and value lines of the form
//! `"Name"="data"` (or `@=data` for the default value) grouped under the most
//! recent key line. Long value lines are wrapped with a trailing backslash
//! continuation marker.
//!
//! Parsing never fails on malformed content: lines whose value name does not
//! validate are collected into [`Snapshot::malformed_lines`] and contribute
//! nothing to the value map.

use crate::error::Result;
use crate::utils::{normalize_line, read_snapshot_text};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, instrument};

/// A registry key marker.
///
/// Keys carry no data of their own; identity is the exact path string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RegKey {
    /// Registry path, e.g. `HKEY_LOCAL_MACHINE\Software\X`.
    pub path: String,
}

/// A named datum under a registry path.
///
/// Identity is the fully-qualified `(path, name)` pair; `data` is payload.
/// Two values sharing an identity but differing in data across snapshots are
/// classified as modified, never as an add/delete pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RegValue {
    /// Registry path of the containing key.
    pub path: String,

    /// Value name with surrounding quotes stripped (`@` for the default value).
    pub name: String,

    /// Raw value data, exactly as it appeared after the `=`.
    pub data: String,
}

impl RegValue {
    /// Returns the fully-qualified identity, `path\name`.
    pub fn qualified_name(&self) -> String {
        format!("{}\\{}", self.path, self.name)
    }
}

/// Parsed in-memory view of one registry patch file.
///
/// Built once per input and immutable afterward. Maps are ordered by path
/// and qualified name so that downstream classification and serialization
/// are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// Registry keys by path.
    pub keys: BTreeMap<String, RegKey>,

    /// Registry values by fully-qualified name (`path\name`).
    pub values: BTreeMap<String, RegValue>,

    /// Lines that failed value-name validation, in input order, each
    /// rendered as `[<path>] <name>=<data>`.
    pub malformed_lines: Vec<String>,
}

impl Snapshot {
    /// Opens and parses a registry patch file.
    ///
    /// # Errors
    ///
    /// Returns an error only if the file cannot be read; malformed content
    /// is collected, not raised.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = read_snapshot_text(path)?;
        Ok(Self::parse(text.lines()))
    }

    /// Parses a sequence of patch-file lines into a snapshot.
    ///
    /// The first line is discarded unconditionally (format header, e.g.
    /// `Windows Registry Editor Version 5.00` or `REGEDIT4`).
    pub fn parse<'a, I>(lines: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut snapshot = Snapshot::default();
        let mut current_path = String::new();
        // Continuation buffer for backslash-wrapped value lines. A single
        // accumulator spans the whole pass; it is only consumed by the next
        // non-continuation line.
        let mut pending = String::new();

        for line in lines.into_iter().skip(1) {
            let line = normalize_line(line);

            if line.is_empty() {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                current_path = line[1..line.len() - 1].to_string();
                snapshot.keys.insert(
                    current_path.clone(),
                    RegKey {
                        path: current_path.clone(),
                    },
                );
                continue;
            }

            if let Some(partial) = line.strip_suffix('\\') {
                pending.push_str(partial.trim_start());
                continue;
            }

            let logical = format!("{}{}", std::mem::take(&mut pending), line);
            let logical = logical.trim_start();

            let (name, data) = split_value_line(logical);

            if !is_valid_value_name(&name) {
                snapshot
                    .malformed_lines
                    .push(format!("[{}] {}={}", current_path, name, data));
                continue;
            }

            let name = strip_quotes(&name);
            let value = RegValue {
                path: current_path.clone(),
                name,
                data,
            };
            // Last write wins for a repeated identity.
            snapshot.values.insert(value.qualified_name(), value);
        }

        debug!(
            keys = snapshot.keys.len(),
            values = snapshot.values.len(),
            malformed = snapshot.malformed_lines.len(),
            "Parsed snapshot"
        );

        snapshot
    }
}

/// Splits a logical value line into `(name, data)`.
///
/// A plain `name=data` line splits cleanly in two. When the data (or, for
/// quoted names, the name) itself contains `=`, the split pieces are
/// re-joined: an `@` first segment is the whole name, otherwise segments
/// accumulate into the name until it ends in a closing quote, and the rest
/// re-join into the data.
fn split_value_line(line: &str) -> (String, String) {
    let parts: Vec<&str> = line.split('=').collect();

    if parts.len() == 2 {
        return (parts[0].to_string(), parts[1].to_string());
    }

    if parts[0] == "@" {
        return (String::from("@"), parts[1..].join("="));
    }

    let mut name = parts[0].to_string();
    let mut idx = 1;
    while !name.ends_with('"') && idx < parts.len() {
        name.push('=');
        name.push_str(parts[idx]);
        idx += 1;
    }

    (name, parts[idx..].join("="))
}

/// A legal value name is the literal `@` or a string fully wrapped in
/// double quotes.
fn is_valid_value_name(name: &str) -> bool {
    name == "@" || (name.len() >= 2 && name.starts_with('"') && name.ends_with('"'))
}

/// Strips one leading and one trailing double quote (no-op for `@`).
fn strip_quotes(name: &str) -> String {
    if name == "@" {
        return name.to_string();
    }
    let inner = name.strip_prefix('"').unwrap_or(name);
    inner.strip_suffix('"').unwrap_or(inner).to_string()
}
