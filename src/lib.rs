//! # Registry Patch Differ
//!
//! A differ for legacy registry-export text snapshots, producing structured
//! diff documents and flat tabular records for bulk analysis.
//!
//! ## Features
//!
//! - **Tolerant parsing**: malformed value lines are collected, never fatal
//! - **Set-based classification**: added/deleted/modified keys and values
//! - **Round-trip documents**: serialized diff documents read back exactly
//! - **Streaming extraction**: tabular rows generated lazily, never
//!   materialized in bulk
//!
//! ## Architecture
//!
//! The pipeline runs in five stages:
//!
//! 1. **Snapshot parsing** ([`patch`]): each raw text snapshot becomes a
//!    [`Snapshot`] of keys, values, and collected malformed lines
//! 2. **Classification** ([`diff`]): baseline and delta snapshots are
//!    partitioned into a [`ClassifiedDiff`]
//! 3. **Document model** ([`document`]): the diff is bound to provenance
//!    metadata as a [`DiffDocument`]
//! 4. **Serialization** ([`schema`], [`tree`]): documents are written to and
//!    read from an element-tree text format
//! 5. **Flattening** ([`flatten`]): a parsed document streams out one
//!    delimited row per changed entry
//!
//! ## Document Layout
//!
//! Serialized documents follow this shape:
//!
//! ```text
//! root
//!  ├─ baseline/file/{name, sha}
//!  ├─ delta/file/{name, sha}
//!  ├─ delta/app/{name, nsrl, action}
//!  ├─ diffnode/{arch, sys, os, osver, user, time}
//!  ├─ add/{key*, value*}
//!  ├─ del/{key*, value*}
//!  └─ mod/value*
//! ```
//!
//! ## Examples
//!
//! ### Diffing two snapshots
//!
//! ```
//! use reg_differ::{classify, Snapshot};
//!
//! let baseline = Snapshot::parse("REGEDIT4\n[HKLM\\Software\\X]".lines());
//! let delta = Snapshot::parse(
//!     "REGEDIT4\n[HKLM\\Software\\X]\n\"Ver\"=\"1.0\"".lines(),
//! );
//!
//! let diff = classify(&baseline, &delta);
//! assert_eq!(diff.values_added.len(), 1);
//! assert_eq!(diff.values_added[0].name, "Ver");
//! ```
//!
//! ### Round-tripping a document
//!
//! ```
//! use reg_differ::{read_document, write_document, Action, ClassifiedDiff,
//!                  DiffDocument, DiffMetadata};
//!
//! # fn main() -> reg_differ::Result<()> {
//! let doc = DiffDocument::new(
//!     DiffMetadata {
//!         baseline_file: "before.reg".into(),
//!         baseline_hash: "aa".into(),
//!         delta_file: "after.reg".into(),
//!         delta_hash: "bb".into(),
//!         app_name: "SampleApp".into(),
//!         nsrl_id: None,
//!         action: Action::Install,
//!         host_arch: "x86_64".into(),
//!         host_system_name: "lab-01".into(),
//!         host_os_name: "Windows".into(),
//!         host_os_version: "10.0".into(),
//!         user: "analyst".into(),
//!         timestamp: "2026-08-31T12:00:00Z".into(),
//!     },
//!     ClassifiedDiff::default(),
//! );
//!
//! let text = write_document(&doc);
//! assert_eq!(read_document(&text)?, doc);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod diff;
pub mod document;
pub mod error;
pub mod flatten;
pub mod patch;
pub mod schema;
pub mod tree;
pub mod utils;

// Re-export main types for convenience
pub use diff::{classify, ClassifiedDiff};
pub use document::{Action, DiffDocument, DiffMetadata};
pub use error::{DiffError, Result};
pub use flatten::{
    header_row, records, render_record, write_records, ChangeKind, EntryKind, FlatRecord,
    FlattenConfig,
};
pub use patch::{RegKey, RegValue, Snapshot};
pub use schema::{read_document, write_document};
pub use tree::Element;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
