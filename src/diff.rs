//! Classification of two parsed snapshots into added/deleted/modified sets.

use crate::patch::{RegKey, RegValue, Snapshot};
use tracing::debug;

/// Classified differences between a baseline and a delta snapshot.
///
/// A key path appears in at most one of the key sets; a value identity
/// appears in at most one of the three value sets. Modified entries carry
/// the delta-side data. All sets are sorted by path, then name, so output
/// is reproducible regardless of input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedDiff {
    /// Keys present only in the delta snapshot.
    pub keys_added: Vec<RegKey>,

    /// Keys present only in the baseline snapshot.
    pub keys_deleted: Vec<RegKey>,

    /// Values present only in the delta snapshot.
    pub values_added: Vec<RegValue>,

    /// Values present only in the baseline snapshot.
    pub values_deleted: Vec<RegValue>,

    /// Values present in both snapshots with differing data (delta-side
    /// data retained). Key-level modification is not a recognized category.
    pub values_modified: Vec<RegValue>,
}

impl ClassifiedDiff {
    /// Returns true if no differences were found.
    pub fn is_empty(&self) -> bool {
        self.keys_added.is_empty()
            && self.keys_deleted.is_empty()
            && self.values_added.is_empty()
            && self.values_deleted.is_empty()
            && self.values_modified.is_empty()
    }
}

/// Partitions the keys and values of two snapshots into added, deleted, and
/// modified sets.
///
/// Pure function: entries present in both snapshots with identical data are
/// not reported. The snapshot maps are ordered, so each output set comes
/// out sorted without an extra pass.
pub fn classify(baseline: &Snapshot, delta: &Snapshot) -> ClassifiedDiff {
    let mut diff = ClassifiedDiff::default();

    for (path, key) in &delta.keys {
        if !baseline.keys.contains_key(path) {
            diff.keys_added.push(key.clone());
        }
    }
    for (path, key) in &baseline.keys {
        if !delta.keys.contains_key(path) {
            diff.keys_deleted.push(key.clone());
        }
    }

    for (identity, value) in &delta.values {
        match baseline.values.get(identity) {
            None => diff.values_added.push(value.clone()),
            Some(old) if old.data != value.data => diff.values_modified.push(value.clone()),
            Some(_) => {}
        }
    }
    for (identity, value) in &baseline.values {
        if !delta.values.contains_key(identity) {
            diff.values_deleted.push(value.clone());
        }
    }

    debug!(
        keys_added = diff.keys_added.len(),
        keys_deleted = diff.keys_deleted.len(),
        values_added = diff.values_added.len(),
        values_deleted = diff.values_deleted.len(),
        values_modified = diff.values_modified.len(),
        "Classified diff"
    );

    diff
}
