//! Snapshot comparison
//!
//! Takes the symmetric union of paths from two path -> content snapshots
//! and classifies each path as added, deleted or modified; changed paths
//! carry the positional line diff of their contents.

use crate::artifacts::diff::line_diff::{DiffLine, compare_lines};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// A path -> file content mapping, however it was obtained (working
/// directory, index blobs, a commit's tree blobs)
pub type Snapshot = BTreeMap<PathBuf, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Deleted,
    Modified,
}

/// One changed path and its line-level differences
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub path: PathBuf,
    pub change: ChangeKind,
    pub lines: Vec<DiffLine>,
}

/// The full comparison of two snapshots, ordered by path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffReport {
    pub files: Vec<FileDiff>,
}

impl DiffReport {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn file(&self, path: &std::path::Path) -> Option<&FileDiff> {
        self.files.iter().find(|file| file.path == path)
    }
}

/// Compare two snapshots path by path.
///
/// Absence on one side classifies the path as added or deleted; presence
/// on both sides with differing content classifies it as modified.
pub fn compare_snapshots(old: &Snapshot, new: &Snapshot) -> DiffReport {
    let all_paths: BTreeSet<&PathBuf> = old.keys().chain(new.keys()).collect();

    let mut report = DiffReport::default();

    for path in all_paths {
        let old_content = old.get(path);
        let new_content = new.get(path);

        let (change, lines) = match (old_content, new_content) {
            (None, Some(new_content)) => (ChangeKind::Added, compare_lines("", new_content)),
            (Some(old_content), None) => (ChangeKind::Deleted, compare_lines(old_content, "")),
            (Some(old_content), Some(new_content)) if old_content != new_content => (
                ChangeKind::Modified,
                compare_lines(old_content, new_content),
            ),
            _ => continue,
        };

        report.files.push(FileDiff {
            path: path.clone(),
            change,
            lines,
        });
    }

    report
}
