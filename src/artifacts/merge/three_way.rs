//! Three-way tree reconciliation
//!
//! Resolves two divergent trees against their common-ancestor base tree,
//! path by path, producing a combined tree and a list of conflicting
//! edits. Resolution is pure: it works on path -> blob hash mappings and
//! never touches the store or the working directory.
//!
//! All conflicts are collected; resolution never stops at the first one.
//! A conflicted path still receives a provisional entry (the current
//! side's version, or the surviving side's for delete conflicts) so the
//! caller can stage the half-merged tree for manual resolution.

use crate::artifacts::objects::tree::TreeEntries;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Kind of divergence that made a path conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// Absent in base, added with different content on both sides
    BothAdded,
    /// Present in base, modified to different content on both sides
    BothModified,
    /// Modified on the current side, deleted on the target side
    ModifiedInCurrentDeletedInTarget,
    /// Deleted on the current side, modified on the target side
    DeletedInCurrentModifiedInTarget,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeConflict {
    pub path: PathBuf,
    pub kind: ConflictKind,
}

/// Result of reconciling the three trees
#[derive(Debug, Clone, Default)]
pub struct MergedTree {
    pub entries: TreeEntries,
    pub conflicts: Vec<MergeConflict>,
}

impl MergedTree {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// Reconcile `current` and `target` against their common `base`.
///
/// Per path, presence and hash equality across the three trees decide the
/// outcome: unchanged sides yield to changed ones, identical changes
/// agree silently, clean deletions drop the path, and diverging changes
/// conflict with the current side winning provisionally.
pub fn resolve(base: &TreeEntries, current: &TreeEntries, target: &TreeEntries) -> MergedTree {
    let all_paths: BTreeSet<&PathBuf> = base
        .keys()
        .chain(current.keys())
        .chain(target.keys())
        .collect();

    let mut merged = MergedTree::default();

    for path in all_paths {
        let base_oid = base.get(path);
        let current_oid = current.get(path);
        let target_oid = target.get(path);

        match (base_oid, current_oid, target_oid) {
            // new on both sides
            (None, Some(current_oid), Some(target_oid)) => {
                if current_oid != target_oid {
                    merged.conflicts.push(MergeConflict {
                        path: path.clone(),
                        kind: ConflictKind::BothAdded,
                    });
                }
                merged.entries.insert(path.clone(), current_oid.clone());
            }
            // pure addition on one side
            (None, Some(oid), None) | (None, None, Some(oid)) => {
                merged.entries.insert(path.clone(), oid.clone());
            }
            (None, None, None) => unreachable!("path came from one of the three trees"),
            // present in base, kept on both sides
            (Some(base_oid), Some(current_oid), Some(target_oid)) => {
                let resolved = if current_oid == target_oid {
                    current_oid
                } else if current_oid == base_oid {
                    target_oid
                } else if target_oid == base_oid {
                    current_oid
                } else {
                    merged.conflicts.push(MergeConflict {
                        path: path.clone(),
                        kind: ConflictKind::BothModified,
                    });
                    current_oid
                };
                merged.entries.insert(path.clone(), resolved.clone());
            }
            // deleted on the target side
            (Some(base_oid), Some(current_oid), None) => {
                if current_oid == base_oid {
                    // clean delete, path dropped
                } else {
                    merged.conflicts.push(MergeConflict {
                        path: path.clone(),
                        kind: ConflictKind::ModifiedInCurrentDeletedInTarget,
                    });
                    merged.entries.insert(path.clone(), current_oid.clone());
                }
            }
            // deleted on the current side
            (Some(base_oid), None, Some(target_oid)) => {
                if target_oid == base_oid {
                    // clean delete, path dropped
                } else {
                    merged.conflicts.push(MergeConflict {
                        path: path.clone(),
                        kind: ConflictKind::DeletedInCurrentModifiedInTarget,
                    });
                    merged.entries.insert(path.clone(), target_oid.clone());
                }
            }
            // deleted on both sides
            (Some(_), None, None) => {}
        }
    }

    merged
}
