//! Logical operations on a repository
//!
//! Each module extends [`Repository`](crate::areas::repository::Repository)
//! with one operation: stage, commit, branch management, checkout, merge,
//! diff, status and log. Operations that cannot proceed for a benign
//! reason report a typed outcome instead of an error; unknown names and
//! unresolvable objects are errors.

pub mod branch;
pub mod checkout;
pub mod commit;
pub mod diff;
pub mod init;
pub mod log;
pub mod merge;
pub mod stage;
pub mod status;

use crate::areas::repository::Repository;
use crate::artifacts::objects::tree::TreeEntries;

impl Repository {
    /// Bring the working directory from one tree snapshot to another.
    ///
    /// Files present in the old tree but absent from the new one are
    /// deleted, then every file of the new tree is written from stored
    /// blob content. A path that cannot be written or removed is skipped
    /// with a warning so the rest of the batch still lands.
    pub(crate) fn update_working_tree(
        &self,
        old_tree: &TreeEntries,
        new_tree: &TreeEntries,
    ) -> anyhow::Result<()> {
        for path in old_tree.keys() {
            if !new_tree.contains_key(path) {
                if let Err(error) = self.workspace().remove_file(path) {
                    tracing::warn!("failed to remove {:?}, skipping: {error:#}", path);
                }
            }
        }

        for (path, oid) in new_tree {
            let blob = match self.database().parse_object_as_blob(oid) {
                Ok(Some(blob)) => blob,
                Ok(None) => {
                    tracing::warn!("object {oid} for {:?} is not a stored blob, skipping", path);
                    continue;
                }
                Err(error) => {
                    tracing::warn!("failed to load blob for {:?}, skipping: {error:#}", path);
                    continue;
                }
            };

            if let Err(error) = self.workspace().write_file(path, blob.content()) {
                tracing::warn!("failed to write {:?}, skipping: {error:#}", path);
            }
        }

        Ok(())
    }
}
