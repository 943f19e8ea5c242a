use crate::areas::repository::Repository;
use crate::artifacts::diff::tree_diff::{DiffReport, Snapshot, compare_snapshots};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::TreeEntries;

impl Repository {
    /// Diff the working tree against the index (unstaged changes).
    pub async fn diff_unstaged(&self) -> anyhow::Result<DiffReport> {
        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        let old = self.snapshot_of_tree(&index.as_tree_entries())?;
        let new = self.snapshot_of_workspace()?;

        Ok(compare_snapshots(&old, &new))
    }

    /// Diff the working tree against HEAD's tree (all changes).
    pub fn diff_head(&self) -> anyhow::Result<DiffReport> {
        let old = self.snapshot_of_tree(&self.head_tree()?)?;
        let new = self.snapshot_of_workspace()?;

        Ok(compare_snapshots(&old, &new))
    }

    /// Diff the trees of two commits.
    pub fn diff_commits(&self, old: &ObjectId, new: &ObjectId) -> anyhow::Result<DiffReport> {
        for oid in [old, new] {
            if self.database().parse_object_as_commit(oid)?.is_none() {
                anyhow::bail!("unknown commit {}", oid);
            }
        }

        let old = self.snapshot_of_tree(&self.database().read_commit_tree(Some(old))?)?;
        let new = self.snapshot_of_tree(&self.database().read_commit_tree(Some(new))?)?;

        Ok(compare_snapshots(&old, &new))
    }

    /// Inflate a path -> blob hash mapping into a path -> content
    /// snapshot. Hashes that resolve to no stored blob are skipped with
    /// a warning.
    fn snapshot_of_tree(&self, entries: &TreeEntries) -> anyhow::Result<Snapshot> {
        let mut snapshot = Snapshot::new();

        for (path, oid) in entries {
            match self.database().parse_object_as_blob(oid)? {
                Some(blob) => {
                    snapshot.insert(path.clone(), blob.content().to_string());
                }
                None => {
                    tracing::warn!("object {oid} for {:?} is not a stored blob, skipping", path);
                }
            }
        }

        Ok(snapshot)
    }

    /// Read every working-tree file into a snapshot. Unreadable files
    /// are skipped with a warning.
    fn snapshot_of_workspace(&self) -> anyhow::Result<Snapshot> {
        let mut snapshot = Snapshot::new();

        for path in self.workspace().list_files(None)? {
            match self.workspace().read_file(&path) {
                Ok(content) => {
                    snapshot.insert(path, content);
                }
                Err(error) => {
                    tracing::warn!("failed to read {:?}, skipping: {error:#}", path);
                }
            }
        }

        Ok(snapshot)
    }
}
