use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::tree::TreeEntries;

/// Result of a completed checkout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutOutcome {
    pub branch: BranchName,
    /// Uncommitted changes were detected before switching. The switch
    /// still happened; local edits may have been overwritten.
    pub uncommitted_changes: bool,
}

impl Repository {
    /// Switch the working directory, index and HEAD to another branch.
    ///
    /// Uncommitted changes (index differing from HEAD's tree, or
    /// working-tree files differing from the index by content hash) are
    /// reported with a warning but never block the switch.
    pub async fn checkout(&mut self, target: &str) -> anyhow::Result<CheckoutOutcome> {
        let branch = BranchName::try_parse(target.to_string())?;

        if !self.refs().branch_exists(&branch) {
            anyhow::bail!("branch {} not found", branch);
        }
        let target_oid = self
            .refs()
            .read_ref(&branch)?
            .ok_or_else(|| anyhow::anyhow!("branch {} has no commits yet", branch))?;

        let index = self.index();
        let mut index = index.lock().await;

        index.rehydrate()?;

        let old_tree = self.head_tree()?;
        let uncommitted_changes = self.detect_uncommitted_changes(&index, &old_tree)?;
        if uncommitted_changes {
            tracing::warn!("uncommitted changes present, they may be overwritten");
        }

        let new_tree = self.database().read_commit_tree(Some(&target_oid))?;

        self.update_working_tree(&old_tree, &new_tree)?;

        index.replace(new_tree);
        index.write_updates()?;

        self.refs().set_head_to_branch(&branch)?;

        Ok(CheckoutOutcome {
            branch,
            uncommitted_changes,
        })
    }

    /// An empty index stands for "next commit = HEAD snapshot" (the index
    /// resets after each commit), so it compares clean against HEAD and
    /// the working tree is checked against HEAD's hashes instead.
    fn detect_uncommitted_changes(
        &self,
        index: &Index,
        head_tree: &TreeEntries,
    ) -> anyhow::Result<bool> {
        let staged_tree = if index.is_empty() {
            head_tree.clone()
        } else {
            index.as_tree_entries()
        };

        if &staged_tree != head_tree {
            return Ok(true);
        }

        for (path, staged_oid) in &staged_tree {
            match self.working_file_oid(path)? {
                Some(working_oid) if &working_oid == staged_oid => {}
                _ => return Ok(true),
            }
        }

        Ok(false)
    }
}
