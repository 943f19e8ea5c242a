use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::{Author, Commit};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;
use anyhow::Context;

/// Result of a commit attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed { oid: ObjectId, is_root: bool },
    Amended { oid: ObjectId },
    /// The resulting tree would be empty; nothing was written
    NothingToCommit,
    /// Amend requested without an existing commit; nothing was written
    NothingToAmend,
}

impl Repository {
    /// Record the staged snapshot as a new commit on the current branch.
    ///
    /// The new tree is HEAD's tree overlaid with the staged entries,
    /// minus previously tracked paths whose working-tree files no longer
    /// exist (treated as deletions). On success the current branch ref
    /// advances and the index is cleared.
    pub async fn commit(&mut self, message: &str) -> anyhow::Result<CommitOutcome> {
        let index = self.index();
        let mut index = index.lock().await;

        index.rehydrate()?;

        let head_oid = self.refs().read_head()?;
        let mut new_tree = self.database().read_commit_tree(head_oid.as_ref())?;

        for (path, oid) in index.entries() {
            new_tree.insert(path.clone(), oid.clone());
        }
        new_tree.retain(|path, _| self.workspace().file_exists(path));

        if new_tree.is_empty() {
            return Ok(CommitOutcome::NothingToCommit);
        }

        let tree_oid = self.database().store(Tree::new(new_tree))?;

        let is_root = head_oid.is_none();
        let parents = head_oid.into_iter().collect::<Vec<_>>();
        let commit = Commit::new(
            parents,
            tree_oid,
            Author::load_from_env(),
            chrono::Local::now().fixed_offset(),
            message.trim().to_string(),
        );
        let commit_oid = self.database().store(commit)?;

        self.refs().update_head(commit_oid.clone())?;

        index.clear();
        index.write_updates()?;

        Ok(CommitOutcome::Committed {
            oid: commit_oid,
            is_root,
        })
    }

    /// Replace the current HEAD commit with an amended one.
    ///
    /// The amended tree starts from the snapshot being amended, overlays
    /// the staged entries and drops vanished files; with nothing staged
    /// the snapshot is kept as-is (message-only amend). The replacement
    /// commit inherits the amended commit's parents, leaving the old
    /// commit object in the store unreferenced.
    pub async fn amend(&mut self, message: &str) -> anyhow::Result<CommitOutcome> {
        let index = self.index();
        let mut index = index.lock().await;

        index.rehydrate()?;

        let Some(head_oid) = self.refs().read_head()? else {
            return Ok(CommitOutcome::NothingToAmend);
        };
        let head_commit = self
            .database()
            .parse_object_as_commit(&head_oid)?
            .context("HEAD does not point at a commit")?;

        let head_tree = self.database().read_commit_tree(Some(&head_oid))?;
        let new_tree = if index.is_empty() {
            head_tree
        } else {
            let mut new_tree = head_tree;
            for (path, oid) in index.entries() {
                new_tree.insert(path.clone(), oid.clone());
            }
            new_tree.retain(|path, _| self.workspace().file_exists(path));
            new_tree
        };

        let tree_oid = self.database().store(Tree::new(new_tree))?;

        let commit = Commit::new(
            head_commit.parents().to_vec(),
            tree_oid,
            Author::load_from_env(),
            chrono::Local::now().fixed_offset(),
            message.trim().to_string(),
        );
        let commit_oid = self.database().store(commit)?;

        self.refs().update_head(commit_oid.clone())?;

        index.clear();
        index.write_updates()?;

        Ok(CommitOutcome::Amended { oid: commit_oid })
    }
}
