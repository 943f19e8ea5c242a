use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::merge::ancestor_finder::AncestorFinder;
use crate::artifacts::merge::three_way;
use crate::artifacts::merge::three_way::MergeConflict;
use crate::artifacts::objects::commit::{Author, Commit};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;

/// Result of a merge attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The target's history is already contained in the current branch
    /// (or both refs name the same commit); nothing changed.
    AlreadyUpToDate,
    /// The current tip was an ancestor of the target: the branch ref was
    /// advanced to the target commit and no merge commit was created.
    FastForwarded { oid: ObjectId },
    /// Diverging edits were found. The provisional merged tree was
    /// written to the index only; the working directory, both branch
    /// refs and the commit history are untouched. Resolve and commit to
    /// complete the merge.
    Conflicted { conflicts: Vec<MergeConflict> },
    /// A merge commit with two parents (current, target) was created and
    /// the current branch ref advanced to it.
    Merged { oid: ObjectId },
}

impl Repository {
    /// Merge a branch into the current one.
    ///
    /// The merged branch is never deleted or rewritten by any outcome;
    /// its ref still resolves to its pre-merge commit afterwards.
    pub async fn merge(&mut self, branch: &str) -> anyhow::Result<MergeOutcome> {
        let branch_name = BranchName::try_parse(branch.to_string())?;

        if !self.refs().branch_exists(&branch_name) {
            anyhow::bail!("branch {} not found", branch_name);
        }
        let target_oid = self
            .refs()
            .read_ref(&branch_name)?
            .ok_or_else(|| anyhow::anyhow!("branch {} has no commits yet", branch_name))?;

        let current_oid = self
            .refs()
            .read_head()?
            .ok_or_else(|| anyhow::anyhow!("cannot merge: no commits on the current branch"))?;

        if current_oid == target_oid {
            return Ok(MergeOutcome::AlreadyUpToDate);
        }

        tracing::debug!(
            "merging {} into {}",
            target_oid.to_short_oid(),
            current_oid.to_short_oid()
        );

        let database = self.database();
        let ancestor = {
            let finder = AncestorFinder::new(|oid: &ObjectId| database.load_slim_commit(oid));
            finder
                .find_common_ancestor(&current_oid, &target_oid)?
                .ok_or_else(|| {
                    anyhow::anyhow!("no common ancestor between HEAD and {}", branch_name)
                })?
        };

        if ancestor == current_oid {
            return self.fast_forward(&current_oid, target_oid).await;
        }
        if ancestor == target_oid {
            // target's history is fully contained in the current branch
            return Ok(MergeOutcome::AlreadyUpToDate);
        }

        let base_tree = self.database().read_commit_tree(Some(&ancestor))?;
        let current_tree = self.database().read_commit_tree(Some(&current_oid))?;
        let target_tree = self.database().read_commit_tree(Some(&target_oid))?;

        let merged = three_way::resolve(&base_tree, &current_tree, &target_tree);

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        if merged.has_conflicts() {
            // stage the provisional tree for manual resolution, touch
            // nothing else
            index.replace(merged.entries);
            index.write_updates()?;

            return Ok(MergeOutcome::Conflicted {
                conflicts: merged.conflicts,
            });
        }

        self.update_working_tree(&current_tree, &merged.entries)?;
        index.replace(merged.entries.clone());
        index.write_updates()?;

        let tree_oid = self.database().store(Tree::new(merged.entries))?;
        let commit = Commit::new(
            vec![current_oid, target_oid],
            tree_oid,
            Author::load_from_env(),
            chrono::Local::now().fixed_offset(),
            format!("Merge branch '{}'", branch_name),
        );
        let commit_oid = self.database().store(commit)?;

        self.refs().update_head(commit_oid.clone())?;

        Ok(MergeOutcome::Merged { oid: commit_oid })
    }

    /// Advance the current branch ref straight to the target commit,
    /// bringing the working directory and index along.
    async fn fast_forward(
        &self,
        current_oid: &ObjectId,
        target_oid: ObjectId,
    ) -> anyhow::Result<MergeOutcome> {
        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        let old_tree = self.database().read_commit_tree(Some(current_oid))?;
        let new_tree = self.database().read_commit_tree(Some(&target_oid))?;

        self.update_working_tree(&old_tree, &new_tree)?;
        index.replace(new_tree);
        index.write_updates()?;

        self.refs().update_head(target_oid.clone())?;

        Ok(MergeOutcome::FastForwarded { oid: target_oid })
    }
}
