use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::status::file_change::{IndexChange, WorkspaceChange};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Classification of every path that differs between the working tree,
/// the index and HEAD's tree
#[derive(Debug, Clone, Default)]
pub struct StatusReport {
    /// Branch HEAD points at; `None` when HEAD is detached
    pub branch: Option<BranchName>,
    /// Current HEAD commit; `None` before the first commit
    pub head: Option<ObjectId>,
    /// Index vs HEAD tree
    pub staged: BTreeMap<PathBuf, IndexChange>,
    /// Working tree vs index, compared by content hash
    pub unstaged: BTreeMap<PathBuf, WorkspaceChange>,
    /// Working-tree files absent from the index
    pub untracked: BTreeSet<PathBuf>,
}

impl StatusReport {
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty() && self.unstaged.is_empty() && self.untracked.is_empty()
    }
}

impl Repository {
    /// Classify staged, unstaged and untracked paths.
    ///
    /// The index resets to empty after each commit, so an empty index
    /// stands for "next commit = HEAD snapshot": paths identical in
    /// working tree, index and HEAD land in no category.
    pub async fn status(&self) -> anyhow::Result<StatusReport> {
        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        let head_tree = self.head_tree()?;
        let staged_tree = if index.is_empty() {
            head_tree.clone()
        } else {
            index.as_tree_entries()
        };

        let mut report = StatusReport {
            branch: self.refs().current_branch_name()?,
            head: self.refs().read_head()?,
            ..Default::default()
        };

        for (path, staged_oid) in &staged_tree {
            match head_tree.get(path) {
                None => {
                    report.staged.insert(path.clone(), IndexChange::Added);
                }
                Some(head_oid) if head_oid != staged_oid => {
                    report.staged.insert(path.clone(), IndexChange::Modified);
                }
                Some(_) => {}
            }

            match self.working_file_oid(path)? {
                None => {
                    report.unstaged.insert(path.clone(), WorkspaceChange::Deleted);
                }
                Some(working_oid) if &working_oid != staged_oid => {
                    report
                        .unstaged
                        .insert(path.clone(), WorkspaceChange::Modified);
                }
                Some(_) => {}
            }
        }

        // paths committed at HEAD but no longer staged
        for path in head_tree.keys() {
            if !staged_tree.contains_key(path) {
                report.staged.insert(path.clone(), IndexChange::Deleted);
            }
        }

        for path in self.workspace().list_files(None)? {
            if !staged_tree.contains_key(&path) {
                report.untracked.insert(path);
            }
        }

        Ok(report)
    }
}
