use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use derive_new::new;

/// One row of the branch listing
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct BranchStatus {
    pub name: BranchName,
    pub is_current: bool,
}

impl Repository {
    /// List branches in name order, the checked-out one marked.
    pub fn branches(&self) -> anyhow::Result<Vec<BranchStatus>> {
        let current = self.refs().current_branch_name()?;

        Ok(self
            .refs()
            .list_branches()?
            .into_iter()
            .map(|name| {
                let is_current = Some(&name) == current.as_ref();
                BranchStatus::new(name, is_current)
            })
            .collect())
    }

    /// Create a branch pointing at the current HEAD commit.
    pub fn create_branch(&mut self, name: &str) -> anyhow::Result<()> {
        let branch_name = BranchName::try_parse(name.to_string())?;

        let source_oid = self
            .refs()
            .read_head()?
            .ok_or_else(|| anyhow::anyhow!("cannot create a branch before the first commit"))?;

        self.refs().create_branch(&branch_name, source_oid)
    }

    /// Delete a branch ref, returning the commit it pointed at.
    ///
    /// The default branch and the currently checked-out branch are
    /// protected; commit objects are never deleted with the ref.
    pub fn delete_branch(&mut self, name: &str) -> anyhow::Result<ObjectId> {
        let branch_name = BranchName::try_parse(name.to_string())?;

        if branch_name.is_default_branch() {
            anyhow::bail!("cannot delete the default branch {}", branch_name);
        }
        if self.refs().is_current_branch(&branch_name)? {
            anyhow::bail!(
                "cannot delete branch {} while it is checked out",
                branch_name
            );
        }

        self.refs().delete_branch(&branch_name)
    }
}
