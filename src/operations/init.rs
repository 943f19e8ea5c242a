use crate::areas::repository::Repository;
use crate::artifacts::branch::DEFAULT_BRANCH;
use crate::artifacts::branch::branch_name::BranchName;
use anyhow::Context;
use std::fs;

impl Repository {
    /// Initialize the repository metadata: object store, refs, an empty
    /// index, and HEAD pointing at an empty default branch.
    pub async fn init(&mut self) -> anyhow::Result<()> {
        fs::create_dir_all(self.database().objects_path())
            .context("Failed to create objects directory")?;

        fs::create_dir_all(self.refs().heads_path())
            .context("Failed to create refs/heads directory")?;

        let default_branch = BranchName::try_parse(DEFAULT_BRANCH.to_string())?;
        self.refs()
            .set_head_to_branch(&default_branch)
            .context("Failed to create initial HEAD reference")?;

        // the default branch starts out with no commits
        self.refs().create_empty_branch(&default_branch)?;

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        Ok(())
    }
}
