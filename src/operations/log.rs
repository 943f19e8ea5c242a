use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use std::collections::{HashSet, VecDeque};

impl Repository {
    /// Commit history reachable from HEAD, newest first.
    pub fn log(&self) -> anyhow::Result<Vec<(ObjectId, Commit)>> {
        let start = self.refs().read_head()?;
        self.walk_history(start)
    }

    /// Commit history reachable from a branch tip, newest first.
    pub fn log_branch(&self, branch: &str) -> anyhow::Result<Vec<(ObjectId, Commit)>> {
        let branch_name = BranchName::try_parse(branch.to_string())?;
        let start = self.refs().read_ref(&branch_name)?;
        self.walk_history(start)
    }

    /// Load a single commit's metadata and message.
    pub fn show_commit(&self, oid: &ObjectId) -> anyhow::Result<Option<Commit>> {
        self.database().parse_object_as_commit(oid)
    }

    /// Walk parent links breadth-first across all parent edges, visiting
    /// every reachable commit exactly once, then order newest first.
    /// Commits sharing a timestamp keep their discovery order.
    fn walk_history(&self, start: Option<ObjectId>) -> anyhow::Result<Vec<(ObjectId, Commit)>> {
        let mut history = Vec::new();
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();

        if let Some(start) = start {
            queue.push_back(start);
        }

        while let Some(oid) = queue.pop_front() {
            if !visited.insert(oid.clone()) {
                continue;
            }

            let Some(commit) = self.database().parse_object_as_commit(&oid)? else {
                continue;
            };

            for parent in commit.parents() {
                queue.push_back(parent.clone());
            }
            history.push((oid, commit));
        }

        history.sort_by_key(|(_, commit)| std::cmp::Reverse(commit.timestamp()));

        Ok(history)
    }
}
