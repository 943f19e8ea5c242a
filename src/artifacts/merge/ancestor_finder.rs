//! Common ancestor finder for merge operations
//!
//! Finds a commit reachable from both of two given commits via parent
//! links, used as the merge base for three-way merges.
//!
//! ## Algorithm
//!
//! Two breadth-first passes over the child -> parents graph:
//!
//! 1. From the source commit, traverse every reachable commit across all
//!    parent edges (a merge commit contributes two edges), marking each
//!    as visited from the source side. The source itself is included.
//! 2. From the target commit, traverse breadth-first the same way and
//!    return the first commit already marked by the first pass.
//!
//! Discovery order, not minimal depth, decides the result when several
//! candidates exist at different depths; that tie-break is deliberate.
//! If the second traversal exhausts without a hit (disconnected
//! histories) the search yields `None` rather than failing.
//!
//! ## Debug Logging
//!
//! Build with the `debug_merge` feature to trace traversal states:
//! `cargo build --features debug_merge`.

use crate::artifacts::objects::commit::SlimCommit;
use crate::artifacts::objects::object_id::ObjectId;
use bitflags::bitflags;
use std::collections::{HashMap, VecDeque};
use std::fmt;

/// Macro for debug logging, enabled with the debug_merge feature flag
macro_rules! debug_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "debug_merge")]
        {
            eprintln!($($arg)*);
        }
    };
}

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Hash)]
    struct VisitState: u8 {
        const NONE = 0b00;
        const VISITED_FROM_SOURCE = 0b01;
        const VISITED_FROM_TARGET = 0b10;
    }
}

impl fmt::Debug for VisitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut flags = Vec::new();
        if self.contains(VisitState::VISITED_FROM_SOURCE) {
            flags.push("SOURCE");
        }
        if self.contains(VisitState::VISITED_FROM_TARGET) {
            flags.push("TARGET");
        }
        if flags.is_empty() {
            write!(f, "NONE")
        } else {
            write!(f, "{}", flags.join("|"))
        }
    }
}

/// Finds common ancestors between commits
///
/// Generic over a loader function so the traversal works against any
/// commit source (object store, in-memory graph in tests). The loader
/// returns `None` for IDs that do not resolve to a commit; such edges
/// are skipped rather than failing the search.
pub struct AncestorFinder<CommitLoaderFn>
where
    CommitLoaderFn: Fn(&ObjectId) -> anyhow::Result<Option<SlimCommit>>,
{
    commit_loader: CommitLoaderFn,
}

impl<CommitLoaderFn> AncestorFinder<CommitLoaderFn>
where
    CommitLoaderFn: Fn(&ObjectId) -> anyhow::Result<Option<SlimCommit>>,
{
    pub fn new(commit_loader: CommitLoaderFn) -> Self {
        Self { commit_loader }
    }

    /// Find a common ancestor of the two given commits.
    ///
    /// Returns `None` when the commits share no history.
    pub fn find_common_ancestor(
        &self,
        source_commit_id: &ObjectId,
        target_commit_id: &ObjectId,
    ) -> anyhow::Result<Option<ObjectId>> {
        let mut visit_states = HashMap::<ObjectId, VisitState>::new();

        self.collect_ancestors(source_commit_id, &mut visit_states)?;

        debug_log!(
            "Source ancestor set: {}",
            visit_states
                .iter()
                .map(|(oid, state)| format!("{}: {:?}", oid, state))
                .collect::<Vec<_>>()
                .join(", ")
        );

        // Walk the target side breadth-first; the first commit already
        // seen from the source side is the answer.
        let mut queue = VecDeque::new();
        queue.push_back(target_commit_id.clone());

        while let Some(commit_id) = queue.pop_front() {
            let state = visit_states.entry(commit_id.clone()).or_insert(VisitState::NONE);
            if state.contains(VisitState::VISITED_FROM_TARGET) {
                continue;
            }
            *state |= VisitState::VISITED_FROM_TARGET;

            if state.contains(VisitState::VISITED_FROM_SOURCE) {
                debug_log!("Common ancestor found: {}", commit_id);
                return Ok(Some(commit_id));
            }

            if let Some(commit) = (self.commit_loader)(&commit_id)? {
                for parent_id in commit.parents {
                    queue.push_back(parent_id);
                }
            }
        }

        debug_log!(
            "No common ancestor between {} and {}",
            source_commit_id,
            target_commit_id
        );
        Ok(None)
    }

    /// Mark every commit reachable from `start` (inclusive) across all
    /// parent edges as visited from the source side.
    fn collect_ancestors(
        &self,
        start: &ObjectId,
        visit_states: &mut HashMap<ObjectId, VisitState>,
    ) -> anyhow::Result<()> {
        let mut queue = VecDeque::new();
        queue.push_back(start.clone());

        while let Some(commit_id) = queue.pop_front() {
            let state = visit_states.entry(commit_id.clone()).or_insert(VisitState::NONE);
            if state.contains(VisitState::VISITED_FROM_SOURCE) {
                continue;
            }
            *state |= VisitState::VISITED_FROM_SOURCE;

            if let Some(commit) = (self.commit_loader)(&commit_id)? {
                for parent_id in commit.parents {
                    queue.push_back(parent_id);
                }
            }
        }

        Ok(())
    }
}
