//! Diff engine
//!
//! - `line_diff`: positional line-by-line comparison of two contents
//! - `tree_diff`: classification of changed paths between two snapshots

pub mod line_diff;
pub mod tree_diff;
