//! Working tree status classification

pub mod file_change;
