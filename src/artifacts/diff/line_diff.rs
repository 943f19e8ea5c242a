//! Positional line comparison
//!
//! Compares line *i* of the old content against line *i* of the new
//! content: old-only lines emit a removal, new-only lines an addition,
//! and a pair differing at the same index emits a removal followed by an
//! addition.
//!
//! This is an O(lines) positional comparison, not a minimal-edit-script
//! alignment: once an insertion shifts subsequent line indices, every
//! following line reports as changed even when classic diff tools would
//! realign. The approximation is deliberate and cheap.

/// One emitted diff line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffLine {
    /// Line present in the old content only (or replaced)
    Removed(String),
    /// Line present in the new content only (or replacing)
    Added(String),
}

/// Compare two contents line by line at equal indices.
pub fn compare_lines(old: &str, new: &str) -> Vec<DiffLine> {
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();

    let mut diff_lines = Vec::new();
    let max_lines = old_lines.len().max(new_lines.len());

    for i in 0..max_lines {
        let old_line = old_lines.get(i);
        let new_line = new_lines.get(i);

        match (old_line, new_line) {
            (Some(old_line), None) => diff_lines.push(DiffLine::Removed(old_line.to_string())),
            (None, Some(new_line)) => diff_lines.push(DiffLine::Added(new_line.to_string())),
            (Some(old_line), Some(new_line)) if old_line != new_line => {
                diff_lines.push(DiffLine::Removed(old_line.to_string()));
                diff_lines.push(DiffLine::Added(new_line.to_string()));
            }
            _ => {}
        }
    }

    diff_lines
}
