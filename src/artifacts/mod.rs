//! Data structures and algorithms
//!
//! - `branch`: Branch names and symbolic ref names
//! - `diff`: Snapshot comparison and positional line diffing
//! - `merge`: Common-ancestor search and three-way tree resolution
//! - `objects`: Object types (blob, tree, commit)
//! - `status`: Working tree / index change classification

pub mod branch;
pub mod diff;
pub mod merge;
pub mod objects;
pub mod status;
