//! Content-addressed object types and operations
//!
//! The store holds three kinds of objects, each identified by the SHA-1
//! hash of its serialized form:
//!
//! - **Blob**: raw file content
//! - **Tree**: a directory snapshot mapping paths to blob hashes
//! - **Commit**: a tree hash plus parents, author, date and message
//!
//! All objects serialize to the same on-disk framing:
//! `<type>\n<byteLength>\n<content>`.

pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tree;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;
