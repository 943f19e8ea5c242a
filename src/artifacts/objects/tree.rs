//! Tree object
//!
//! Trees are directory snapshots: an ordered mapping of file paths to
//! blob hashes. Entries are kept sorted by path so that two logically
//! identical trees always serialize to the same bytes and therefore hash
//! identically, regardless of the order entries were inserted in.
//!
//! On disk each entry is one `<path><TAB><blobHash>` line.

use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Ordered path -> blob hash mapping shared by trees and the index
pub type TreeEntries = BTreeMap<PathBuf, ObjectId>;

/// Tree object representing a directory snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    entries: TreeEntries,
}

impl Tree {
    pub fn new(entries: TreeEntries) -> Self {
        Tree { entries }
    }

    pub fn entries(&self) -> &TreeEntries {
        &self.entries
    }

    pub fn into_entries(self) -> TreeEntries {
        self.entries
    }
}

impl Packable for Tree {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut content_bytes = Vec::new();
        for (path, oid) in &self.entries {
            let line = format!("{}\t{}\n", path.display(), oid.as_ref());
            content_bytes.write_all(line.as_bytes())?;
        }

        let mut tree_bytes = Vec::new();
        let header = format!("{}\n{}\n", self.object_type().as_str(), content_bytes.len());
        tree_bytes.write_all(header.as_bytes())?;
        tree_bytes.write_all(&content_bytes)?;

        Ok(Bytes::from(tree_bytes))
    }
}

impl Unpackable for Tree {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let mut entries = BTreeMap::new();

        for line in reader.lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }

            // malformed lines are skipped rather than failing the object
            let Some((path, oid)) = line.split_once('\t') else {
                continue;
            };
            if path.is_empty() {
                continue;
            }
            let Ok(oid) = ObjectId::try_parse(oid.to_string()) else {
                continue;
            };

            entries.insert(PathBuf::from(path), oid);
        }

        Ok(Tree { entries })
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn oid_of(byte: char) -> ObjectId {
        ObjectId::try_parse(byte.to_string().repeat(40)).unwrap()
    }

    #[test]
    fn insertion_order_does_not_change_the_hash() {
        let mut forward = TreeEntries::new();
        forward.insert(PathBuf::from("a.txt"), oid_of('a'));
        forward.insert(PathBuf::from("b.txt"), oid_of('b'));
        forward.insert(PathBuf::from("dir/c.txt"), oid_of('c'));

        let mut backward = TreeEntries::new();
        backward.insert(PathBuf::from("dir/c.txt"), oid_of('c'));
        backward.insert(PathBuf::from("b.txt"), oid_of('b'));
        backward.insert(PathBuf::from("a.txt"), oid_of('a'));

        let forward = Tree::new(forward);
        let backward = Tree::new(backward);

        assert_eq!(
            forward.object_id().unwrap(),
            backward.object_id().unwrap()
        );
    }

    #[test]
    fn deserialize_skips_malformed_lines() {
        let oid = oid_of('d');
        let content = format!("no-tab-here\n\na.txt\t{}\nb.txt\tnot-a-hash\n", oid);
        let tree = Tree::deserialize(Cursor::new(content.into_bytes())).unwrap();

        assert_eq!(tree.entries().len(), 1);
        assert_eq!(tree.entries().get(&PathBuf::from("a.txt")), Some(&oid));
    }
}
