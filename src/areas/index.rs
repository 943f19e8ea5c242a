//! Index (staging area)
//!
//! The index is the path -> blob hash mapping describing what the next
//! commit will contain. It is persisted as newline-separated
//! `<path><TAB><blobHash>` records; a missing or empty file is an empty
//! index, never an error.
//!
//! The mapping is kept ordered by path so the index and the tree built
//! from it agree on a canonical entry order.

use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::TreeEntries;
use anyhow::Context;
use file_guard::Lock;
use std::io::{Read, Write};
use std::ops::DerefMut;
use std::path::{Path, PathBuf};

/// Staging area tracking files for the next commit
#[derive(Debug, Clone)]
pub struct Index {
    /// Path to the index file
    path: Box<Path>,
    /// Tracked files mapped by path
    entries: TreeEntries,
    /// Flag indicating if the index has been modified since loading
    changed: bool,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            entries: TreeEntries::new(),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_tracked(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load the index from disk.
    ///
    /// Missing file or empty content both yield an empty index; malformed
    /// records are skipped.
    ///
    /// # Locking
    ///
    /// Acquires a shared lock on the index file during reading.
    pub fn rehydrate(&mut self) -> anyhow::Result<()> {
        self.entries.clear();
        self.changed = false;

        if !self.path.exists() {
            // create the index file
            std::fs::File::create(self.path())?;
            return Ok(());
        }

        let mut index_file = std::fs::OpenOptions::new().read(true).open(self.path())?;
        let mut lock = file_guard::lock(&mut index_file, Lock::Shared, 0, 1)?;

        let mut content = String::new();
        lock.deref_mut().read_to_string(&mut content)?;

        for line in content.lines() {
            if line.is_empty() {
                continue;
            }
            let Some((path, hash)) = line.split_once('\t') else {
                continue;
            };
            let Ok(oid) = ObjectId::try_parse(hash.to_string()) else {
                continue;
            };

            self.entries.insert(PathBuf::from(path), oid);
        }

        Ok(())
    }

    /// Upsert a staged entry
    pub fn add(&mut self, path: PathBuf, oid: ObjectId) {
        self.entries.insert(path, oid);
        self.changed = true;
    }

    pub fn remove(&mut self, path: &Path) {
        if self.entries.remove(path).is_some() {
            self.changed = true;
        }
    }

    /// Empty the mapping (invoked after a successful commit)
    pub fn clear(&mut self) {
        self.entries.clear();
        self.changed = true;
    }

    /// Replace the whole mapping with a tree snapshot (checkout, merge)
    pub fn replace(&mut self, entries: TreeEntries) {
        self.entries = entries;
        self.changed = true;
    }

    /// Persist the current mapping.
    ///
    /// # Locking
    ///
    /// Acquires an exclusive lock on the index file during writing.
    pub fn write_updates(&mut self) -> anyhow::Result<()> {
        let mut index_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.path())
            .with_context(|| format!("failed to open index file at {:?}", self.path))?;
        let mut lock = file_guard::lock(&mut index_file, Lock::Exclusive, 0, 1)?;

        let mut content = String::new();
        for (path, oid) in &self.entries {
            content.push_str(&format!("{}\t{}\n", path.display(), oid.as_ref()));
        }

        lock.deref_mut().write_all(content.as_bytes())?;
        self.changed = false;

        Ok(())
    }

    pub fn entries(&self) -> impl Iterator<Item = (&PathBuf, &ObjectId)> {
        self.entries.iter()
    }

    /// Snapshot of the full mapping
    pub fn as_tree_entries(&self) -> TreeEntries {
        self.entries.clone()
    }

    /// All staged paths at or under the given path
    pub fn entries_under_path(&self, path: &Path) -> Vec<PathBuf> {
        self.entries
            .keys()
            .filter(|entry_path| {
                if path == Path::new("") || path == Path::new(".") {
                    return true;
                }
                entry_path.starts_with(path)
            })
            .map(|p| p.to_path_buf())
            .collect()
    }
}
