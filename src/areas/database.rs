//! Object store
//!
//! Content-addressed, append-only persistence for blobs, trees and
//! commits. Objects live as flat files named by their full hash under the
//! `objects` directory, stored exactly in their serialized form
//! `<type>\n<byteLength>\n<content>`.
//!
//! Storing is idempotent: an object whose file already exists is never
//! rewritten, so identical content is persisted once. Objects are never
//! mutated or deleted.

use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::{Commit, SlimCommit};
use crate::artifacts::objects::object::{Object, ObjectBox, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::{Tree, TreeEntries};
use anyhow::Context;
use bytes::Bytes;
use fake::rand;
use std::io::{BufRead, Cursor, Write};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    /// Store an object, returning its ID.
    ///
    /// If an object with the identical serialized form already exists the
    /// existing hash is returned without touching the file.
    pub fn store(&self, object: impl Object) -> anyhow::Result<ObjectId> {
        let object_id = object.object_id()?;
        let object_path = self.path.join(object_id.to_path());

        if !object_path.exists() {
            let object_content = object.serialize()?;
            self.write_object(object_path, object_content)?;
        }

        Ok(object_id)
    }

    /// Parse an object into its tagged representation.
    ///
    /// Returns `None` when no object with the given ID exists; callers
    /// treat absence as "skip gracefully" rather than an error.
    pub fn parse_object(&self, object_id: &ObjectId) -> anyhow::Result<Option<ObjectBox>> {
        let Some((object_type, object_reader)) = self.parse_object_as_bytes(object_id)? else {
            return Ok(None);
        };

        let object = match object_type {
            ObjectType::Blob => ObjectBox::Blob(Box::new(Blob::deserialize(object_reader)?)),
            ObjectType::Tree => ObjectBox::Tree(Box::new(Tree::deserialize(object_reader)?)),
            ObjectType::Commit => ObjectBox::Commit(Box::new(Commit::deserialize(object_reader)?)),
        };

        Ok(Some(object))
    }

    /// Parse an object as a blob; `None` when absent or of another kind.
    pub fn parse_object_as_blob(&self, object_id: &ObjectId) -> anyhow::Result<Option<Blob>> {
        match self.parse_object_as_bytes(object_id)? {
            Some((ObjectType::Blob, object_reader)) => Ok(Some(Blob::deserialize(object_reader)?)),
            _ => Ok(None),
        }
    }

    /// Parse an object as a tree; `None` when absent or of another kind.
    pub fn parse_object_as_tree(&self, object_id: &ObjectId) -> anyhow::Result<Option<Tree>> {
        match self.parse_object_as_bytes(object_id)? {
            Some((ObjectType::Tree, object_reader)) => Ok(Some(Tree::deserialize(object_reader)?)),
            _ => Ok(None),
        }
    }

    /// Parse an object as a commit; `None` when absent or of another kind.
    pub fn parse_object_as_commit(&self, object_id: &ObjectId) -> anyhow::Result<Option<Commit>> {
        match self.parse_object_as_bytes(object_id)? {
            Some((ObjectType::Commit, object_reader)) => {
                Ok(Some(Commit::deserialize(object_reader)?))
            }
            _ => Ok(None),
        }
    }

    /// Load the slim graph view of a commit for history traversals.
    pub fn load_slim_commit(&self, object_id: &ObjectId) -> anyhow::Result<Option<SlimCommit>> {
        Ok(self.parse_object_as_commit(object_id)?.map(|commit| {
            SlimCommit {
                oid: object_id.clone(),
                parents: commit.parents().to_vec(),
            }
        }))
    }

    /// Load the full path -> blob hash mapping of a commit's tree.
    ///
    /// Returns an empty mapping when the commit (or its tree) is absent,
    /// so callers can treat "no snapshot" and "empty snapshot" alike.
    pub fn read_commit_tree(&self, commit_oid: Option<&ObjectId>) -> anyhow::Result<TreeEntries> {
        let Some(commit_oid) = commit_oid else {
            return Ok(TreeEntries::new());
        };

        let Some(commit) = self.parse_object_as_commit(commit_oid)? else {
            return Ok(TreeEntries::new());
        };

        let Some(tree) = self.parse_object_as_tree(commit.tree_oid())? else {
            return Ok(TreeEntries::new());
        };

        Ok(tree.into_entries())
    }

    fn parse_object_as_bytes(
        &self,
        object_id: &ObjectId,
    ) -> anyhow::Result<Option<(ObjectType, impl BufRead)>> {
        let object_path = self.path.join(object_id.to_path());

        let Some(object_content) = self.read_object(object_path)? else {
            return Ok(None);
        };
        let mut object_reader = Cursor::new(object_content);

        let object_type = ObjectType::parse_header(&mut object_reader)?;

        Ok(Some((object_type, object_reader)))
    }

    fn read_object(&self, object_path: PathBuf) -> anyhow::Result<Option<Bytes>> {
        if !object_path.exists() {
            return Ok(None);
        }

        let object_content = std::fs::read(&object_path).context(format!(
            "Unable to read object file {}",
            object_path.display()
        ))?;

        Ok(Some(object_content.into()))
    }

    fn write_object(&self, object_path: PathBuf, object_content: Bytes) -> anyhow::Result<()> {
        let object_dir = object_path
            .parent()
            .context(format!("Invalid object path {}", object_path.display()))?;
        std::fs::create_dir_all(object_dir).context(format!(
            "Unable to create object directory {}",
            object_dir.display()
        ))?;

        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let mut file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_object_path)
            .context(format!(
                "Unable to open object file {}",
                temp_object_path.display()
            ))?;

        file.write_all(&object_content).context(format!(
            "Unable to write object file {}",
            temp_object_path.display()
        ))?;

        // rename the temp file to the object file to make it atomic
        std::fs::rename(&temp_object_path, &object_path).context(format!(
            "Unable to rename object file to {}",
            object_path.display()
        ))?;

        Ok(())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }
}
