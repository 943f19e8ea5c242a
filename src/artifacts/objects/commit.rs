//! Commit object
//!
//! Commits record a snapshot of the repository at a point in time:
//! - A tree object ID (directory snapshot)
//! - Zero to two parent commit IDs (two for merge commits)
//! - Author and unix timestamp
//! - Commit message
//!
//! ## Format
//!
//! On disk, after the object header:
//! ```text
//! tree <tree-hash>
//! parent <parent-hash>
//! author <name> <email>
//! date <unixSeconds>
//!
//! <commit message>
//! ```

use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use std::io::{BufRead, Write};

/// Name of the environment variable overriding the author name
const AUTHOR_NAME_VAR: &str = "SMK_AUTHOR_NAME";
/// Name of the environment variable overriding the author email
const AUTHOR_EMAIL_VAR: &str = "SMK_AUTHOR_EMAIL";

/// Author information
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    name: String,
    email: String,
}

impl Author {
    pub fn new(name: String, email: String) -> Self {
        Author { name, email }
    }

    /// Load author identity from the environment, falling back to a fixed
    /// local identity when the variables are not set.
    pub fn load_from_env() -> Self {
        let name = std::env::var(AUTHOR_NAME_VAR).unwrap_or_else(|_| "Local User".to_string());
        let email = std::env::var(AUTHOR_EMAIL_VAR).unwrap_or_else(|_| "local@smk".to_string());
        Author { name, email }
    }

    /// Format author for display and serialization: `Name <email>`
    pub fn display_name(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

impl TryFrom<&str> for Author {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        // Format: "name <email>"
        let email_start = value
            .find('<')
            .ok_or_else(|| anyhow::anyhow!("Invalid author format: missing '<'"))?;
        let email_end = value
            .find('>')
            .ok_or_else(|| anyhow::anyhow!("Invalid author format: missing '>'"))?;

        let name = value[..email_start].trim().to_string();
        let email = value[email_start + 1..email_end].to_string();

        Ok(Author { name, email })
    }
}

/// Slim representation of a commit
///
/// Carries only what graph traversals need: the commit's own ID and its
/// parent IDs.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SlimCommit {
    pub oid: ObjectId,
    pub parents: Vec<ObjectId>,
}

/// Commit object
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    /// Parent commit IDs (empty for a root commit, two for a merge commit)
    parents: Vec<ObjectId>,
    /// Tree object ID representing the directory snapshot
    tree_oid: ObjectId,
    author: Author,
    timestamp: chrono::DateTime<chrono::FixedOffset>,
    message: String,
}

impl Commit {
    pub fn new(
        parents: Vec<ObjectId>,
        tree_oid: ObjectId,
        author: Author,
        timestamp: chrono::DateTime<chrono::FixedOffset>,
        message: String,
    ) -> Self {
        Commit {
            parents,
            tree_oid,
            author,
            timestamp,
            message,
        }
    }

    /// Get the first line of the commit message
    pub fn short_message(&self) -> String {
        self.message.lines().next().unwrap_or("").to_string()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn tree_oid(&self) -> &ObjectId {
        &self.tree_oid
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    pub fn parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    pub fn timestamp(&self) -> chrono::DateTime<chrono::FixedOffset> {
        self.timestamp
    }
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut header_lines = vec![];

        header_lines.push(format!("tree {}", self.tree_oid.as_ref()));
        for parent in &self.parents {
            header_lines.push(format!("parent {}", parent.as_ref()));
        }
        header_lines.push(format!("author {}", self.author.display_name()));
        header_lines.push(format!("date {}", self.timestamp.timestamp()));
        header_lines.push(String::new());
        header_lines.push(format!("{}\n", self.message));

        let content_bytes = header_lines.join("\n").into_bytes();

        let mut commit_bytes = Vec::new();
        let header = format!("{}\n{}\n", self.object_type().as_str(), content_bytes.len());
        commit_bytes.write_all(header.as_bytes())?;
        commit_bytes.write_all(&content_bytes)?;

        Ok(Bytes::from(commit_bytes))
    }
}

impl Unpackable for Commit {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let content = reader
            .bytes()
            .collect::<Result<Vec<u8>, std::io::Error>>()?;

        let content = String::from_utf8(content)?;
        let mut lines = content.lines();

        let tree_line = lines
            .next()
            .context("Invalid commit object: missing tree line")?;
        let tree_oid = tree_line
            .strip_prefix("tree ")
            .context("Invalid commit object: invalid tree line")?
            .to_string();
        let tree_oid = ObjectId::try_parse(tree_oid)?;

        // Parse all parent lines (there can be 0, 1 or 2 parents)
        let mut parents = Vec::new();
        let mut next_line = lines
            .next()
            .context("Invalid commit object: missing author line")?;

        while let Some(parent_oid) = next_line.strip_prefix("parent ") {
            parents.push(ObjectId::try_parse(parent_oid.to_string())?);

            next_line = lines
                .next()
                .context("Invalid commit object: missing author line")?;
        }

        let author = next_line
            .strip_prefix("author ")
            .context("Invalid commit object: invalid author line")?;
        let author = Author::try_from(author)?;

        let date_line = lines
            .next()
            .context("Invalid commit object: missing date line")?;
        let seconds = date_line
            .strip_prefix("date ")
            .context("Invalid commit object: invalid date line")?
            .parse::<i64>()
            .context("Invalid commit object: invalid timestamp")?;
        let timestamp = chrono::DateTime::from_timestamp(seconds, 0)
            .context("Invalid commit object: timestamp out of range")?
            .fixed_offset();

        // skip the empty line
        lines.next();

        let message = lines.collect::<Vec<&str>>().join("\n");
        Ok(Self::new(parents, tree_oid, author, timestamp, message))
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }
}
