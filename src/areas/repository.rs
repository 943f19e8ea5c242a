//! Repository context
//!
//! A `Repository` value owns all shared repository state and is threaded
//! through every operation; there is no global mutable state. Metadata
//! lives under `<root>/.smk/`.

use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::workspace::Workspace;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::TreeEntries;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Name of the repository metadata directory
pub const VCS_DIR: &str = ".smk";

pub struct Repository {
    path: Box<Path>,
    index: Arc<Mutex<Index>>,
    database: Database,
    workspace: Workspace,
    refs: Refs,
}

impl Repository {
    pub fn new(path: &str) -> anyhow::Result<Self> {
        let path = Path::new(path);
        if !path.exists() {
            std::fs::create_dir_all(path)?;
        }
        let path = path.canonicalize()?;

        let index = Index::new(path.join(VCS_DIR).join("index").into_boxed_path());
        let database = Database::new(path.join(VCS_DIR).join("objects").into_boxed_path());
        let workspace = Workspace::new(path.clone().into_boxed_path());
        let refs = Refs::new(path.join(VCS_DIR).into_boxed_path());

        Ok(Repository {
            path: path.into_boxed_path(),
            index: Arc::new(Mutex::new(index)),
            database,
            workspace,
            refs,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn index(&self) -> Arc<Mutex<Index>> {
        self.index.clone()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    /// Snapshot of the tree HEAD points at (empty before the first commit)
    pub fn head_tree(&self) -> anyhow::Result<TreeEntries> {
        let head_oid = self.refs.read_head()?;
        self.database.read_commit_tree(head_oid.as_ref())
    }

    /// Hash of the working-tree copy of a tracked file, if it exists
    pub fn working_file_oid(&self, path: &Path) -> anyhow::Result<Option<ObjectId>> {
        use crate::artifacts::objects::object::Object;

        if !self.workspace.file_exists(path) {
            return Ok(None);
        }

        let blob = self.workspace.parse_blob(path)?;
        Ok(Some(blob.object_id()?))
    }
}
