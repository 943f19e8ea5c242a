use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use std::path::{Path, PathBuf};

impl Repository {
    /// Stage paths for the next commit.
    ///
    /// Each path is interpreted relative to the repository root. A
    /// directory (or `.`) stages every file beneath it and additionally
    /// drops staged entries under it whose working-tree files have
    /// vanished. A missing path that is currently tracked stages its
    /// deletion; a missing untracked path is skipped with a warning.
    pub async fn stage(&mut self, paths: &[&str]) -> anyhow::Result<()> {
        let index = self.index();
        let mut index = index.lock().await;

        index.rehydrate()?;

        for path in paths {
            let rel = if *path == "." {
                PathBuf::new()
            } else {
                PathBuf::from(path)
            };
            let full_path = self.workspace().path().join(&rel);

            if full_path.is_dir() {
                let scan_root = if rel.as_os_str().is_empty() {
                    None
                } else {
                    Some(rel.as_path())
                };

                for file in self.workspace().list_files(scan_root)? {
                    let oid = self.store_blob(&file)?;
                    index.add(file, oid);
                }

                // vanished files under the staged path become deletions
                for tracked in index.entries_under_path(&rel) {
                    if !self.workspace().file_exists(&tracked) {
                        index.remove(&tracked);
                    }
                }
            } else if full_path.is_file() {
                let oid = self.store_blob(&rel)?;
                index.add(rel, oid);
            } else if index.is_tracked(&rel) {
                index.remove(&rel);
            } else {
                tracing::warn!("pathspec {:?} matched no files, skipping", rel);
            }
        }

        index.write_updates()?;

        Ok(())
    }

    fn store_blob(&self, path: &Path) -> anyhow::Result<ObjectId> {
        let blob = self.workspace().parse_blob(path)?;
        self.database().store(blob)
    }
}
