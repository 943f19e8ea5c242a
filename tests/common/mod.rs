#![allow(dead_code)]

use assert_fs::TempDir;
use rstest::fixture;
use smk::areas::repository::Repository;
use smk::artifacts::objects::blob::Blob;
use smk::artifacts::objects::object::Object;
use smk::artifacts::objects::object_id::ObjectId;
use smk::operations::commit::CommitOutcome;
use std::path::Path;

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

pub async fn init_repository(dir: &Path) -> Repository {
    let mut repository =
        Repository::new(&dir.to_string_lossy()).expect("Failed to open repository");
    repository
        .init()
        .await
        .expect("Failed to initialize repository");
    repository
}

pub fn write_file(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .unwrap_or_else(|e| panic!("Failed to create directory {:?}: {}", parent, e));
    }
    std::fs::write(&path, content)
        .unwrap_or_else(|e| panic!("Failed to write file {:?}: {}", path, e));
}

pub fn read_file(dir: &Path, rel: &str) -> String {
    std::fs::read_to_string(dir.join(rel))
        .unwrap_or_else(|e| panic!("Failed to read file {:?}: {}", rel, e))
}

pub fn remove_file(dir: &Path, rel: &str) {
    std::fs::remove_file(dir.join(rel))
        .unwrap_or_else(|e| panic!("Failed to remove file {:?}: {}", rel, e));
}

/// Stage the whole working tree and commit it, returning the commit ID.
pub async fn stage_and_commit(repository: &mut Repository, message: &str) -> ObjectId {
    repository.stage(&["."]).await.expect("Failed to stage");
    match repository.commit(message).await.expect("Failed to commit") {
        CommitOutcome::Committed { oid, .. } => oid,
        outcome => panic!("unexpected commit outcome: {outcome:?}"),
    }
}

/// Raw content of a branch ref file, trimmed.
pub fn read_branch_ref(dir: &Path, branch: &str) -> String {
    let path = dir.join(".smk").join("refs").join("heads").join(branch);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read branch ref {:?}: {}", path, e))
        .trim()
        .to_string()
}

/// Raw content of the HEAD file, trimmed.
pub fn read_head_file(dir: &Path) -> String {
    std::fs::read_to_string(dir.join(".smk").join("HEAD"))
        .expect("Failed to read HEAD")
        .trim()
        .to_string()
}

/// Parsed `<path>\t<hash>` records of the on-disk index.
pub fn read_index_records(dir: &Path) -> Vec<(String, String)> {
    let content =
        std::fs::read_to_string(dir.join(".smk").join("index")).expect("Failed to read index");
    content
        .lines()
        .filter_map(|line| {
            line.split_once('\t')
                .map(|(path, hash)| (path.to_string(), hash.to_string()))
        })
        .collect()
}

/// Number of objects persisted in the store.
pub fn count_objects(dir: &Path) -> usize {
    std::fs::read_dir(dir.join(".smk").join("objects"))
        .map(|entries| {
            entries
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.path().is_file())
                .count()
        })
        .unwrap_or(0)
}

/// Hash the given content the way staged blobs are hashed.
pub fn blob_oid(content: &str) -> ObjectId {
    Blob::new(content.to_string())
        .object_id()
        .expect("Failed to hash blob")
}
