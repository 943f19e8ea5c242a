mod common;

use assert_fs::TempDir;
use common::{init_repository, remove_file, repository_dir, stage_and_commit, write_file};
use pretty_assertions::assert_eq;
use rstest::rstest;
use smk::artifacts::status::file_change::{IndexChange, WorkspaceChange};
use std::path::Path;

#[rstest]
#[tokio::test]
async fn a_fresh_repository_reports_master_with_no_commits_and_a_clean_tree(
    repository_dir: TempDir,
) {
    let repository = init_repository(repository_dir.path()).await;

    let report = repository.status().await.unwrap();

    assert_eq!(
        report.branch.as_ref().map(|branch| branch.as_ref()),
        Some("master")
    );
    assert!(report.head.is_none());
    assert!(report.is_clean());
}

#[rstest]
#[tokio::test]
async fn untracked_files_are_listed(repository_dir: TempDir) {
    let repository = init_repository(repository_dir.path()).await;

    write_file(repository_dir.path(), "a.txt", "hi");

    let report = repository.status().await.unwrap();
    assert!(report.untracked.contains(Path::new("a.txt")));
    assert!(report.staged.is_empty());
}

#[rstest]
#[tokio::test]
async fn staged_new_files_report_as_added(repository_dir: TempDir) {
    let mut repository = init_repository(repository_dir.path()).await;

    write_file(repository_dir.path(), "a.txt", "hi");
    repository.stage(&["."]).await.unwrap();

    let report = repository.status().await.unwrap();
    assert_eq!(
        report.staged.get(Path::new("a.txt")),
        Some(&IndexChange::Added)
    );
    assert!(report.untracked.is_empty());
    assert!(report.unstaged.is_empty());
}

#[rstest]
#[tokio::test]
async fn a_committed_clean_tree_reports_no_changes(repository_dir: TempDir) {
    let mut repository = init_repository(repository_dir.path()).await;

    write_file(repository_dir.path(), "a.txt", "hi");
    let head = stage_and_commit(&mut repository, "first").await;

    let report = repository.status().await.unwrap();

    assert_eq!(report.head, Some(head));
    assert!(report.is_clean());
}

#[rstest]
#[tokio::test]
async fn edits_after_commit_report_as_unstaged_modifications(repository_dir: TempDir) {
    let mut repository = init_repository(repository_dir.path()).await;

    write_file(repository_dir.path(), "a.txt", "hi");
    stage_and_commit(&mut repository, "first").await;

    write_file(repository_dir.path(), "a.txt", "edited");

    let report = repository.status().await.unwrap();
    assert_eq!(
        report.unstaged.get(Path::new("a.txt")),
        Some(&WorkspaceChange::Modified)
    );
    assert!(report.staged.is_empty());
}

#[rstest]
#[tokio::test]
async fn staged_edits_report_as_staged_modifications(repository_dir: TempDir) {
    let mut repository = init_repository(repository_dir.path()).await;

    write_file(repository_dir.path(), "a.txt", "hi");
    stage_and_commit(&mut repository, "first").await;

    write_file(repository_dir.path(), "a.txt", "edited");
    repository.stage(&["a.txt"]).await.unwrap();

    let report = repository.status().await.unwrap();
    assert_eq!(
        report.staged.get(Path::new("a.txt")),
        Some(&IndexChange::Modified)
    );
    assert!(report.unstaged.is_empty());
}

#[rstest]
#[tokio::test]
async fn deleted_working_files_report_as_unstaged_deletions(repository_dir: TempDir) {
    let mut repository = init_repository(repository_dir.path()).await;

    write_file(repository_dir.path(), "a.txt", "hi");
    stage_and_commit(&mut repository, "first").await;

    remove_file(repository_dir.path(), "a.txt");

    let report = repository.status().await.unwrap();
    assert_eq!(
        report.unstaged.get(Path::new("a.txt")),
        Some(&WorkspaceChange::Deleted)
    );
}

#[rstest]
#[tokio::test]
async fn staged_deletions_report_against_head(repository_dir: TempDir) {
    let mut repository = init_repository(repository_dir.path()).await;

    write_file(repository_dir.path(), "a.txt", "hi");
    write_file(repository_dir.path(), "b.txt", "there");
    stage_and_commit(&mut repository, "first").await;

    remove_file(repository_dir.path(), "b.txt");
    repository.stage(&["."]).await.unwrap();

    let report = repository.status().await.unwrap();
    assert_eq!(
        report.staged.get(Path::new("b.txt")),
        Some(&IndexChange::Deleted)
    );
}

#[rstest]
#[tokio::test]
async fn identical_content_everywhere_appears_in_no_category(repository_dir: TempDir) {
    let mut repository = init_repository(repository_dir.path()).await;

    write_file(repository_dir.path(), "same.txt", "stable");
    write_file(repository_dir.path(), "churn.txt", "v1");
    stage_and_commit(&mut repository, "first").await;

    write_file(repository_dir.path(), "churn.txt", "v2");

    let report = repository.status().await.unwrap();

    let same = Path::new("same.txt");
    assert!(!report.staged.contains_key(same));
    assert!(!report.unstaged.contains_key(same));
    assert!(!report.untracked.contains(same));
}
