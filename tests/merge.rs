mod common;

use assert_fs::TempDir;
use common::{
    blob_oid, count_objects, init_repository, read_branch_ref, read_file, read_index_records,
    remove_file, repository_dir, stage_and_commit, write_file,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use smk::artifacts::merge::three_way::ConflictKind;
use smk::operations::merge::MergeOutcome;

/// History:
///       A (master, feat)
///           |
///           B (feat)
///
/// Merging feat into master moves master's ref onto B without creating
/// any new object.
#[rstest]
#[tokio::test]
async fn merge_of_an_ancestor_tip_fast_forwards(repository_dir: TempDir) {
    let mut repository = init_repository(repository_dir.path()).await;

    write_file(repository_dir.path(), "a.txt", "hi");
    stage_and_commit(&mut repository, "A").await;

    repository.create_branch("feat").unwrap();
    repository.checkout("feat").await.unwrap();

    write_file(repository_dir.path(), "a.txt", "bye");
    let feat_tip = stage_and_commit(&mut repository, "B").await;

    repository.checkout("master").await.unwrap();
    assert_eq!(read_file(repository_dir.path(), "a.txt"), "hi");

    let objects_before = count_objects(repository_dir.path());
    let outcome = repository.merge("feat").await.unwrap();

    assert_eq!(
        outcome,
        MergeOutcome::FastForwarded {
            oid: feat_tip.clone()
        }
    );
    // the ref moved, the store did not grow, the tree caught up
    assert_eq!(
        read_branch_ref(repository_dir.path(), "master"),
        feat_tip.as_ref()
    );
    assert_eq!(count_objects(repository_dir.path()), objects_before);
    assert_eq!(read_file(repository_dir.path(), "a.txt"), "bye");
    // the merged branch is untouched
    assert_eq!(
        read_branch_ref(repository_dir.path(), "feat"),
        feat_tip.as_ref()
    );
}

#[rstest]
#[tokio::test]
async fn merging_the_current_commit_is_a_no_op(repository_dir: TempDir) {
    let mut repository = init_repository(repository_dir.path()).await;

    write_file(repository_dir.path(), "a.txt", "hi");
    stage_and_commit(&mut repository, "A").await;
    repository.create_branch("feat").unwrap();

    let outcome = repository.merge("feat").await.unwrap();
    assert_eq!(outcome, MergeOutcome::AlreadyUpToDate);
}

#[rstest]
#[tokio::test]
async fn merging_an_already_contained_branch_is_a_no_op(repository_dir: TempDir) {
    let mut repository = init_repository(repository_dir.path()).await;

    write_file(repository_dir.path(), "a.txt", "hi");
    stage_and_commit(&mut repository, "A").await;
    repository.create_branch("feat").unwrap();

    // master moves ahead of feat
    write_file(repository_dir.path(), "a.txt", "ahead");
    let master_tip = stage_and_commit(&mut repository, "B").await;

    let outcome = repository.merge("feat").await.unwrap();

    assert_eq!(outcome, MergeOutcome::AlreadyUpToDate);
    assert_eq!(
        read_branch_ref(repository_dir.path(), "master"),
        master_tip.as_ref()
    );
}

/// History:
///       A
///      / \
///     B   C      (master modifies left.txt, feat modifies right.txt)
///
/// Disjoint edits reconcile without conflicts into the union of both.
#[rstest]
#[tokio::test]
async fn merge_of_disjoint_edits_creates_a_merge_commit(repository_dir: TempDir) {
    let mut repository = init_repository(repository_dir.path()).await;

    write_file(repository_dir.path(), "left.txt", "initial\n");
    write_file(repository_dir.path(), "right.txt", "initial\n");
    stage_and_commit(&mut repository, "A").await;

    repository.create_branch("feat").unwrap();

    write_file(repository_dir.path(), "left.txt", "initial\nmaster change\n");
    let master_tip = stage_and_commit(&mut repository, "B").await;

    repository.checkout("feat").await.unwrap();
    write_file(repository_dir.path(), "right.txt", "initial\nfeature change\n");
    let feat_tip = stage_and_commit(&mut repository, "C").await;

    repository.checkout("master").await.unwrap();
    let outcome = repository.merge("feat").await.unwrap();

    let MergeOutcome::Merged { oid } = outcome else {
        panic!("expected a merge commit, got {outcome:?}");
    };

    // both edits landed in the working tree
    assert_eq!(
        read_file(repository_dir.path(), "left.txt"),
        "initial\nmaster change\n"
    );
    assert_eq!(
        read_file(repository_dir.path(), "right.txt"),
        "initial\nfeature change\n"
    );

    // exactly two parents, current first
    let merge_commit = repository.show_commit(&oid).unwrap().unwrap();
    assert_eq!(
        merge_commit.parents().to_vec(),
        vec![master_tip, feat_tip.clone()]
    );
    assert_eq!(merge_commit.message(), "Merge branch 'feat'");

    // the current branch advanced, the merged branch did not move
    assert_eq!(
        read_branch_ref(repository_dir.path(), "master"),
        oid.as_ref()
    );
    assert_eq!(
        read_branch_ref(repository_dir.path(), "feat"),
        feat_tip.as_ref()
    );
}

/// History:
///       A          (a.txt = "hi")
///      / \
///     B   C        (master: a.txt = "m", feat: a.txt = "f")
///
/// Diverging edits to the same path conflict: the index holds master's
/// version, no commit is created, both refs stay put.
#[rstest]
#[tokio::test]
async fn merge_of_diverging_edits_conflicts_without_committing(repository_dir: TempDir) {
    let mut repository = init_repository(repository_dir.path()).await;

    write_file(repository_dir.path(), "a.txt", "hi");
    stage_and_commit(&mut repository, "A").await;

    repository.create_branch("feat").unwrap();

    write_file(repository_dir.path(), "a.txt", "m");
    let master_tip = stage_and_commit(&mut repository, "B").await;

    repository.checkout("feat").await.unwrap();
    write_file(repository_dir.path(), "a.txt", "f");
    let feat_tip = stage_and_commit(&mut repository, "C").await;

    repository.checkout("master").await.unwrap();
    let outcome = repository.merge("feat").await.unwrap();

    let MergeOutcome::Conflicted { conflicts } = outcome else {
        panic!("expected a conflict, got {outcome:?}");
    };
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].path.to_string_lossy(), "a.txt");
    assert_eq!(conflicts[0].kind, ConflictKind::BothModified);

    // the provisional tree went to the index only, holding master's side
    let records = read_index_records(repository_dir.path());
    assert_eq!(
        records,
        vec![("a.txt".to_string(), blob_oid("m").as_ref().to_string())]
    );

    // no merge commit, no ref movement, working tree untouched
    assert_eq!(repository.log().unwrap().len(), 2);
    assert_eq!(
        read_branch_ref(repository_dir.path(), "master"),
        master_tip.as_ref()
    );
    assert_eq!(
        read_branch_ref(repository_dir.path(), "feat"),
        feat_tip.as_ref()
    );
    assert_eq!(read_file(repository_dir.path(), "a.txt"), "m");
}

#[rstest]
#[tokio::test]
async fn all_conflicts_are_collected_in_one_pass(repository_dir: TempDir) {
    let mut repository = init_repository(repository_dir.path()).await;

    write_file(repository_dir.path(), "one.txt", "base");
    write_file(repository_dir.path(), "two.txt", "base");
    stage_and_commit(&mut repository, "A").await;

    repository.create_branch("feat").unwrap();

    write_file(repository_dir.path(), "one.txt", "m1");
    write_file(repository_dir.path(), "two.txt", "m2");
    stage_and_commit(&mut repository, "B").await;

    repository.checkout("feat").await.unwrap();
    write_file(repository_dir.path(), "one.txt", "f1");
    write_file(repository_dir.path(), "two.txt", "f2");
    stage_and_commit(&mut repository, "C").await;

    repository.checkout("master").await.unwrap();
    let outcome = repository.merge("feat").await.unwrap();

    let MergeOutcome::Conflicted { conflicts } = outcome else {
        panic!("expected conflicts, got {outcome:?}");
    };
    assert_eq!(conflicts.len(), 2);
}

#[rstest]
#[tokio::test]
async fn modify_against_delete_conflicts_with_the_modified_side_staged(repository_dir: TempDir) {
    let mut repository = init_repository(repository_dir.path()).await;

    write_file(repository_dir.path(), "a.txt", "keep");
    write_file(repository_dir.path(), "b.txt", "base");
    stage_and_commit(&mut repository, "A").await;

    repository.create_branch("feat").unwrap();

    // master deletes b.txt
    remove_file(repository_dir.path(), "b.txt");
    stage_and_commit(&mut repository, "B").await;

    // feat modifies b.txt
    repository.checkout("feat").await.unwrap();
    write_file(repository_dir.path(), "b.txt", "feature edit");
    stage_and_commit(&mut repository, "C").await;

    repository.checkout("master").await.unwrap();
    let outcome = repository.merge("feat").await.unwrap();

    let MergeOutcome::Conflicted { conflicts } = outcome else {
        panic!("expected a conflict, got {outcome:?}");
    };
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].path.to_string_lossy(), "b.txt");
    assert_eq!(
        conflicts[0].kind,
        ConflictKind::DeletedInCurrentModifiedInTarget
    );

    // the surviving side's content is what got staged
    let records = read_index_records(repository_dir.path());
    assert!(records.contains(&(
        "b.txt".to_string(),
        blob_oid("feature edit").as_ref().to_string()
    )));
}

#[rstest]
#[tokio::test]
async fn clean_one_sided_delete_merges_without_conflict(repository_dir: TempDir) {
    let mut repository = init_repository(repository_dir.path()).await;

    write_file(repository_dir.path(), "a.txt", "keep");
    write_file(repository_dir.path(), "b.txt", "base");
    stage_and_commit(&mut repository, "A").await;

    repository.create_branch("feat").unwrap();

    // master edits a.txt only
    write_file(repository_dir.path(), "a.txt", "keep, edited");
    stage_and_commit(&mut repository, "B").await;

    // feat deletes b.txt only
    repository.checkout("feat").await.unwrap();
    remove_file(repository_dir.path(), "b.txt");
    stage_and_commit(&mut repository, "C").await;

    repository.checkout("master").await.unwrap();
    let outcome = repository.merge("feat").await.unwrap();

    let MergeOutcome::Merged { oid } = outcome else {
        panic!("expected a merge commit, got {outcome:?}");
    };

    let merge_commit = repository.show_commit(&oid).unwrap().unwrap();
    let tree = repository
        .database()
        .parse_object_as_tree(merge_commit.tree_oid())
        .unwrap()
        .unwrap();
    assert_eq!(tree.entries().len(), 1);
    assert!(!repository_dir.path().join("b.txt").exists());
    assert_eq!(read_file(repository_dir.path(), "a.txt"), "keep, edited");
}

#[rstest]
#[tokio::test]
async fn merging_an_unknown_branch_fails(repository_dir: TempDir) {
    let mut repository = init_repository(repository_dir.path()).await;

    write_file(repository_dir.path(), "a.txt", "hi");
    stage_and_commit(&mut repository, "A").await;

    assert!(repository.merge("ghost").await.is_err());
}

#[rstest]
#[tokio::test]
async fn merging_without_any_commit_fails(repository_dir: TempDir) {
    let mut repository = init_repository(repository_dir.path()).await;

    assert!(repository.merge("master").await.is_err());
}
