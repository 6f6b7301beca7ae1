use crate::common::command::{
    branch_head, commit_files, commit_removals, init_repository_dir, log_ids, log_messages,
    run_gitlet_command, stdout_of,
};
use crate::common::file::{FileSpec, read_file, write_file};
use assert_fs::TempDir;
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::path::Path;

mod common;

const CONFLICT_NOTICE: &str = "Encountered a merge conflict.\n";

fn start_feature_branch(dir: &Path) {
    run_gitlet_command(dir, &["branch", "feature"])
        .assert()
        .success();
    run_gitlet_command(dir, &["checkout", "feature"])
        .assert()
        .success();
}

fn switch_to(dir: &Path, branch: &str) {
    run_gitlet_command(dir, &["checkout", branch])
        .assert()
        .success();
}

#[rstest]
fn merge_fast_forwards_when_active_is_behind(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();

    start_feature_branch(dir);
    commit_files(dir, &[("1.txt", "feature one")], "Feature one");
    commit_files(dir, &[("new.txt", "new")], "Feature new");
    let feature_head = branch_head(dir, "feature");
    switch_to(dir, "master");

    run_gitlet_command(dir, &["merge", "feature"])
        .assert()
        .success()
        .stdout("Current branch fast-forwarded.\n");

    assert_eq!(branch_head(dir, "master"), feature_head);
    assert_eq!(read_file(&dir.join("1.txt")), "feature one");
    assert_eq!(read_file(&dir.join("new.txt")), "new");
    assert_eq!(
        log_messages(dir),
        vec!["Feature new", "Feature one", "Initial files", "initial commit"]
    );

    Ok(())
}

#[rstest]
fn merging_an_ancestor_changes_nothing(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();

    run_gitlet_command(dir, &["branch", "old"])
        .assert()
        .success();
    commit_files(dir, &[("1.txt", "newer one")], "Move on");
    let master_head = branch_head(dir, "master");

    run_gitlet_command(dir, &["merge", "old"])
        .assert()
        .success()
        .stdout("Given branch is an ancestor of the current branch.\n");

    assert_eq!(branch_head(dir, "master"), master_head);
    assert_eq!(read_file(&dir.join("1.txt")), "newer one");

    Ok(())
}

#[rstest]
fn merge_preconditions(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();

    run_gitlet_command(dir, &["merge", "master"])
        .assert()
        .success()
        .stdout("Cannot merge a branch with itself.\n");
    run_gitlet_command(dir, &["merge", "ghost"])
        .assert()
        .success()
        .stdout("A branch with that name does not exist.\n");

    write_file(FileSpec::new(dir.join("draft.txt"), "draft".to_string()));
    run_gitlet_command(dir, &["add", "draft.txt"])
        .assert()
        .success();

    // a dirty staging area is reported before anything else
    run_gitlet_command(dir, &["merge", "ghost"])
        .assert()
        .success()
        .stdout("You have uncommitted changes.\n");
    run_gitlet_command(dir, &["merge", "master"])
        .assert()
        .success()
        .stdout("You have uncommitted changes.\n");

    Ok(())
}

#[rstest]
fn untracked_file_in_the_way_aborts_merge(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();

    start_feature_branch(dir);
    commit_files(dir, &[("clash.txt", "from feature")], "Feature clash");
    switch_to(dir, "master");
    commit_files(dir, &[("1.txt", "master one")], "Master one");
    let master_head = branch_head(dir, "master");

    write_file(FileSpec::new(dir.join("clash.txt"), "local".to_string()));

    run_gitlet_command(dir, &["merge", "feature"])
        .assert()
        .success()
        .stdout(
            "There is an untracked file in the way; delete it, or add and commit it first.\n",
        );

    assert_eq!(branch_head(dir, "master"), master_head);
    assert_eq!(read_file(&dir.join("clash.txt")), "local");

    Ok(())
}

#[rstest]
fn clean_three_way_merge_combines_both_sides(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();

    start_feature_branch(dir);
    commit_files(
        dir,
        &[("a/2.txt", "feature two"), ("feature.txt", "f")],
        "Feature changes",
    );
    commit_removals(dir, &["a/b/3.txt"], "Feature drops three");
    let feature_head = branch_head(dir, "feature");

    switch_to(dir, "master");
    commit_files(dir, &[("1.txt", "master one")], "Master changes");
    let master_head = branch_head(dir, "master");

    run_gitlet_command(dir, &["merge", "feature"])
        .assert()
        .success()
        .stdout("");

    assert_eq!(read_file(&dir.join("1.txt")), "master one");
    assert_eq!(read_file(&dir.join("a/2.txt")), "feature two");
    assert_eq!(read_file(&dir.join("feature.txt")), "f");
    assert!(!dir.join("a/b/3.txt").exists());

    let ids = log_ids(dir);
    assert_eq!(ids.len(), 4);
    assert_eq!(ids[1], master_head);
    assert!(!ids.contains(&feature_head));

    let log = stdout_of(&mut run_gitlet_command(dir, &["log"]));
    let merge_entry = log.split("\n\n").next().unwrap_or_default();
    assert!(merge_entry.contains(&format!(
        "\nMerge: {} {}\n",
        &master_head[..7],
        &feature_head[..7]
    )));
    assert!(merge_entry.ends_with("\nMerged feature into master."));

    let status = stdout_of(&mut run_gitlet_command(dir, &["status"]));
    assert!(status.contains("=== Staged Files ===\n\n=== Removed Files ===\n\n"));

    Ok(())
}

#[rstest]
fn conflicting_changes_are_materialized_and_committed(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();

    start_feature_branch(dir);
    commit_files(dir, &[("1.txt", "feature one\n")], "Feature edits one");
    let feature_head = branch_head(dir, "feature");

    switch_to(dir, "master");
    commit_files(dir, &[("1.txt", "master one")], "Master edits one");

    run_gitlet_command(dir, &["merge", "feature"])
        .assert()
        .success()
        .stdout(CONFLICT_NOTICE);

    assert_eq!(
        read_file(&dir.join("1.txt")),
        "<<<<<<< HEAD\nmaster one\n=======\nfeature one\n>>>>>>>\n"
    );
    assert_eq!(
        log_messages(dir),
        vec![
            "Merged feature into master.",
            "Master edits one",
            "Initial files",
            "initial commit"
        ]
    );

    // the conflicted content is what got committed
    let status = stdout_of(&mut run_gitlet_command(dir, &["status"]));
    assert!(status.contains("=== Modifications Not Staged For Commit ===\n\n"));
    assert_eq!(branch_head(dir, "feature"), feature_head);

    Ok(())
}

#[rstest]
fn modified_on_one_side_deleted_on_the_other_conflicts(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();

    start_feature_branch(dir);
    commit_files(dir, &[("1.txt", "feature one")], "Feature keeps one");

    switch_to(dir, "master");
    commit_removals(dir, &["1.txt"], "Master drops one");

    run_gitlet_command(dir, &["merge", "feature"])
        .assert()
        .success()
        .stdout(CONFLICT_NOTICE);

    assert_eq!(
        read_file(&dir.join("1.txt")),
        "<<<<<<< HEAD\n=======\nfeature one\n>>>>>>>\n"
    );

    Ok(())
}

#[rstest]
fn repeated_merge_uses_the_previous_merge_as_split_point(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();

    start_feature_branch(dir);
    commit_files(dir, &[("1.txt", "feature one")], "Feature round one");

    switch_to(dir, "master");
    commit_files(dir, &[("a/2.txt", "master two")], "Master round one");
    run_gitlet_command(dir, &["merge", "feature"])
        .assert()
        .success()
        .stdout("");
    assert_eq!(read_file(&dir.join("1.txt")), "feature one");

    switch_to(dir, "feature");
    commit_files(dir, &[("1.txt", "feature one, again")], "Feature round two");

    switch_to(dir, "master");
    commit_files(dir, &[("a/b/3.txt", "master three")], "Master round two");

    // against the original base both sides touched 1.txt; against the
    // previous merge only the feature side did
    run_gitlet_command(dir, &["merge", "feature"])
        .assert()
        .success()
        .stdout("");

    assert_eq!(read_file(&dir.join("1.txt")), "feature one, again");
    assert_eq!(read_file(&dir.join("a/2.txt")), "master two");
    assert_eq!(read_file(&dir.join("a/b/3.txt")), "master three");
    assert_eq!(log_messages(dir)[0], "Merged feature into master.");

    Ok(())
}

#[rstest]
fn feature_branch_fast_forwards_onto_a_merge_commit(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();

    start_feature_branch(dir);
    commit_files(dir, &[("feature.txt", "f")], "Feature side");
    switch_to(dir, "master");
    commit_files(dir, &[("master.txt", "m")], "Master side");
    run_gitlet_command(dir, &["merge", "feature"])
        .assert()
        .success();
    let merge_head = branch_head(dir, "master");

    // the merged branch reaches master only through the second parent
    switch_to(dir, "feature");
    run_gitlet_command(dir, &["merge", "master"])
        .assert()
        .success()
        .stdout("Current branch fast-forwarded.\n");

    assert_eq!(branch_head(dir, "feature"), merge_head);
    assert_eq!(read_file(&dir.join("master.txt")), "m");

    Ok(())
}
