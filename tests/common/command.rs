use crate::common::file::{FileSpec, write_file};
use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

/// Fixed clock for commits made through `gitlet_commit`; parent clamping keeps
/// successive commits strictly ordered
pub const COMMIT_DATE: &str = "2023-01-01 12:00:00 +0000";

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

/// Repository with `1.txt`, `a/2.txt` and `a/b/3.txt` committed on master
#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_gitlet_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    let files = [
        ("1.txt", "one"),
        ("a/2.txt", "two"),
        ("a/b/3.txt", "three"),
    ];
    for (path, content) in files {
        write_file(FileSpec::new(
            repository_dir.path().join(path),
            content.to_string(),
        ));
        run_gitlet_command(repository_dir.path(), &["add", path])
            .assert()
            .success();
    }

    gitlet_commit(repository_dir.path(), "Initial files")
        .assert()
        .success();

    repository_dir
}

pub fn run_gitlet_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("gitlet").expect("Failed to find gitlet binary");
    cmd.envs(vec![("NO_PAGER", "1"), ("NO_COLOR", "1")]);
    cmd.env_remove("GITLET_LOG");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

pub fn gitlet_commit(dir: &Path, message: &str) -> Command {
    let mut cmd = run_gitlet_command(dir, &["commit", message]);
    cmd.env("GITLET_COMMIT_DATE", COMMIT_DATE);
    cmd
}

/// Write each file, stage it and commit the lot
pub fn commit_files(dir: &Path, files: &[(&str, &str)], message: &str) {
    for (path, content) in files {
        write_file(FileSpec::new(dir.join(path), content.to_string()));
        run_gitlet_command(dir, &["add", path]).assert().success();
    }

    gitlet_commit(dir, message).assert().success();
}

/// Stage the removal of each path and commit
pub fn commit_removals(dir: &Path, paths: &[&str], message: &str) {
    for path in paths {
        run_gitlet_command(dir, &["rm", path]).assert().success();
    }

    gitlet_commit(dir, message).assert().success();
}

pub fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().expect("Failed to run gitlet");
    assert!(
        output.status.success(),
        "gitlet exited with {:?}: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );

    String::from_utf8(output.stdout).expect("gitlet printed invalid UTF-8")
}

/// Current head of `branch`, read straight from the branch file
pub fn branch_head(dir: &Path, branch: &str) -> String {
    let branch_path = dir.join(".gitlet").join("refs").join("heads").join(branch);
    std::fs::read_to_string(&branch_path)
        .unwrap_or_else(|e| panic!("Failed to read branch {branch}: {e}"))
        .trim()
        .to_string()
}

/// Commit ids printed by `log`, newest first
pub fn log_ids(dir: &Path) -> Vec<String> {
    stdout_of(&mut run_gitlet_command(dir, &["log"]))
        .lines()
        .filter_map(|line| line.strip_prefix("commit "))
        .map(str::to_string)
        .collect()
}

/// Commit messages printed by `log`, newest first
pub fn log_messages(dir: &Path) -> Vec<String> {
    let log = stdout_of(&mut run_gitlet_command(dir, &["log"]));
    let lines = log.lines().collect::<Vec<_>>();

    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.starts_with("Date: "))
        .filter_map(|(i, _)| lines.get(i + 1).map(|message| message.to_string()))
        .collect()
}
