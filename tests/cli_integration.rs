//! Integration tests for the refscope CLI.
//!
//! These tests run the binary against a working copy cloned from a
//! throwaway origin and check what it prints.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use git2::{Repository, RepositoryInitOptions, Signature};
use predicates::prelude::*;
use tempfile::TempDir;

/// An origin with two commits on `main`, and a place to clone it.
struct Fixture {
    origin: TempDir,
    scratch: TempDir,
    first: String,
    second: String,
}

impl Fixture {
    fn new() -> Self {
        let origin = TempDir::new().expect("failed to create temp dir");
        let mut init = RepositoryInitOptions::new();
        init.initial_head("main");
        let repo = Repository::init_opts(origin.path(), &init).expect("failed to init origin");

        let first = commit(
            &repo,
            &[
                ("README.md", "# Deploy\n"),
                ("components/svc/dev/conf.yaml", "replicas: 1\n"),
            ],
            "Initial commit",
        );
        let second = commit(
            &repo,
            &[
                ("components/svc/dev/conf.yaml", "replicas: 2\n"),
                ("docs/guide.md", "guide\n"),
            ],
            "Scale dev",
        );

        Self {
            origin,
            scratch: TempDir::new().expect("failed to create temp dir"),
            first,
            second,
        }
    }

    fn work(&self) -> PathBuf {
        self.scratch.path().join("work")
    }

    /// `refscope` pointed at this fixture through flags.
    fn refscope(&self) -> Command {
        let mut cmd = refscope(self.scratch.path());
        cmd.arg("--path")
            .arg(self.work())
            .arg("--url")
            .arg(self.origin.path());
        cmd
    }
}

/// `refscope` with no ambient configuration.
fn refscope(cwd: &Path) -> Command {
    let mut cmd = Command::cargo_bin("refscope").unwrap();
    cmd.current_dir(cwd)
        .env_remove("REFSCOPE_TOKEN")
        .env("REFSCOPE_CONFIG", cwd.join("no-such-config.toml"));
    cmd
}

fn commit(repo: &Repository, files: &[(&str, &str)], message: &str) -> String {
    let workdir = repo.workdir().unwrap().to_path_buf();
    let mut index = repo.index().unwrap();
    for (path, contents) in files {
        let full = workdir.join(path);
        std::fs::create_dir_all(full.parent().unwrap()).unwrap();
        std::fs::write(&full, contents).unwrap();
        index.add_path(Path::new(path)).unwrap();
    }
    index.write().unwrap();

    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let sig = Signature::now("Test User", "test@example.com").unwrap();
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap()
        .to_string()
}

#[test]
fn version_flag_works() {
    let dir = TempDir::new().unwrap();
    refscope(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("refscope"));
}

#[test]
fn help_lists_commands() {
    let dir = TempDir::new().unwrap();
    refscope(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("checkout"))
        .stdout(predicate::str::contains("changed"));
}

#[test]
fn head_clones_on_first_use() {
    let fixture = Fixture::new();
    fixture
        .refscope()
        .arg("head")
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("{}\n", fixture.second)));
    assert!(fixture.work().join(".git").exists());
}

#[test]
fn resolve_branch_and_commit() {
    let fixture = Fixture::new();
    fixture
        .refscope()
        .args(["resolve", "main"])
        .assert()
        .success()
        .stdout(predicate::str::contains("branch: true"))
        .stdout(predicate::str::contains("kind: branch"));

    fixture
        .refscope()
        .args(["resolve", "--local", &fixture.first])
        .assert()
        .success()
        .stdout(predicate::str::contains("commit: true"))
        .stdout(predicate::str::contains(format!("oid: {}", fixture.first)));
}

#[test]
fn checkout_and_show() {
    let fixture = Fixture::new();
    fixture
        .refscope()
        .args(["checkout", &fixture.first])
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("commit {}\n", fixture.first)));

    fixture
        .refscope()
        .args(["show", "components/svc/dev/conf.yaml", "--branch", "main"])
        .assert()
        .success()
        .stdout(predicate::str::diff("replicas: 2\n"));

    fixture
        .refscope()
        .args(["show", "components/svc/dev/conf.yaml", "--commit", &fixture.first])
        .assert()
        .success()
        .stdout(predicate::str::diff("replicas: 1\n"));
}

#[test]
fn checkout_unknown_reference_fails() {
    let fixture = Fixture::new();
    fixture
        .refscope()
        .args(["checkout", "no-such-thing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("reference not found"));
}

#[test]
fn changed_between_commits() {
    let fixture = Fixture::new();
    fixture
        .refscope()
        .args(["changed", "--base", &fixture.first, "--current", &fixture.second])
        .args(["--name", "conf.yaml", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"components/svc/dev/conf.yaml\""))
        .stdout(predicate::str::contains("guide.md").not());

    fixture
        .refscope()
        .args(["changed", "--base", &fixture.first, "--current", &fixture.second])
        .arg("--stat")
        .assert()
        .success()
        .stdout(predicate::str::contains("A\t+1\t-0\tdocs/guide.md"))
        .stdout(predicate::str::contains(
            "M\t+1\t-1\tcomponents/svc/dev/conf.yaml",
        ));
}

#[test]
fn invalid_regex_fails_before_cloning() {
    let fixture = Fixture::new();
    fixture
        .refscope()
        .args(["changed", "--base", "main", "--current", "main", "--regex", "(oops"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid filter"));
    assert!(!fixture.work().exists());
}

#[test]
fn repository_from_config_file() {
    let fixture = Fixture::new();
    let config = fixture.scratch.path().join("refscope.toml");
    std::fs::write(
        &config,
        format!(
            "[repository]\npath = {:?}\nurl = {:?}\n",
            fixture.work().to_string_lossy(),
            fixture.origin.path().to_string_lossy()
        ),
    )
    .unwrap();

    refscope(fixture.scratch.path())
        .arg("--config")
        .arg(&config)
        .arg("head")
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("{}\n", fixture.second)));
}

#[test]
fn unknown_config_key_is_rejected() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("refscope.toml");
    std::fs::write(&config, "[repository]\ntoken = \"secret\"\n").unwrap();

    refscope(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("head")
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration"));
}
