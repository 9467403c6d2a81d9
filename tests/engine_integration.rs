//! Integration tests for the engine against real repositories.
//!
//! Each test builds an `origin` repository with git2 in a temp dir, then
//! clones it through its local path the same way a pipeline would clone a
//! hosted remote.

use std::path::Path;

use git2::{Repository, RepositoryInitOptions, Signature};
use tempfile::TempDir;

use refscope::core::changeset::ChangeStatus;
use refscope::core::options::RepoOptions;
use refscope::core::types::RefKind;
use refscope::engine::{EngineError, RefEngine};
use refscope::git::RepoBackend;

/// An upstream repository with a `main` branch.
struct Origin {
    dir: TempDir,
    repo: Repository,
}

impl Origin {
    /// Create an origin whose first commit holds a README and two configs.
    fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let mut init = RepositoryInitOptions::new();
        init.initial_head("main");
        let repo = Repository::init_opts(dir.path(), &init).expect("failed to init origin");

        let origin = Self { dir, repo };
        origin.write("README.md", "# Deploy\n");
        origin.write("components/svc/dev/conf.yaml", "replicas: 1\n");
        origin.write("components/svc/prod/conf.yaml", "replicas: 3\n");
        origin.commit("Initial commit");
        origin
    }

    fn url(&self) -> String {
        self.dir.path().to_string_lossy().into_owned()
    }

    /// Write a file into the worktree and stage it.
    fn write(&self, path: &str, contents: impl AsRef<[u8]>) {
        let full = self.dir.path().join(path);
        std::fs::create_dir_all(full.parent().unwrap()).unwrap();
        std::fs::write(&full, contents).unwrap();

        let mut index = self.repo.index().unwrap();
        index.add_path(Path::new(path)).unwrap();
        index.write().unwrap();
    }

    /// Delete a file from the worktree and unstage it.
    fn remove(&self, path: &str) {
        std::fs::remove_file(self.dir.path().join(path)).unwrap();

        let mut index = self.repo.index().unwrap();
        index.remove_path(Path::new(path)).unwrap();
        index.write().unwrap();
    }

    /// Commit the index onto `main`.
    fn commit(&self, message: &str) -> git2::Oid {
        self.commit_onto(Some("HEAD"), message)
    }

    /// Commit the index on top of `main`, but only point `refname` at it.
    fn commit_to(&self, refname: &str, message: &str) -> git2::Oid {
        self.commit_onto(Some(refname), message)
    }

    fn commit_onto(&self, update_ref: Option<&str>, message: &str) -> git2::Oid {
        let mut index = self.repo.index().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = self.repo.find_tree(tree_id).unwrap();
        let sig = Signature::now("Test User", "test@example.com").unwrap();

        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        self.repo
            .commit(update_ref, &sig, &sig, message, &tree, &parents)
            .unwrap()
    }

    /// Annotated tag on `target`.
    fn tag(&self, name: &str, target: git2::Oid) {
        let object = self.repo.find_object(target, None).unwrap();
        let sig = Signature::now("Test User", "test@example.com").unwrap();
        self.repo.tag(name, &object, &sig, name, false).unwrap();
    }
}

/// A fresh clone of `origin`, plus the temp dir that owns it.
fn clone(origin: &Origin) -> (TempDir, RefEngine) {
    let dir = TempDir::new().expect("failed to create temp dir");
    let options = RepoOptions::new(dir.path().join("work")).with_url(origin.url());
    let engine = RefEngine::ensure_local(&options).expect("failed to clone origin");
    (dir, engine)
}

fn hex(oid: git2::Oid) -> String {
    oid.to_string()
}

// =============================================================================
// Repository Handle
// =============================================================================

mod repository {
    use super::*;

    #[test]
    fn ensure_local_clones_then_opens() {
        let origin = Origin::new();
        let dir = TempDir::new().unwrap();
        let options = RepoOptions::new(dir.path().join("work")).with_url(origin.url());

        let first = RefEngine::ensure_local(&options).unwrap();
        assert!(dir.path().join("work/.git").exists());
        assert!(dir.path().join("work/README.md").exists());
        let head = first.backend().head().unwrap();
        drop(first);

        let second = RefEngine::ensure_local(&options).unwrap();
        assert_eq!(second.backend().head().unwrap(), head);
        assert_eq!(
            head.as_str(),
            hex(origin.repo.head().unwrap().target().unwrap())
        );
    }

    #[test]
    fn open_plain_directory_fails() {
        let dir = TempDir::new().unwrap();
        let err = RefEngine::open(&RepoOptions::new(dir.path())).unwrap_err();
        assert!(matches!(err, EngineError::RepositoryUnavailable { .. }));
    }

    #[test]
    fn clone_from_missing_remote_fails() {
        let dir = TempDir::new().unwrap();
        let options = RepoOptions::new(dir.path().join("work"))
            .with_url(dir.path().join("nowhere").to_string_lossy().into_owned());
        assert!(matches!(
            RefEngine::ensure_local(&options),
            Err(EngineError::RepositoryUnavailable { .. })
        ));
    }
}

// =============================================================================
// Resolution and Checkout
// =============================================================================

mod checkout {
    use super::*;

    #[test]
    fn remote_only_branch() {
        let origin = Origin::new();
        let (_dir, engine) = clone(&origin);

        origin.write("feature.txt", "new\n");
        let tip = origin.commit_to("refs/heads/feature", "Add feature");

        assert!(!engine.classify_local("feature").unwrap().is_found());
        assert!(engine.classify_remote("feature").unwrap().is_branch);

        let reference = engine.checkout("feature").unwrap();
        assert_eq!(reference.kind, RefKind::Branch);
        assert_eq!(reference.oid.as_str(), hex(tip));
        assert_eq!(engine.backend().head().unwrap(), reference.oid);

        // Now known locally
        assert!(engine.classify_local("feature").unwrap().is_branch);
    }

    #[test]
    fn remote_only_tag() {
        let origin = Origin::new();
        let (_dir, engine) = clone(&origin);

        origin.write("release.txt", "1.0\n");
        let tagged = origin.commit_to("refs/heads/release", "Release 1.0");
        origin.tag("v1.0.0", tagged);

        let classification = engine.resolve("v1.0.0").unwrap();
        assert!(classification.is_tag);
        assert!(!classification.is_branch);

        let reference = engine.checkout("v1.0.0").unwrap();
        assert_eq!(reference.kind, RefKind::Tag);
        assert_eq!(reference.oid.as_str(), hex(tagged));
        assert_eq!(engine.backend().head().unwrap(), reference.oid);
    }

    #[test]
    fn commit_hash() {
        let origin = Origin::new();
        let first = origin.repo.head().unwrap().target().unwrap();
        origin.write("README.md", "# Deploy v2\n");
        origin.commit("Second commit");
        let (dir, engine) = clone(&origin);

        let reference = engine.checkout(&hex(first)).unwrap();
        assert_eq!(reference.kind, RefKind::Commit);
        assert_eq!(reference.oid.as_str(), hex(first));

        let readme = std::fs::read_to_string(dir.path().join("work/README.md")).unwrap();
        assert_eq!(readme, "# Deploy\n");
    }

    #[test]
    fn hash_named_branch_wins_over_commit() {
        let origin = Origin::new();
        let first = origin.repo.head().unwrap().target().unwrap();
        origin.write("README.md", "# Deploy v2\n");
        let second = origin.commit("Second commit");
        let (_dir, engine) = clone(&origin);

        // A branch literally named after the first commit, pointing at the second
        let work = Repository::open(engine.backend().work_dir().unwrap()).unwrap();
        let target = work.find_commit(second).unwrap();
        work.branch(&hex(first), &target, false).unwrap();

        let classification = engine.classify_local(&hex(first)).unwrap();
        assert!(classification.is_branch);
        assert!(classification.is_commit);

        let reference = engine.checkout(&hex(first)).unwrap();
        assert_eq!(reference.kind, RefKind::Branch);
        assert_eq!(reference.oid.as_str(), hex(second));
    }

    #[test]
    fn discards_local_modifications() {
        let origin = Origin::new();
        let (dir, engine) = clone(&origin);
        let readme = dir.path().join("work/README.md");
        std::fs::write(&readme, "scribbled\n").unwrap();

        engine.checkout("main").unwrap();
        assert_eq!(std::fs::read_to_string(&readme).unwrap(), "# Deploy\n");
    }

    #[test]
    fn unknown_reference() {
        let origin = Origin::new();
        let (_dir, engine) = clone(&origin);

        assert!(!engine.resolve("does-not-exist").unwrap().is_found());
        assert!(matches!(
            engine.checkout("does-not-exist"),
            Err(EngineError::ReferenceNotFound { .. })
        ));
    }
}

// =============================================================================
// Fetch
// =============================================================================

mod fetch {
    use super::*;

    #[test]
    fn second_fetch_is_up_to_date() {
        let origin = Origin::new();
        let (_dir, engine) = clone(&origin);

        origin.write("README.md", "# Deploy v2\n");
        let tip = origin.commit("Second commit");

        let first = engine.fetch(None).unwrap();
        assert!(!first.is_up_to_date());
        assert_eq!(
            engine
                .resolve_commit("refs/remotes/origin/main")
                .unwrap()
                .as_str(),
            hex(tip)
        );

        let second = engine.fetch(None).unwrap();
        assert!(second.is_up_to_date());
    }
}

// =============================================================================
// Content
// =============================================================================

mod content {
    use super::*;

    #[test]
    fn reads_committed_content_not_worktree() {
        let origin = Origin::new();
        let (dir, engine) = clone(&origin);
        std::fs::write(dir.path().join("work/README.md"), "scribbled\n").unwrap();

        let head = engine.backend().head().unwrap();
        assert_eq!(
            engine
                .file_content_at_commit(head.as_str(), "README.md")
                .unwrap(),
            "# Deploy\n"
        );
        assert_eq!(
            engine.file_content_at_branch("main", "README.md").unwrap(),
            "# Deploy\n"
        );
    }

    #[test]
    fn missing_file_and_branch() {
        let origin = Origin::new();
        let (_dir, engine) = clone(&origin);
        let head = engine.backend().head().unwrap();

        assert!(matches!(
            engine.file_content_at_commit(head.as_str(), "nope.txt"),
            Err(EngineError::FileNotFound { .. })
        ));
        assert!(matches!(
            engine.file_content_at_commit(head.as_str(), "components"),
            Err(EngineError::FileNotFound { .. })
        ));
        assert!(matches!(
            engine.file_content_at_branch("feature", "README.md"),
            Err(EngineError::BranchNotFound { .. })
        ));
    }

    #[test]
    fn binary_file_is_not_text() {
        let origin = Origin::new();
        origin.write("logo.bin", [0xff_u8, 0xfe, 0x00, 0x80]);
        let tip = origin.commit("Add logo");
        let (_dir, engine) = clone(&origin);

        assert!(matches!(
            engine.file_content_at_commit(&hex(tip), "logo.bin"),
            Err(EngineError::InvalidUtf8 { .. })
        ));
        assert_eq!(
            engine.file_bytes_at_commit(&hex(tip), "logo.bin").unwrap(),
            vec![0xff, 0xfe, 0x00, 0x80]
        );
    }
}

// =============================================================================
// Change Sets
// =============================================================================

mod changes {
    use super::*;

    #[test]
    fn same_ref_is_empty() {
        let origin = Origin::new();
        let (_dir, engine) = clone(&origin);
        assert!(engine.changed_files("main", "main").unwrap().is_empty());
        assert!(engine.changed_files("HEAD", "main").unwrap().is_empty());
    }

    #[test]
    fn rename_is_delete_plus_add() {
        let origin = Origin::new();
        let base = origin.repo.head().unwrap().target().unwrap();
        origin.remove("components/svc/prod/conf.yaml");
        origin.write("components/svc/stage/conf.yaml", "replicas: 3\n");
        origin.write("components/svc/dev/conf.yaml", "replicas: 2\n");
        let current = origin.commit("Move prod to stage");
        let (_dir, engine) = clone(&origin);

        let set = engine.change_set(&hex(base), &hex(current)).unwrap();
        let status = |p: &str| set.files().iter().find(|f| f.path == p).map(|f| f.status);
        assert_eq!(set.len(), 3);
        assert_eq!(
            status("components/svc/prod/conf.yaml"),
            Some(ChangeStatus::Deleted)
        );
        assert_eq!(
            status("components/svc/stage/conf.yaml"),
            Some(ChangeStatus::Added)
        );
        assert_eq!(
            status("components/svc/dev/conf.yaml"),
            Some(ChangeStatus::Modified)
        );

        let modified = set
            .files()
            .iter()
            .find(|f| f.path == "components/svc/dev/conf.yaml")
            .unwrap();
        assert_eq!((modified.additions, modified.deletions), (1, 1));
    }

    #[test]
    fn filters_apply_to_real_diffs() {
        let origin = Origin::new();
        let base = origin.repo.head().unwrap().target().unwrap();
        origin.write("components/svc/dev/conf.yaml", "replicas: 2\n");
        origin.write("docs/guide.md", "guide\n");
        let current = origin.commit("Tweak dev");
        let (_dir, engine) = clone(&origin);

        let (base, current) = (hex(base), hex(current));
        assert_eq!(
            engine.changed_files_by_ext(&base, &current, "md").unwrap(),
            vec!["docs/guide.md"]
        );
        assert_eq!(
            engine
                .changed_files_by_name(&base, &current, "conf.yaml")
                .unwrap(),
            vec!["components/svc/dev/conf.yaml"]
        );
        assert!(matches!(
            engine.changed_files_by_regex(&base, &current, "(unclosed"),
            Err(EngineError::InvalidFilter(_))
        ));
    }

    #[test]
    fn pull_request_against_head() {
        let origin = Origin::new();
        let (_dir, engine) = clone(&origin);

        origin.write("components/svc/dev/conf.yaml", "replicas: 5\n");
        origin.commit_to("refs/pull/7/head", "Scale dev");

        assert_eq!(
            engine.changed_files_for_pr(7).unwrap(),
            vec!["components/svc/dev/conf.yaml"]
        );
        assert_eq!(
            engine.changed_conf_files_for_pr(7).unwrap(),
            vec!["components/svc/dev/conf.yaml"]
        );
        assert!(engine
            .changed_files_for_pr_by_ext(7, "md")
            .unwrap()
            .is_empty());
    }
}
