//! Git repositories built with the git CLI

use reposift::source::RepositoryRecord;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// A non-bare repository in a temporary directory
pub struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    /// Empty repository whose HEAD points at `branch`
    pub fn new(branch: &str) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let repo = Self { dir };
        repo.git(&["init", "--quiet"]);
        repo.git(&["symbolic-ref", "HEAD", &format!("refs/heads/{}", branch)]);
        repo.git(&["config", "user.name", "Test User"]);
        repo.git(&["config", "user.email", "test@example.com"]);
        repo.git(&["config", "commit.gpgsign", "false"]);
        repo
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Local path usable as a fetch URL
    pub fn url(&self) -> String {
        self.path().to_string_lossy().into_owned()
    }

    pub fn record(&self, full_name: &str) -> RepositoryRecord {
        RepositoryRecord::new(full_name, self.url(), None)
    }

    pub fn write(&self, relative: &str, content: &str) -> &Self {
        self.write_bytes(relative, content.as_bytes())
    }

    pub fn write_bytes(&self, relative: &str, content: &[u8]) -> &Self {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
        self
    }

    pub fn commit(&self, message: &str) -> &Self {
        self.git(&["add", "--all"]);
        self.git(&["commit", "--quiet", "-m", message]);
        self
    }

    pub fn checkout_new(&self, branch: &str) -> &Self {
        self.git(&["checkout", "--quiet", "-b", branch]);
        self
    }

    fn git(&self, args: &[&str]) {
        let output = Command::new("git")
            .args(args)
            .current_dir(self.path())
            .output()
            .expect("Failed to run git");
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
}
