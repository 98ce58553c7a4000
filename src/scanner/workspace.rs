//! Scratch Repository
//!
//! A bare object store in a private temporary directory, alive for the processing
//! of one repository. The repository handle and the directory are released
//! independently on every exit path.

use std::path::Path;

use tempfile::TempDir;

use crate::core::cleanup::{release_step, Cleanup};
use crate::credentials::Credentials;
use crate::scanner::error::{ScanError, ScanResult};

const TEMP_PREFIX: &str = "reposift-";

#[derive(Debug)]
pub struct ScratchRepository {
    repo: Option<gix::Repository>,
    dir: Option<TempDir>,
}

impl ScratchRepository {
    /// Initialise an empty bare repository in a fresh temporary directory
    ///
    /// With credentials, every HTTP request made through the repository carries them
    /// as an `Authorization` header.
    pub fn create(credentials: Option<&Credentials>) -> ScanResult<Self> {
        let dir = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempdir()
            .map_err(|e| ScanError::io("Failed to create scratch directory", e))?;

        gix::init_bare(dir.path())
            .map_err(|e| ScanError::git("Failed to initialise scratch repository", e))?;

        let repo = gix::open_opts(
            dir.path(),
            gix::open::Options::isolated().config_overrides(config_overrides(credentials)),
        )
        .map_err(|e| ScanError::git("Failed to open scratch repository", e))?;

        log::trace!("Scratch repository at '{}'", dir.path().display());
        Ok(Self {
            repo: Some(repo),
            dir: Some(dir),
        })
    }

    pub fn repo(&self) -> ScanResult<&gix::Repository> {
        self.repo.as_ref().ok_or_else(|| ScanError::Git {
            message: "Scratch repository already released".to_string(),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.dir.as_ref().map(TempDir::path)
    }
}

fn config_overrides(credentials: Option<&Credentials>) -> Vec<String> {
    // Local paths are fetched through the file protocol
    let mut overrides = vec!["protocol.file.allow=always".to_string()];
    if let Some(credentials) = credentials {
        overrides.push(format!(
            "http.extraHeader=Authorization: {}",
            credentials.authorization()
        ));
    }
    overrides
}

impl Cleanup for ScratchRepository {
    fn cleanup(&mut self) {
        if let Some(repo) = self.repo.take() {
            release_step("repository handle", || {
                drop(repo);
                Ok::<(), std::convert::Infallible>(())
            });
        }
        if let Some(dir) = self.dir.take() {
            let shown = dir.path().display().to_string();
            release_step(&format!("scratch directory '{}'", shown), || dir.close());
        }
    }
}

impl Drop for ScratchRepository {
    fn drop(&mut self) {
        self.cleanup();
    }
}
