//! Ingestion Engine
//!
//! Processes one repository end to end: shallow-fetch the default branch into a
//! scratch repository, walk the tip tree, classify every matching blob and store the
//! labeled ones in the file library. The visited ledger is only updated once the walk
//! has finished.

use std::collections::BTreeMap;
use std::path::PathBuf;

use gix::bstr::ByteSlice;
use gix::objs::tree::EntryKind;

use crate::classify::Classifier;
use crate::core::cleanup::Cleanup;
use crate::core::strings::format_bytes;
use crate::credentials::Credentials;
use crate::ledger::VisitedLedger;
use crate::library::{suggest_label, FileLibrary};
use crate::scanner::error::{ScanError, ScanResult};
use crate::scanner::remote::{self, BranchTip};
use crate::scanner::workspace::ScratchRepository;
use crate::source::RepositoryRecord;

/// Selects tree paths by suffix or glob; an empty filter selects everything
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    suffixes: Vec<String>,
    globs: Vec<glob::Pattern>,
}

impl PathFilter {
    pub fn new(suffixes: Vec<String>, globs: Vec<glob::Pattern>) -> Self {
        Self { suffixes, globs }
    }

    pub fn suffix(suffix: impl Into<String>) -> Self {
        Self::new(vec![suffix.into()], Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.suffixes.is_empty() && self.globs.is_empty()
    }

    pub fn matches(&self, path: &str) -> bool {
        self.is_empty()
            || self.suffixes.iter().any(|s| path.ends_with(s.as_str()))
            || self.globs.iter().any(|g| g.matches(path))
    }
}

/// Per-repository processing options
#[derive(Debug, Clone)]
pub struct IngestSettings {
    pub path_filter: PathFilter,
    /// Appended to stored file names
    pub extension: Option<String>,
    /// Files larger than this are skipped
    pub max_file_size: u64,
    /// Log a line for every stored file
    pub report_files: bool,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            path_filter: PathFilter::suffix(".java"),
            extension: Some(".java".to_string()),
            max_file_size: 10 * 1024 * 1024,
            report_files: true,
        }
    }
}

/// One stored file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredArtifact {
    pub category: String,
    pub tree_path: String,
    pub path: PathBuf,
    pub bytes: u64,
}

/// Totals for one category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryTotals {
    pub files: usize,
    pub bytes: u64,
}

#[derive(Debug, Clone, Default)]
pub struct IngestStats {
    /// Paths that passed the path filter
    pub files_examined: usize,
    /// Files skipped for exceeding the size cap
    pub files_oversized: usize,
    pub stored: Vec<StoredArtifact>,
}

impl IngestStats {
    pub fn matches(&self) -> usize {
        self.stored.len()
    }

    pub fn bytes_stored(&self) -> u64 {
        self.stored.iter().map(|a| a.bytes).sum()
    }

    pub fn by_category(&self) -> BTreeMap<&str, CategoryTotals> {
        let mut totals: BTreeMap<&str, CategoryTotals> = BTreeMap::new();
        for artifact in &self.stored {
            let entry = totals.entry(artifact.category.as_str()).or_default();
            entry.files += 1;
            entry.bytes += artifact.bytes;
        }
        totals
    }
}

#[derive(Debug, Clone)]
pub enum IngestOutcome {
    /// The tip tree was walked to the end
    Completed { branch: String, stats: IngestStats },
    /// Neither default branch exists on the remote
    NoDefaultBranch,
}

impl IngestOutcome {
    pub fn stats(&self) -> Option<&IngestStats> {
        match self {
            IngestOutcome::Completed { stats, .. } => Some(stats),
            IngestOutcome::NoDefaultBranch => None,
        }
    }
}

/// Owns everything needed to turn repositories into library files
#[derive(Debug)]
pub struct Ingestor {
    classifier: Classifier,
    library: FileLibrary,
    ledger: Option<VisitedLedger>,
    settings: IngestSettings,
}

impl Ingestor {
    pub fn new(
        classifier: Classifier,
        library: FileLibrary,
        ledger: Option<VisitedLedger>,
        settings: IngestSettings,
    ) -> Self {
        Self {
            classifier,
            library,
            ledger,
            settings,
        }
    }

    pub fn ledger(&self) -> Option<&VisitedLedger> {
        self.ledger.as_ref()
    }

    /// True if the repository was recorded as visited
    pub fn is_visited(&self, full_name: &str) -> bool {
        self.ledger
            .as_ref()
            .is_some_and(|ledger| ledger.is_ignored(full_name))
    }

    /// Fetch, walk and classify one repository
    ///
    /// The scratch repository is released before returning, whatever the outcome.
    pub fn process(
        &mut self,
        record: &RepositoryRecord,
        credentials: Option<&Credentials>,
    ) -> ScanResult<IngestOutcome> {
        let mut scratch = ScratchRepository::create(credentials)?;
        let outcome = self.process_in(&scratch, record);
        scratch.cleanup();
        outcome
    }

    fn process_in(
        &mut self,
        scratch: &ScratchRepository,
        record: &RepositoryRecord,
    ) -> ScanResult<IngestOutcome> {
        let repo = scratch.repo()?;

        let Some(branch) = remote::default_branch(repo, &record.url)? else {
            log::info!("Default branch of '{}' not found", record.full_name);
            return Ok(IngestOutcome::NoDefaultBranch);
        };
        log::debug!("Using branch '{}' of '{}'", branch.name, record.full_name);

        remote::fetch_shallow(repo, &record.url, &branch)?;
        let stats = self.walk(repo, record, &branch)?;

        if let Some(ledger) = self.ledger.as_mut() {
            if let Err(e) = ledger.record(&record.full_name) {
                log::warn!(
                    "'{}' was processed but could not be recorded in the ledger",
                    record.full_name
                );
                return Err(ScanError::io("Failed to record visited repository", e));
            }
        }

        log::info!(
            "Finished '{}': {} of {} files matched ({})",
            record.full_name,
            stats.matches(),
            stats.files_examined,
            format_bytes(stats.bytes_stored())
        );
        Ok(IngestOutcome::Completed {
            branch: branch.name,
            stats,
        })
    }

    fn walk(
        &mut self,
        repo: &gix::Repository,
        record: &RepositoryRecord,
        branch: &BranchTip,
    ) -> ScanResult<IngestStats> {
        let tree = repo
            .find_object(branch.id)
            .map_err(|e| ScanError::git("Failed to find tip commit", e))?
            .try_into_commit()
            .map_err(|e| ScanError::git("Tip is not a commit", e))?
            .tree()
            .map_err(|e| ScanError::git("Failed to read tip tree", e))?;

        let mut recorder = gix::traverse::tree::Recorder::default();
        tree.traverse()
            .breadthfirst(&mut recorder)
            .map_err(|e| ScanError::git("Failed to walk tree", e))?;

        let mut stats = IngestStats::default();
        for entry in recorder.records {
            if !matches!(entry.mode.kind(), EntryKind::Blob | EntryKind::BlobExecutable) {
                continue;
            }
            let tree_path = entry.filepath.to_str_lossy();
            if !self.settings.path_filter.matches(&tree_path) {
                continue;
            }
            stats.files_examined += 1;

            let blob = repo
                .find_object(entry.oid)
                .map_err(|e| ScanError::git(&format!("Failed to read '{}'", tree_path), e))?;
            if blob.data.len() as u64 > self.settings.max_file_size {
                log::debug!(
                    "Skipping '{}' ({} exceeds the file size limit)",
                    tree_path,
                    format_bytes(blob.data.len() as u64)
                );
                stats.files_oversized += 1;
                continue;
            }

            // Decoded only for classification, the blob is stored as is
            let content = String::from_utf8_lossy(&blob.data);
            let Some(label) = self.classifier.classify(&content) else {
                continue;
            };

            let seed = format!("{} {}", record.full_name, suggest_label(&tree_path));
            let stored = self.library.store(
                label,
                &seed,
                &blob.data,
                self.settings.extension.as_deref(),
            )?;
            if self.settings.report_files {
                log::info!("Found {} -> {}", tree_path, stored.display());
            }

            stats.stored.push(StoredArtifact {
                category: label.to_string(),
                tree_path: tree_path.into_owned(),
                path: stored,
                bytes: blob.data.len() as u64,
            });
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_filter_suffixes_and_globs() {
        let filter = PathFilter::new(
            vec![".java".to_string()],
            vec![glob::Pattern::new("docs/*.md").unwrap()],
        );
        assert!(filter.matches("src/main/java/Foo.java"));
        assert!(filter.matches("docs/readme.md"));
        assert!(!filter.matches("src/Foo.kt"));
        assert!(!filter.matches("Foo.javax"));
    }

    #[test]
    fn test_empty_path_filter_matches_everything() {
        let filter = PathFilter::default();
        assert!(filter.is_empty());
        assert!(filter.matches("anything/at/all"));
    }

    #[test]
    fn test_stats_by_category() {
        let artifact = |category: &str, bytes| StoredArtifact {
            category: category.to_string(),
            tree_path: "x".to_string(),
            path: PathBuf::from("x"),
            bytes,
        };
        let stats = IngestStats {
            files_examined: 5,
            files_oversized: 1,
            stored: vec![
                artifact("Builder", 10),
                artifact("State", 5),
                artifact("Builder", 7),
            ],
        };

        assert_eq!(stats.matches(), 3);
        assert_eq!(stats.bytes_stored(), 22);
        let totals = stats.by_category();
        assert_eq!(totals["Builder"], CategoryTotals { files: 2, bytes: 17 });
        assert_eq!(totals["State"], CategoryTotals { files: 1, bytes: 5 });
    }
}
