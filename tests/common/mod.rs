//! Common test utilities and helpers
//!
//! Fixture repositories are built with the `git` command line tool inside temporary
//! directories and ingested through their local paths.

#![allow(dead_code)]

pub mod fixtures;
pub mod repo_builder;

use reposift::classify::catalog::{default_admission, default_test_keywords, design_patterns};
use reposift::classify::Classifier;
use reposift::ledger::VisitedLedger;
use reposift::library::FileLibrary;
use reposift::scanner::{IngestSettings, Ingestor};
use std::path::{Path, PathBuf};

pub const LEDGER_KEY: &str = "ignored repositories";

/// The built-in catalog behind the default test-file admission filter
pub fn default_classifier() -> Classifier {
    Classifier::from_specs(
        Some(&default_admission(&default_test_keywords())),
        &design_patterns(),
        None,
    )
    .expect("built-in catalog compiles")
}

/// Ingestor writing into `root`, with a ledger at the standard location
pub fn ingestor_at(root: &Path, settings: IngestSettings) -> Ingestor {
    let library = FileLibrary::open(root).expect("open library");
    let ledger = VisitedLedger::open(library.locate(LEDGER_KEY, "txt")).expect("open ledger");
    Ingestor::new(default_classifier(), library, Some(ledger), settings)
}

/// Regular files directly inside `dir`, sorted
pub fn files_in(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    files
}

/// Category directories created under the library root, sorted
pub fn categories_in(root: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(root) else {
        return Vec::new();
    };
    let mut dirs: Vec<String> = entries
        .filter_map(Result::ok)
        .filter(|e| e.path().is_dir())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    dirs.sort();
    dirs
}

/// Lines of the ledger file under `root`
pub fn ledger_lines(root: &Path) -> Vec<String> {
    let library = FileLibrary::open(root).expect("open library");
    std::fs::read_to_string(library.locate(LEDGER_KEY, "txt"))
        .map(|text| text.lines().map(str::to_string).collect())
        .unwrap_or_default()
}
