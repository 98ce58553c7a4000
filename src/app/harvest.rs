//! Run loop
//!
//! Drains the repository sources in order and hands each record to the [`Ingestor`].
//! Per-repository failures are logged and the run moves on. Only an authentication
//! failure from a source ends the run early.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{DateTime, Local};
use prettytable::{format, Cell, Row, Table};

use crate::core::strings::{format_bytes, plural};
use crate::core::styles::StyleRole;
use crate::core::time::{format_elapsed, format_timestamp, now_timestamp};
use crate::credentials::Credentials;
use crate::scanner::{CategoryTotals, IngestOutcome, Ingestor};
use crate::source::{RepositoryRecord, RepositorySource, SourceResult};

/// Limits applied before a repository is fetched
#[derive(Debug, Clone, Copy)]
pub struct HarvestLimits {
    pub max_repository_size: u64,
    /// Repositories attempted across all sources, not counting visited ones
    pub repository_limit: Option<usize>,
}

impl Default for HarvestLimits {
    fn default() -> Self {
        Self {
            max_repository_size: 1 << 30,
            repository_limit: None,
        }
    }
}

/// What happened during one run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started: DateTime<Local>,
    pub finished: DateTime<Local>,
    pub attempted: usize,
    pub completed: usize,
    pub already_visited: usize,
    pub too_big: usize,
    pub no_default_branch: usize,
    pub failed: usize,
    pub categories: BTreeMap<String, CategoryTotals>,
}

impl RunSummary {
    fn begin() -> Self {
        let now = Local::now();
        Self {
            started: now,
            finished: now,
            attempted: 0,
            completed: 0,
            already_visited: 0,
            too_big: 0,
            no_default_branch: 0,
            failed: 0,
            categories: BTreeMap::new(),
        }
    }

    pub fn files(&self) -> usize {
        self.categories.values().map(|t| t.files).sum()
    }

    pub fn bytes(&self) -> u64 {
        self.categories.values().map(|t| t.bytes).sum()
    }

    /// Per-category file and byte counts with a total row
    pub fn table(&self, color: bool) -> Table {
        let cell = |text: String, role: StyleRole, right: bool| {
            let mut spec = if color {
                role.to_prettytable_spec().unwrap_or_default()
            } else {
                String::new()
            };
            if right {
                spec.push('r');
            }
            Cell::new(&text).style_spec(&spec)
        };

        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
        table.set_titles(Row::new(vec![
            cell("Category".to_string(), StyleRole::Header, false),
            cell("Files".to_string(), StyleRole::Header, true),
            cell("Bytes".to_string(), StyleRole::Header, true),
        ]));

        for (label, totals) in &self.categories {
            table.add_row(Row::new(vec![
                cell(label.clone(), StyleRole::Category, false),
                cell(totals.files.to_string(), StyleRole::Count, true),
                cell(format_bytes(totals.bytes), StyleRole::Count, true),
            ]));
        }
        table.add_row(Row::new(vec![
            cell("Total".to_string(), StyleRole::Total, false),
            cell(self.files().to_string(), StyleRole::Total, true),
            cell(format_bytes(self.bytes()), StyleRole::Total, true),
        ]));
        table
    }
}

pub struct Harvester {
    ingestor: Ingestor,
    credentials: Option<Credentials>,
    limits: HarvestLimits,
}

impl Harvester {
    pub fn new(ingestor: Ingestor, credentials: Option<Credentials>, limits: HarvestLimits) -> Self {
        Self {
            ingestor,
            credentials,
            limits,
        }
    }

    pub fn ingestor(&self) -> &Ingestor {
        &self.ingestor
    }

    /// Process every source in order until they are exhausted or the limit is reached
    ///
    /// Must be called from a multi-threaded tokio runtime: each repository is processed
    /// on the current worker through `block_in_place`.
    pub async fn run(&mut self, sources: Vec<Box<dyn RepositorySource>>) -> SourceResult<RunSummary> {
        let mut summary = RunSummary::begin();
        let clock = Instant::now();
        log::info!("Started at {}", format_timestamp(&summary.started));

        'sources: for mut source in sources {
            log::debug!("Reading repositories from the {}", source.name());
            loop {
                let record = match source.next().await {
                    Ok(Some(record)) => record,
                    Ok(None) => break,
                    Err(e) if e.is_authentication() => return Err(e),
                    Err(e) => {
                        log::error!("The {} failed: {}", source.name(), e);
                        break;
                    }
                };

                if self.ingestor.is_visited(&record.full_name) {
                    log::info!("Ignoring '{}'", record.full_name);
                    summary.already_visited += 1;
                    continue;
                }
                if self
                    .limits
                    .repository_limit
                    .is_some_and(|limit| summary.attempted >= limit)
                {
                    log::info!("Repository limit of {} reached", summary.attempted);
                    break 'sources;
                }
                summary.attempted += 1;

                self.harvest_one(&record, &mut summary);
            }
        }

        summary.finished = Local::now();
        log::info!(
            "Finished at {} after {}: {} {} stored from {} {}",
            format_timestamp(&summary.finished),
            format_elapsed(clock.elapsed()),
            summary.files(),
            plural(summary.files(), "file", "files"),
            summary.completed,
            plural(summary.completed, "repository", "repositories"),
        );
        Ok(summary)
    }

    fn harvest_one(&mut self, record: &RepositoryRecord, summary: &mut RunSummary) {
        if let Some(size) = record.size_bytes {
            if size > self.limits.max_repository_size {
                log::info!(
                    "'{}' is too big ({}), skipping",
                    record.full_name,
                    format_bytes(size)
                );
                summary.too_big += 1;
                return;
            }
        }

        log::info!(
            "Now processing '{}' ({}, {})",
            record.full_name,
            record
                .size_bytes
                .map(format_bytes)
                .unwrap_or_else(|| "size unknown".to_string()),
            now_timestamp()
        );

        let ingestor = &mut self.ingestor;
        let credentials = self.credentials.as_ref();
        let result = tokio::task::block_in_place(|| ingestor.process(record, credentials));

        match result {
            Ok(IngestOutcome::Completed { stats, .. }) => {
                summary.completed += 1;
                for (label, totals) in stats.by_category() {
                    let entry = summary.categories.entry(label.to_string()).or_default();
                    entry.files += totals.files;
                    entry.bytes += totals.bytes;
                }
            }
            Ok(IngestOutcome::NoDefaultBranch) => summary.no_default_branch += 1,
            Err(e) if e.is_not_found() => {
                log::warn!("{}", e);
                summary.failed += 1;
            }
            Err(e) => {
                log::error!("Failed to process '{}': {}", record.full_name, e);
                summary.failed += 1;
            }
        }
    }
}
