//! Visited Ledger
//!
//! Durable set of repository identifiers that have been fully processed. The backing
//! file holds one identifier per line and is the source of truth: the in-memory set is
//! rebuilt from it on open, and new entries are appended through a buffered writer
//! that only reaches disk on [`VisitedLedger::flush`].
//!
//! Ignoring the same key twice in one run appends a duplicate line. Lookups are
//! unaffected because the set absorbs it.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct VisitedLedger {
    path: PathBuf,
    ignored: HashSet<String>,
    writer: Option<BufWriter<File>>,
}

impl VisitedLedger {
    /// Load the ledger at `path`, creating an empty file if it does not exist
    pub fn open(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        let mut ignored = HashSet::new();

        match File::open(&path) {
            Ok(file) => {
                for line in BufReader::new(file).lines() {
                    ignored.insert(line?);
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                File::create(&path)?;
            }
            Err(e) => return Err(e),
        }

        let writer = BufWriter::new(OpenOptions::new().append(true).open(&path)?);
        log::debug!(
            "Ledger '{}' loaded with {} entries",
            path.display(),
            ignored.len()
        );

        Ok(Self {
            path,
            ignored,
            writer: Some(writer),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of distinct identifiers
    pub fn len(&self) -> usize {
        self.ignored.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ignored.is_empty()
    }

    pub fn is_ignored(&self, key: &str) -> bool {
        self.ignored.contains(key)
    }

    /// Record `key`; the line is buffered until the next [`flush`](Self::flush)
    pub fn ignore(&mut self, key: &str) -> std::io::Result<()> {
        self.ignored.insert(key.to_string());
        let writer = self.writer_mut()?;
        writer.write_all(key.as_bytes())?;
        writer.write_all(b"\n")
    }

    /// Append `key` and make it durable before it becomes visible
    ///
    /// If writing or syncing fails the key stays unrecorded in memory as well.
    pub fn record(&mut self, key: &str) -> std::io::Result<()> {
        let writer = self.writer_mut()?;
        writer.write_all(key.as_bytes())?;
        writer.write_all(b"\n")?;
        self.flush()?;
        self.ignored.insert(key.to_string());
        Ok(())
    }

    /// Push buffered entries to durable storage
    pub fn flush(&mut self) -> std::io::Result<()> {
        let writer = self.writer_mut()?;
        writer.flush()?;
        writer.get_ref().sync_data()
    }

    /// Flush and release the writer
    pub fn close(mut self) -> std::io::Result<()> {
        self.flush()?;
        self.writer = None;
        Ok(())
    }

    fn writer_mut(&mut self) -> std::io::Result<&mut BufWriter<File>> {
        self.writer
            .as_mut()
            .ok_or_else(|| std::io::Error::new(ErrorKind::Other, "ledger writer is closed"))
    }
}

impl Drop for VisitedLedger {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.flush() {
                log::warn!("Failed to flush ledger '{}': {}", self.path.display(), e);
            }
        }
    }
}
