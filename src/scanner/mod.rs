//! Repository Scanner
//!
//! Shallow fetch, tree walk and classification of a single repository.

pub mod error;
pub mod ingest;
pub mod remote;
pub mod workspace;

pub use error::{ScanError, ScanResult};
pub use ingest::{
    CategoryTotals, IngestOutcome, IngestSettings, IngestStats, Ingestor, PathFilter,
    StoredArtifact,
};
pub use workspace::ScratchRepository;
