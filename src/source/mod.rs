//! Repository Sources
//!
//! Sources yield [`RepositoryRecord`]s one at a time. The run drains a prioritized
//! [`StaticSource`] first and then, if enabled, the paginated [`GitHubSearch`] feed.

mod error;
pub mod github;

pub use error::{SourceError, SourceResult};
pub use github::GitHubSearch;

use std::collections::VecDeque;

use async_trait::async_trait;
use gix::bstr::ByteSlice;

/// A repository to process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRecord {
    /// `owner/name`; the key recorded in the visited ledger
    pub full_name: String,
    /// Anything gix can fetch from: an https URL or a local path
    pub url: String,
    /// Approximate size, when the source knows it
    pub size_bytes: Option<u64>,
}

impl RepositoryRecord {
    pub fn new(full_name: impl Into<String>, url: impl Into<String>, size_bytes: Option<u64>) -> Self {
        Self {
            full_name: full_name.into(),
            url: url.into(),
            size_bytes,
        }
    }

    /// Build a record from a URL, deriving the identifier with [`identifier_from_url`]
    pub fn from_url(url: &str) -> SourceResult<Self> {
        Ok(Self::new(identifier_from_url(url)?, url, None))
    }
}

#[async_trait]
pub trait RepositorySource: Send {
    /// Short name used in log lines
    fn name(&self) -> &str;

    /// Next repository, or `None` once the source is exhausted
    async fn next(&mut self) -> SourceResult<Option<RepositoryRecord>>;
}

/// Fixed list of repositories, yielded in order
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    pending: VecDeque<RepositoryRecord>,
}

impl StaticSource {
    pub fn new(records: impl IntoIterator<Item = RepositoryRecord>) -> Self {
        Self {
            pending: records.into_iter().collect(),
        }
    }

    pub fn from_urls<S: AsRef<str>>(urls: &[S]) -> SourceResult<Self> {
        let records = urls
            .iter()
            .map(|url| RepositoryRecord::from_url(url.as_ref()))
            .collect::<SourceResult<Vec<_>>>()?;
        Ok(Self::new(records))
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[async_trait]
impl RepositorySource for StaticSource {
    fn name(&self) -> &str {
        "priority list"
    }

    async fn next(&mut self) -> SourceResult<Option<RepositoryRecord>> {
        Ok(self.pending.pop_front())
    }
}

/// `owner/name` from the last two path segments of `url`, without a `.git` suffix
pub fn identifier_from_url(url: &str) -> SourceResult<String> {
    let invalid = |message: String| SourceError::InvalidUrl {
        url: url.to_string(),
        message,
    };

    let parsed = gix_url::parse(url.as_bytes().as_bstr())
        .map_err(|e| invalid(format!("Invalid repository URL '{}': {}", url, e)))?;
    let path = parsed.path.to_str_lossy();

    let segments: Vec<&str> = path.split(['/', '\\']).filter(|s| !s.is_empty()).collect();
    let Some((last, rest)) = segments.split_last() else {
        return Err(invalid(format!("Repository URL '{}' has no path", url)));
    };
    let name = last.strip_suffix(".git").unwrap_or(last);
    if name.is_empty() {
        return Err(invalid(format!("Repository URL '{}' has no name", url)));
    }

    Ok(match rest.last() {
        Some(owner) => format!("{}/{}", owner, name),
        None => name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_from_url() {
        assert_eq!(
            identifier_from_url("https://github.com/Dit05/GitHubProjectDownloader2").unwrap(),
            "Dit05/GitHubProjectDownloader2"
        );
        assert_eq!(
            identifier_from_url("https://github.com/acme/widgets.git").unwrap(),
            "acme/widgets"
        );
        assert_eq!(
            identifier_from_url("git@github.com:acme/widgets.git").unwrap(),
            "acme/widgets"
        );
        assert_eq!(
            identifier_from_url("/srv/git/acme/widgets/").unwrap(),
            "acme/widgets"
        );
    }

    #[test]
    fn test_identifier_requires_a_path() {
        assert!(identifier_from_url("https://github.com/").is_err());
    }

    #[tokio::test]
    async fn test_static_source_yields_in_order() {
        let mut source = StaticSource::from_urls(&[
            "https://github.com/acme/first",
            "https://github.com/acme/second.git",
        ])
        .unwrap();
        assert_eq!(source.len(), 2);

        let first = source.next().await.unwrap().unwrap();
        assert_eq!(first.full_name, "acme/first");
        assert_eq!(first.url, "https://github.com/acme/first");
        assert_eq!(first.size_bytes, None);

        let second = source.next().await.unwrap().unwrap();
        assert_eq!(second.full_name, "acme/second");

        assert!(source.next().await.unwrap().is_none());
        assert!(source.is_empty());
    }
}
