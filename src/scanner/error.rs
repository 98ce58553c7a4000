//! Scanner Error Types

use crate::library::LibraryError;

/// Scanner error types
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The remote does not exist or refused to reveal itself
    #[error("Repository '{url}' not found")]
    NotFound { url: String },
    /// Network or protocol failure talking to the remote
    #[error("Remote error for '{url}': {message}")]
    Remote { url: String, message: String },
    /// Local object database or tree failure
    #[error("Git error: {message}")]
    Git { message: String },
    /// IO operation failed
    #[error("IO error: {message}")]
    Io { message: String },
    #[error(transparent)]
    Library(#[from] LibraryError),
}

impl ScanError {
    /// Map a remote failure, recognising "not found" anywhere in the source chain
    pub fn remote<E>(url: &str, error: E) -> Self
    where
        E: std::error::Error + 'static,
    {
        let mut current: Option<&(dyn std::error::Error + 'static)> = Some(&error);
        while let Some(err) = current {
            if looks_like_not_found(&err.to_string()) {
                return ScanError::NotFound {
                    url: url.to_string(),
                };
            }
            current = err.source();
        }

        ScanError::Remote {
            url: url.to_string(),
            message: error.to_string(),
        }
    }

    pub fn git(context: &str, error: impl std::fmt::Display) -> Self {
        ScanError::Git {
            message: format!("{}: {}", context, error),
        }
    }

    pub fn io(context: &str, error: impl std::fmt::Display) -> Self {
        ScanError::Io {
            message: format!("{}: {}", context, error),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ScanError::NotFound { .. })
    }
}

fn looks_like_not_found(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    ["not found", "404", "does not exist", "does not appear to be a git repository"]
        .iter()
        .any(|needle| lower.contains(needle))
}

impl crate::core::error_handling::ContextualError for ScanError {
    fn is_user_actionable(&self) -> bool {
        // Per-repository failures, nothing the user can fix
        false
    }

    fn user_message(&self) -> Option<&str> {
        None
    }
}

pub type ScanResult<T> = Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Wrapped {
        message: &'static str,
        inner: Option<Box<Wrapped>>,
    }

    impl fmt::Display for Wrapped {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.message)
        }
    }

    impl std::error::Error for Wrapped {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            self.inner.as_deref().map(|e| e as &(dyn std::error::Error + 'static))
        }
    }

    #[test]
    fn test_remote_detects_not_found_in_source_chain() {
        let err = Wrapped {
            message: "connection failed",
            inner: Some(Box::new(Wrapped {
                message: "Received HTTP status 404",
                inner: None,
            })),
        };
        let mapped = ScanError::remote("https://example.invalid/a/b", err);
        assert!(mapped.is_not_found());
        assert_eq!(
            mapped.to_string(),
            "Repository 'https://example.invalid/a/b' not found"
        );
    }

    #[test]
    fn test_remote_other_failures_keep_message() {
        let err = Wrapped {
            message: "connection reset by peer",
            inner: None,
        };
        let mapped = ScanError::remote("https://example.invalid/a/b", err);
        assert!(!mapped.is_not_found());
        assert!(mapped.to_string().contains("connection reset by peer"));
    }
}
