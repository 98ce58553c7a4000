//! Repository source error types

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The API rejected the supplied token
    #[error("{message}")]
    Authentication { message: String },
    #[error("Request to '{url}' failed: {message}")]
    Http { url: String, message: String },
    #[error("Unexpected response from '{url}': {message}")]
    Response { url: String, message: String },
    #[error("{message}")]
    InvalidUrl { url: String, message: String },
}

impl SourceError {
    pub fn is_authentication(&self) -> bool {
        matches!(self, SourceError::Authentication { .. })
    }
}

impl crate::core::error_handling::ContextualError for SourceError {
    fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            SourceError::Authentication { .. } | SourceError::InvalidUrl { .. }
        )
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            SourceError::Authentication { message } | SourceError::InvalidUrl { message, .. } => {
                Some(message)
            }
            _ => None,
        }
    }
}

pub type SourceResult<T> = Result<T, SourceError>;
