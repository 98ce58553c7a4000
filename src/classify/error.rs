//! Classification error types

#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error("{message}")]
    InvalidPattern {
        pattern: String,
        message: String,
        #[source]
        source: regex::Error,
    },
    #[error("Invalid category '{label}': {message}")]
    InvalidCategory { label: String, message: String },
}

impl ClassifyError {
    pub fn invalid_pattern(pattern: &str, source: regex::Error) -> Self {
        ClassifyError::InvalidPattern {
            pattern: pattern.to_string(),
            message: format!("Invalid regex pattern '{}': {}", pattern, source),
            source,
        }
    }
}

impl crate::core::error_handling::ContextualError for ClassifyError {
    fn is_user_actionable(&self) -> bool {
        // Both variants come from configuration
        true
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ClassifyError::InvalidPattern { message, .. } => Some(message),
            ClassifyError::InvalidCategory { message, .. } => Some(message),
        }
    }
}

pub type ClassifyResult<T> = Result<T, ClassifyError>;
