//! Validation utilities for configuration values
//!
//! Shared checks used by both the TOML loader and the CLI layer.

use std::fmt;

/// A configuration value was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

impl From<String> for ValidationError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl crate::core::error_handling::ContextualError for ValidationError {
    fn is_user_actionable(&self) -> bool {
        true
    }

    fn user_message(&self) -> Option<&str> {
        Some(&self.message)
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate a path suffix used by the tree walk (`.java`, `rs`, `.tar.gz`)
///
/// A missing leading dot is added; the suffix is otherwise kept verbatim because tree
/// paths are matched case-sensitively.
pub fn validate_path_suffix(suffix: &str) -> ValidationResult<String> {
    let cleaned = suffix.trim();
    let bare = cleaned.strip_prefix('.').unwrap_or(cleaned);

    if bare.is_empty() {
        return Err(ValidationError::new("Path suffix cannot be empty"));
    }
    if bare.contains('/') || bare.contains('\\') {
        return Err(ValidationError::new(format!(
            "Path suffix '{}' cannot contain path separators",
            suffix
        )));
    }

    Ok(format!(".{}", bare))
}

/// Validate glob pattern syntax
pub fn validate_glob_pattern(pattern: &str) -> ValidationResult<glob::Pattern> {
    glob::Pattern::new(pattern)
        .map_err(|e| ValidationError::new(format!("Invalid glob pattern '{}': {}", pattern, e)))
}

/// Validate a category label, which doubles as a directory name in the library
pub fn validate_category_label(label: &str) -> ValidationResult<()> {
    if label.trim().is_empty() {
        return Err(ValidationError::new("Category label cannot be empty"));
    }
    if label == "." || label == ".." {
        return Err(ValidationError::new(format!(
            "Category label '{}' is not a valid directory name",
            label
        )));
    }
    if label.contains('/') || label.contains('\\') || label.chars().any(|c| c.is_control()) {
        return Err(ValidationError::new(format!(
            "Category label '{}' cannot contain path separators or control characters",
            label
        )));
    }
    Ok(())
}

/// Validate that category labels are unique, preserving declaration order
pub fn validate_unique_labels<'a>(labels: impl IntoIterator<Item = &'a str>) -> ValidationResult<()> {
    let mut seen = std::collections::HashSet::new();
    for label in labels {
        if !seen.insert(label) {
            return Err(ValidationError::new(format!(
                "Category '{}' is defined more than once",
                label
            )));
        }
    }
    Ok(())
}

/// Split comma-separated entries, trimming and dropping duplicates in first-seen order
pub fn split_comma_separated<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    values
        .iter()
        .flat_map(|v| v.as_ref().split(','))
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter(|part| seen.insert(part.to_string()))
        .map(str::to_string)
        .collect()
}
