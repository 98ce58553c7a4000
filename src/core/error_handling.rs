//! Generic error handling utilities
//!
//! Provides unified reporting for fatal errors across the module error types while
//! keeping user-facing messages separate from diagnostic detail.

/// Trait for errors that can distinguish between user-actionable and system errors
///
/// When `is_user_actionable()` returns `true`, `user_message()` must return
/// `Some(message)` with something the user can act on (fix a token, correct a config
/// key). System errors return `None` and are reported with generic context instead.
pub trait ContextualError: std::error::Error {
    /// Returns true if this error carries a message that should be shown to the user as is
    fn is_user_actionable(&self) -> bool;

    /// Returns the specific user message if this is a user-actionable error
    fn user_message(&self) -> Option<&str>;
}

/// Log a fatal error with the appropriate level of detail
///
/// User-actionable errors show their own message; system errors show the operation
/// context. Full detail is always available at debug level.
///
/// # Examples
/// ```rust,no_run
/// # use reposift::core::error_handling::log_error_with_context;
/// # use reposift::core::validation::ValidationError;
/// let err = ValidationError::new("Category label must not be empty");
/// log_error_with_context(&err, "Loading configuration");
/// // Logs: "FATAL: Category label must not be empty"
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Display + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => log::error!("FATAL: {}", user_msg),
        _ => log::error!("FATAL: {}", operation_context),
    }
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}
