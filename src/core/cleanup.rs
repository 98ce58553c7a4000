//! Best-effort resource release
//!
//! Components that hold several independently releasable resources implement
//! [`Cleanup`] and run each release through [`release_step`], so a failure in one
//! step is logged and the remaining steps still run.

/// Trait for components owning resources that must be released on every exit path
pub trait Cleanup {
    /// Release all resources managed by this instance. Safe to call more than once.
    fn cleanup(&mut self);
}

/// Run one release step, logging instead of propagating a failure
///
/// Returns whether the step succeeded so callers can report aggregate outcomes.
pub fn release_step<E, F>(what: &str, step: F) -> bool
where
    E: std::fmt::Display,
    F: FnOnce() -> Result<(), E>,
{
    match step() {
        Ok(()) => {
            log::trace!("Released {}", what);
            true
        }
        Err(e) => {
            log::warn!("Failed to release {}: {}", what, e);
            false
        }
    }
}
