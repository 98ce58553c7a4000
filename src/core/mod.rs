//! Core services and infrastructure

pub mod cleanup;
pub mod error_handling;
pub mod logging;
pub mod strings;
pub mod styles;
pub mod time;
pub mod validation;
pub mod version;
