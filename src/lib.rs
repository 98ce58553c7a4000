pub mod app;
pub mod classify;
pub mod core;
pub mod credentials;
pub mod ledger;
pub mod library;
pub mod scanner;
pub mod source;
