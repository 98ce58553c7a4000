//! Application module

pub mod cli;
pub mod harvest;
pub mod startup;
