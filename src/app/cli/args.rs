//! Command line arguments
//!
//! Every option here overrides the matching configuration file key.

use clap::builder::PossibleValuesParser;
use clap::{ArgAction, Parser};

use crate::core::logging::LogFormat;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "reposift")]
#[command(about = "Harvest classified source files from public repositories")]
#[command(version)]
#[command(after_help = " * can be specified multiple times or as a comma-separated list")]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Library directory receiving classified files
    #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Repositories to process before searching*
    #[arg(short = 'r', long = "repo", value_name = "URLS", action = ArgAction::Append)]
    pub repositories: Vec<String>,

    /// Only process the --repo list, skip the search feed
    #[arg(long = "no-search")]
    pub no_search: bool,

    /// Language to search for
    #[arg(short = 'L', long = "language", value_name = "LANGUAGE")]
    pub language: Option<String>,

    /// Path suffixes of files to examine*
    #[arg(short = 'X', long = "suffix", value_name = "SUFFIXES", action = ArgAction::Append)]
    pub path_suffixes: Vec<String>,

    /// Glob patterns of files to examine*
    #[arg(short = 'F', long = "files", value_name = "PATTERNS", action = ArgAction::Append)]
    pub path_globs: Vec<String>,

    /// Extension appended to stored file names (empty for none)
    #[arg(short = 'e', long = "extension", value_name = "EXT")]
    pub extension: Option<String>,

    /// Skip repositories larger than this (e.g. 1GiB)
    #[arg(long = "max-repository-size", value_name = "SIZE")]
    pub max_repository_size: Option<String>,

    /// Skip files larger than this (e.g. 10MiB)
    #[arg(long = "max-file-size", value_name = "SIZE")]
    pub max_file_size: Option<String>,

    /// Stop after this many repositories
    #[arg(short = 'n', long = "repository-limit", value_name = "COUNT")]
    pub repository_limit: Option<usize>,

    /// Stop matching a category after this many files
    #[arg(long = "category-limit", value_name = "COUNT")]
    pub category_limit: Option<u32>,

    /// Do not log a line for every stored file
    #[arg(long = "no-report-files")]
    pub no_report_files: bool,

    /// Neither consult nor update the visited ledger
    #[arg(long = "no-ledger")]
    pub no_ledger: bool,

    /// Force colored output
    #[arg(long = "color", conflicts_with = "no_color")]
    pub color: bool,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(short = 'f', long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log output format
    #[arg(long = "log-format", value_name = "FORMAT", value_parser = PossibleValuesParser::new(LogFormat::names()))]
    pub log_format: Option<String>,
}

impl Args {
    /// Explicit color choice, `None` when neither flag was given
    pub fn color_choice(&self) -> Option<bool> {
        match (self.color, self.no_color) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}
