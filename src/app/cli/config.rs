//! TOML configuration loading and the resolved run settings
//!
//! Precedence, lowest first: built-in defaults, the configuration file, command line
//! flags. The file is read as a raw `toml::Table` and applied key by key so unknown
//! keys are tolerated and each value gets its own validation message.

use std::path::{Path, PathBuf};

use crate::classify::catalog::{default_admission, default_test_keywords, design_patterns};
use crate::classify::{CategorySpec, ClassifyResult, Classifier};
use crate::core::strings::{parse_byte_size, title_case};
use crate::core::validation::{
    split_comma_separated, validate_glob_pattern, validate_path_suffix, ValidationError,
    ValidationResult,
};
use crate::scanner::{IngestSettings, PathFilter};

use super::args::Args;

pub const CONFIG_FILE_NAME: &str = "reposift.toml";

/// Fully resolved configuration for one run
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub output_dir: PathBuf,
    /// Appended to stored file names; `None` appends nothing
    pub extension: Option<String>,
    pub path_suffixes: Vec<String>,
    pub path_globs: Vec<String>,
    pub language: String,
    pub max_repository_size: u64,
    pub max_file_size: u64,
    pub repository_limit: Option<usize>,
    pub category_limit: Option<i64>,
    pub report_files: bool,
    pub ledger: bool,
    pub ledger_key: String,
    pub test_keywords: Vec<String>,
    pub repositories: Vec<String>,
    pub search: bool,
    pub categories: Vec<CategorySpec>,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
    pub log_file: Option<PathBuf>,
    pub color: Option<bool>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("downloaded"),
            extension: Some(".java".to_string()),
            path_suffixes: vec![".java".to_string()],
            path_globs: Vec::new(),
            language: "java".to_string(),
            max_repository_size: 1 << 30,
            max_file_size: 10 << 20,
            repository_limit: None,
            category_limit: None,
            report_files: true,
            ledger: true,
            ledger_key: "ignored repositories".to_string(),
            test_keywords: default_test_keywords(),
            repositories: Vec::new(),
            search: true,
            categories: design_patterns(),
            log_level: None,
            log_format: None,
            log_file: None,
            color: None,
        }
    }
}

/// Locate the configuration file: an explicit path must exist, the default may not
pub fn resolve_config_path(explicit: Option<&Path>) -> ValidationResult<Option<PathBuf>> {
    match explicit {
        Some(path) if path.exists() => Ok(Some(path.to_path_buf())),
        Some(path) => Err(ValidationError::new(format!(
            "The specified configuration file does not exist: {}",
            path.display()
        ))),
        None => Ok(dirs::config_dir()
            .map(|d| d.join(title_case(env!("CARGO_PKG_NAME"))).join(CONFIG_FILE_NAME))
            .filter(|path| path.exists())),
    }
}

/// Read and parse a configuration file
pub async fn load_config_file(path: &Path) -> ValidationResult<toml::Table> {
    let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
        ValidationError::new(format!(
            "Error reading configuration file {}: {}",
            path.display(),
            e
        ))
    })?;
    toml::from_str::<toml::Table>(&contents).map_err(|e| {
        ValidationError::new(format!(
            "Error parsing configuration file {}: {}",
            path.display(),
            e
        ))
    })
}

impl Settings {
    /// Defaults, then the configuration file (if any), then `args`
    pub async fn resolve(args: &Args) -> ValidationResult<Self> {
        let mut settings = Self::default();
        if let Some(path) = resolve_config_path(args.config_file.as_deref())? {
            let config = load_config_file(&path).await?;
            settings.apply_toml_values(&config).map_err(|e| {
                ValidationError::new(format!(
                    "Error in configuration file {}: {}",
                    path.display(),
                    e
                ))
            })?;
            log::debug!("Loaded configuration from {}", path.display());
        }
        settings.apply_args(args)?;
        Ok(settings)
    }

    /// Apply TOML configuration values
    pub fn apply_toml_values(&mut self, config: &toml::Table) -> ValidationResult<()> {
        if let Some(dir) = string_value(config, "output-dir")? {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(ext) = string_value(config, "extension")? {
            self.extension = non_empty(ext);
        }
        if let Some(suffixes) = string_list(config, "path-suffixes")? {
            self.path_suffixes = suffixes;
        }
        if let Some(globs) = string_list(config, "path-globs")? {
            self.path_globs = globs;
        }
        if let Some(language) = string_value(config, "language")? {
            self.language = language;
        }
        if let Some(size) = size_value(config, "max-repository-size")? {
            self.max_repository_size = size;
        }
        if let Some(size) = size_value(config, "max-file-size")? {
            self.max_file_size = size;
        }
        if let Some(limit) = integer_value(config, "repository-limit")? {
            // Negative means no limit
            self.repository_limit = usize::try_from(limit).ok();
        }
        if let Some(limit) = integer_value(config, "category-limit")? {
            self.category_limit = (limit >= 0).then_some(limit);
        }
        if let Some(report) = bool_value(config, "report-files")? {
            self.report_files = report;
        }
        if let Some(ledger) = bool_value(config, "ledger")? {
            self.ledger = ledger;
        }
        if let Some(key) = string_value(config, "ledger-key")? {
            if key.trim().is_empty() {
                return Err(ValidationError::new("'ledger-key' cannot be empty"));
            }
            self.ledger_key = key;
        }
        if let Some(keywords) = string_list(config, "test-keywords")? {
            self.test_keywords = keywords;
        }
        if let Some(repositories) = string_list(config, "repositories")? {
            self.repositories = repositories;
        }
        if let Some(search) = bool_value(config, "search")? {
            self.search = search;
        }
        if let Some(categories) = config.get("category") {
            self.categories = parse_categories(categories)?;
        }
        if let Some(level) = string_value(config, "log-level")? {
            self.log_level = Some(level);
        }
        if let Some(format) = string_value(config, "log-format")? {
            self.log_format = Some(format);
        }
        if let Some(file) = string_value(config, "log-file")? {
            self.log_file = log_file_value(&file);
        }
        if let Some(color) = bool_value(config, "color")? {
            self.color = Some(color);
        }

        self.validate()
    }

    /// Apply command line overrides
    pub fn apply_args(&mut self, args: &Args) -> ValidationResult<()> {
        if let Some(dir) = &args.output_dir {
            self.output_dir = dir.clone();
        }
        if !args.repositories.is_empty() {
            self.repositories = split_comma_separated(&args.repositories);
        }
        if args.no_search {
            self.search = false;
        }
        if let Some(language) = &args.language {
            self.language = language.clone();
        }
        if !args.path_suffixes.is_empty() {
            self.path_suffixes = split_comma_separated(&args.path_suffixes);
        }
        if !args.path_globs.is_empty() {
            self.path_globs = split_comma_separated(&args.path_globs);
        }
        if let Some(ext) = &args.extension {
            self.extension = non_empty(ext.clone());
        }
        if let Some(size) = &args.max_repository_size {
            self.max_repository_size = parse_byte_size(size).map_err(ValidationError::new)?;
        }
        if let Some(size) = &args.max_file_size {
            self.max_file_size = parse_byte_size(size).map_err(ValidationError::new)?;
        }
        if let Some(limit) = args.repository_limit {
            self.repository_limit = Some(limit);
        }
        if let Some(limit) = args.category_limit {
            self.category_limit = Some(i64::from(limit));
        }
        if args.no_report_files {
            self.report_files = false;
        }
        if args.no_ledger {
            self.ledger = false;
        }
        if let Some(level) = &args.log_level {
            self.log_level = Some(level.clone());
        }
        if let Some(format) = &args.log_format {
            self.log_format = Some(format.clone());
        }
        if let Some(file) = &args.log_file {
            self.log_file = log_file_value(&file.to_string_lossy());
        }
        if let Some(color) = args.color_choice() {
            self.color = Some(color);
        }

        self.validate()
    }

    /// Check the values that have no type-level guarantee
    pub fn validate(&self) -> ValidationResult<()> {
        self.path_filter().map(|_| ())
    }

    pub fn path_filter(&self) -> ValidationResult<PathFilter> {
        let suffixes = self
            .path_suffixes
            .iter()
            .map(|s| validate_path_suffix(s))
            .collect::<ValidationResult<Vec<_>>>()?;
        let globs = self
            .path_globs
            .iter()
            .map(|g| validate_glob_pattern(g))
            .collect::<ValidationResult<Vec<_>>>()?;
        Ok(PathFilter::new(suffixes, globs))
    }

    pub fn ingest_settings(&self) -> ValidationResult<IngestSettings> {
        Ok(IngestSettings {
            path_filter: self.path_filter()?,
            extension: self.extension.clone(),
            max_file_size: self.max_file_size,
            report_files: self.report_files,
        })
    }

    /// Compile the admission filter and categories
    pub fn classifier(&self) -> ClassifyResult<Classifier> {
        Classifier::from_specs(
            Some(&default_admission(&self.test_keywords)),
            &self.categories,
            self.category_limit,
        )
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

/// Magic values "none" and "-" disable file logging
fn log_file_value(value: &str) -> Option<PathBuf> {
    if value.eq_ignore_ascii_case("none") || value == "-" || value.is_empty() {
        None
    } else {
        Some(PathBuf::from(value))
    }
}

fn type_error(key: &str, expected: &str) -> ValidationError {
    ValidationError::new(format!("'{}' must be {}", key, expected))
}

fn string_value(config: &toml::Table, key: &str) -> ValidationResult<Option<String>> {
    match config.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| type_error(key, "a string")),
    }
}

fn bool_value(config: &toml::Table, key: &str) -> ValidationResult<Option<bool>> {
    match config.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_bool()
            .map(Some)
            .ok_or_else(|| type_error(key, "true or false")),
    }
}

fn integer_value(config: &toml::Table, key: &str) -> ValidationResult<Option<i64>> {
    match config.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_integer()
            .map(Some)
            .ok_or_else(|| type_error(key, "an integer")),
    }
}

/// A single string or an array of strings, with comma-separated entries split
fn string_list(config: &toml::Table, key: &str) -> ValidationResult<Option<Vec<String>>> {
    let Some(value) = config.get(key) else {
        return Ok(None);
    };

    let mut raw = Vec::new();
    if let Some(single) = value.as_str() {
        raw.push(single.to_string());
    } else if let Some(array) = value.as_array() {
        for item in array {
            let item = item
                .as_str()
                .ok_or_else(|| type_error(key, "a string or an array of strings"))?;
            raw.push(item.to_string());
        }
    } else {
        return Err(type_error(key, "a string or an array of strings"));
    }

    Ok(Some(split_comma_separated(&raw)))
}

/// Either a plain byte count or a string with a unit (`"10MiB"`)
fn size_value(config: &toml::Table, key: &str) -> ValidationResult<Option<u64>> {
    match config.get(key) {
        None => Ok(None),
        Some(toml::Value::Integer(n)) => u64::try_from(*n)
            .map(Some)
            .map_err(|_| type_error(key, "a positive size")),
        Some(toml::Value::String(s)) => parse_byte_size(s)
            .map(Some)
            .map_err(|e| ValidationError::new(format!("'{}': {}", key, e))),
        Some(_) => Err(type_error(key, "a size such as 10MiB")),
    }
}

fn parse_categories(value: &toml::Value) -> ValidationResult<Vec<CategorySpec>> {
    let categories: Vec<CategorySpec> = value
        .clone()
        .try_into()
        .map_err(|e| ValidationError::new(format!("Invalid [[category]] table: {}", e)))?;
    if categories.is_empty() {
        return Err(ValidationError::new("At least one [[category]] is required"));
    }
    Ok(categories)
}
