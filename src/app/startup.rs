//! Application startup
//!
//! Parses the command line, layers the configuration, initialises logging and then
//! drives the harvest on a multi-threaded tokio runtime.

use std::io::IsTerminal;
use std::path::Path;

use clap::{CommandFactory, FromArgMatches};

use super::cli::args::Args;
use super::cli::config::Settings;
use super::harvest::{HarvestLimits, Harvester};
use crate::core::error_handling::{log_error_with_context, ContextualError};
use crate::core::logging::init_logging;
use crate::core::strings::plural;
use crate::core::styles::{palette_to_clap, StyleRole};
use crate::core::version::banner;
use crate::credentials::{acquire_or_prompt, Credentials, InputReader};
use crate::ledger::VisitedLedger;
use crate::library::FileLibrary;
use crate::scanner::Ingestor;
use crate::source::{GitHubSearch, RepositorySource, StaticSource};

/// Run the application and return the process exit code
pub fn startup() -> i32 {
    let color_guess = std::io::stdout().is_terminal();
    let matches = Args::command()
        .styles(palette_to_clap(color_guess))
        .get_matches();
    let args = match Args::from_arg_matches(&matches) {
        Ok(args) => args,
        Err(e) => e.exit(),
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start the async runtime: {}", e);
            return 1;
        }
    };

    runtime.block_on(run(args))
}

async fn run(args: Args) -> i32 {
    // Logging is not up yet, configuration errors go straight to stderr
    let settings = match Settings::resolve(&args).await {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let color = settings
        .color
        .unwrap_or_else(|| std::io::stdout().is_terminal());
    colored::control::set_override(color);

    let log_file = settings.log_file.as_deref().and_then(Path::to_str);
    if let Err(e) = init_logging(
        settings.log_level.as_deref(),
        settings.log_format.as_deref(),
        log_file,
        color,
    ) {
        eprintln!("Failed to initialise logging: {}", e);
        return 1;
    }

    log::info!("{}", banner());
    log::debug!("Resolved settings: {:#?}", settings);

    match harvest(&settings, color).await {
        Ok(()) => 0,
        Err(code) => code,
    }
}

fn fatal<E: ContextualError + std::fmt::Display + std::fmt::Debug>(error: E, context: &str) -> i32 {
    log_error_with_context(&error, context);
    1
}

async fn harvest(settings: &Settings, color: bool) -> Result<(), i32> {
    let classifier = settings
        .classifier()
        .map_err(|e| fatal(e, "Compiling category filters"))?;
    let ingest_settings = settings
        .ingest_settings()
        .map_err(|e| fatal(e, "Reading path filters"))?;

    let library = FileLibrary::open(&settings.output_dir)
        .map_err(|e| fatal(e, "Opening the file library"))?;
    log::info!("File library is at {}", library.canonical_root().display());

    let ledger = if settings.ledger {
        let path = library.locate(&settings.ledger_key, "txt");
        let ledger = VisitedLedger::open(&path).map_err(|e| {
            log::error!("FATAL: Cannot open ledger {}: {}", path.display(), e);
            1
        })?;
        log::info!(
            "Ledger contains {} {}",
            ledger.len(),
            plural(ledger.len(), "repository", "repositories")
        );
        Some(ledger)
    } else {
        None
    };

    let credentials = acquire_credentials();

    let mut sources: Vec<Box<dyn RepositorySource>> = Vec::new();
    if !settings.repositories.is_empty() {
        let priority = StaticSource::from_urls(&settings.repositories)
            .map_err(|e| fatal(e, "Reading the repository list"))?;
        log::info!(
            "{} {} in the priority list",
            priority.len(),
            plural(priority.len(), "repository", "repositories")
        );
        sources.push(Box::new(priority));
    }
    if settings.search {
        let search = GitHubSearch::new(&settings.language, credentials.clone())
            .map_err(|e| fatal(e, "Creating the search client"))?;
        search
            .verify()
            .await
            .map_err(|e| fatal(e, "Connecting to the GitHub API"))?;
        sources.push(Box::new(search));
    }
    if sources.is_empty() {
        log::warn!("Nothing to do: no repositories listed and search is disabled");
        return Ok(());
    }

    let ingestor = Ingestor::new(classifier, library, ledger, ingest_settings);
    let limits = HarvestLimits {
        max_repository_size: settings.max_repository_size,
        repository_limit: settings.repository_limit,
    };
    let mut harvester = Harvester::new(ingestor, credentials, limits);

    let summary = harvester
        .run(sources)
        .await
        .map_err(|e| fatal(e, "Reading repositories"))?;

    if !summary.categories.is_empty() {
        let table = summary.table(color);
        println!();
        println!("{}", StyleRole::Header.paint("Files stored by category", color));
        if table.print_tty(color).is_err() {
            print!("{}", table);
        }
    }
    Ok(())
}

/// Token from the environment, or from an interactive prompt when stdin is a terminal
fn acquire_credentials() -> Option<Credentials> {
    if !std::io::stdin().is_terminal() {
        return Credentials::from_env();
    }

    let mut reader = InputReader::stdin();
    match acquire_or_prompt(&mut reader, &mut std::io::stdout()) {
        Ok(credentials) => credentials,
        Err(e) => {
            log::warn!("Could not read credentials: {}", e);
            None
        }
    }
}
