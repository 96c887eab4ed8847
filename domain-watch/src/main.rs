//! Domain Watch CLI Application
//!
//! A command-line interface over domain-watch-lib: registration lookups,
//! endpoint discovery, resumable IANA imports and update checks. Every
//! invocation performs one bounded unit of work so it can be scheduled.

mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Parser, Subcommand, ValueEnum};
use domain_watch_lib::{
    classify_record, default_store_path, load_env_config, ConfigManager, DomainStatus,
    DomainWatchError, DomainWatcher, FileConfig, ImportType, LookupOutcome, StepOutcome,
    WatchConfig,
};
use serde::Serialize;
use std::path::PathBuf;
use std::process;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// CLI arguments for domain-watch
#[derive(Parser, Debug)]
#[command(name = "domain-watch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "Sai Dutt G.V <gvs46@protonmail.com>")]
#[command(about = "Registration lookups over RDAP and WHOIS with a resumable IANA TLD directory")]
#[command(
    long_about = "Look up domain registration data over RDAP with WHOIS fallback.\n\nThe TLD endpoint directory is filled from IANA by resumable imports; each\n`import` invocation runs one bounded step and can be repeated until done."
)]
#[command(styles = STYLES)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Use a specific config file instead of automatic discovery
    #[arg(long = "config", value_name = "FILE", global = true, help_heading = "Configuration")]
    pub config: Option<String>,

    /// Directory store document (overrides config and DW_STORE;
    /// default $XDG_DATA_HOME/domain-watch/store.json)
    #[arg(long = "store", value_name = "FILE", global = true, help_heading = "Configuration")]
    pub store: Option<PathBuf>,

    /// Output results as JSON
    #[arg(long = "json", global = true, help_heading = "Output Format")]
    pub json: bool,

    /// Show progress logs
    #[arg(short = 'v', long = "verbose", global = true, help_heading = "Debugging")]
    pub verbose: bool,

    /// Show detailed debug logs
    #[arg(short = 'd', long = "debug", global = true, help_heading = "Debugging")]
    pub debug: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Look up registration data for one or more domains
    Lookup {
        /// Domain names to look up
        #[arg(value_name = "DOMAINS")]
        domains: Vec<String>,

        /// Read domains from a file (one per line, # comments)
        #[arg(short = 'f', long = "file", value_name = "FILE")]
        file: Option<String>,
    },

    /// Show the RDAP and WHOIS endpoints serving a TLD
    Discover {
        /// TLD with or without leading dot (e.g. "com", ".co.uk")
        #[arg(value_name = "TLD")]
        tld: String,
    },

    /// Run one step of an IANA import
    Import {
        #[arg(value_enum, value_name = "KIND")]
        kind: ImportKind,

        /// Continue a specific import session
        #[arg(long = "session", value_name = "ID")]
        session: Option<i64>,

        /// Keep stepping until the session completes
        #[arg(long = "until-done")]
        until_done: bool,
    },

    /// Compare IANA sources with the last completed imports
    CheckUpdates,

    /// Show an import log
    Status {
        #[arg(value_name = "ID")]
        id: i64,
    },
}

impl Command {
    /// Commands that read or write import logs and the TLD directory.
    fn is_stateful(&self) -> bool {
        matches!(
            self,
            Command::Import { .. } | Command::CheckUpdates | Command::Status { .. }
        )
    }
}

/// Import workflows selectable on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ImportKind {
    TldList,
    Rdap,
    Whois,
    All,
}

impl From<ImportKind> for ImportType {
    fn from(kind: ImportKind) -> Self {
        match kind {
            ImportKind::TldList => ImportType::TldList,
            ImportKind::Rdap => ImportType::Rdap,
            ImportKind::Whois => ImportType::Whois,
            ImportKind::All => ImportType::CompleteWorkflow,
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_tracing(&args);

    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Install the log subscriber. `RUST_LOG` wins over the flags.
fn init_tracing(args: &Args) {
    let default_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(args.debug)
        .init();
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(&args)?;
    let watcher = DomainWatcher::open(config).await?;

    match &args.command {
        Command::Lookup { domains, file } => run_lookup(&watcher, domains, file.as_deref(), &args).await,
        Command::Discover { tld } => run_discover(&watcher, tld, &args).await,
        Command::Import {
            kind,
            session,
            until_done,
        } => run_import(&watcher, *kind, *session, *until_done, &args).await,
        Command::CheckUpdates => run_check_updates(&watcher, &args).await,
        Command::Status { id } => run_status(&watcher, *id, &args).await,
    }
}

/// Resolve configuration: defaults, then files, then `DW_*`, then flags.
fn build_config(args: &Args) -> Result<WatchConfig, Box<dyn std::error::Error>> {
    let config_manager = ConfigManager::new(args.verbose);
    let env_config = load_env_config(args.verbose);

    let file_config: FileConfig = match args.config.as_ref().or(env_config.config.as_ref()) {
        Some(path) => {
            tracing::info!(path = %path, "Using explicit config file");
            config_manager
                .load_file(path)
                .map_err(|e| format!("Failed to load config file '{}': {}", path, e))?
        }
        None => config_manager.discover_and_load()?,
    };

    let mut config = config_manager.resolve(&file_config, &env_config)?;
    if let Some(store) = &args.store {
        config = config.with_store_path(store);
    }

    if config.store_path.is_none() {
        match default_store_path() {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Using default store");
                config = config.with_store_path(path);
            }
            None if args.command.is_stateful() => {
                return Err(DomainWatchError::config(
                    "No store configured; pass --store or set DW_STORE",
                )
                .into());
            }
            None => {}
        }
    }

    Ok(config)
}

/// JSON view of one lookup.
#[derive(Serialize)]
struct LookupView<'a> {
    domain: &'a str,
    outcome: &'static str,
    status: DomainStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    record: Option<&'a domain_watch_lib::DomainRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<'a> LookupView<'a> {
    fn new(domain: &'a str, outcome: &'a LookupOutcome) -> Self {
        match outcome {
            LookupOutcome::Resolved(record) => Self {
                domain,
                outcome: "resolved",
                status: classify_record(record),
                record: Some(record),
                error: None,
            },
            LookupOutcome::Available(record) => Self {
                domain,
                outcome: "available",
                status: DomainStatus::Available,
                record: Some(record),
                error: None,
            },
            LookupOutcome::Failed(e) => Self {
                domain,
                outcome: "failed",
                status: DomainStatus::Error,
                record: None,
                error: Some(e.to_string()),
            },
        }
    }
}

async fn run_lookup(
    watcher: &DomainWatcher,
    domains: &[String],
    file: Option<&str>,
    args: &Args,
) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();

    let mut results = watcher.lookup_many(domains).await;
    if let Some(file) = file {
        results.extend(watcher.lookup_from_file(file).await?);
    }
    if results.is_empty() {
        return Err("No domains specified. Pass domain names or use --file".into());
    }

    if args.json {
        let views: Vec<LookupView> = results
            .iter()
            .map(|(domain, outcome)| LookupView::new(domain, outcome))
            .collect();
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    for (domain, outcome) in &results {
        ui::print_lookup(domain, outcome, args.debug);
    }
    if results.len() > 1 {
        println!();
        ui::print_lookup_summary(&results, start.elapsed());
    }

    Ok(())
}

async fn run_discover(
    watcher: &DomainWatcher,
    tld: &str,
    args: &Args,
) -> Result<(), Box<dyn std::error::Error>> {
    let endpoints = watcher.discover(tld).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&endpoints)?);
    } else {
        ui::print_endpoints(tld, &endpoints);
    }

    Ok(())
}

async fn run_import(
    watcher: &DomainWatcher,
    kind: ImportKind,
    session: Option<i64>,
    until_done: bool,
    args: &Args,
) -> Result<(), Box<dyn std::error::Error>> {
    let import_type = ImportType::from(kind);

    let outcome = if until_done {
        let log = watcher
            .pipeline()
            .run_to_completion(import_type, session)
            .await?;
        StepOutcome::Completed(log)
    } else {
        watcher.import(import_type, session).await?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(outcome.log())?);
    } else {
        ui::print_step(&outcome);
    }

    Ok(())
}

async fn run_check_updates(
    watcher: &DomainWatcher,
    args: &Args,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = watcher.check_updates().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        ui::print_update_report(&report);
    }

    Ok(())
}

async fn run_status(
    watcher: &DomainWatcher,
    id: i64,
    args: &Args,
) -> Result<(), Box<dyn std::error::Error>> {
    let log = watcher
        .import_log(id)
        .await?
        .ok_or_else(|| format!("Import log {} not found", id))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&log)?);
    } else {
        ui::print_import_log(&log);
    }

    Ok(())
}

// domain-watch/src/main.rs tests module
