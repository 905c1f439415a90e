//! jobscout - Main Entry Point
//! Crawl job boards into SQLite, enrich descriptions, flag expired postings

mod boards;
mod config;
mod logging;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use jobscout_core::application::{
    BlacklistCleanup, CrawlOrchestrator, DetailEnricher, ExpiryChecker,
};
use jobscout_core::port::time_provider::SystemTimeProvider;
use jobscout_core::port::{JobBoard, ListingRepository, TransactionalListingRepository};
use jobscout_infra_sqlite::{create_pool, run_migrations, SqliteListingRepository};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use crate::boards::Boards;
use crate::config::{Settings, SourceKind, DEFAULT_CONFIG_PATH};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "jobscout")]
#[command(about = "Job board crawler with an idempotent SQLite store", long_about = None)]
#[command(version)]
struct Cli {
    /// Work preferences file (YAML)
    #[arg(long, global = true, env = "JOBSCOUT_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Crawl search results into the store
    Crawl(SourceArgs),

    /// Fill in missing descriptions from detail pages
    Enrich(SourceArgs),

    /// Flag postings that are closed or gone
    CheckExpired(SourceArgs),

    /// Delete stored postings matching the configured blacklist
    CleanBlacklist,

    /// Crawl, then enrich
    Run(SourceArgs),
}

#[derive(Args)]
struct SourceArgs {
    /// Restrict to these boards (default: `sources` from the config file)
    #[arg(long = "source", value_enum)]
    sources: Vec<SourceKind>,
}

impl SourceArgs {
    fn selected(&self, settings: &Settings) -> Vec<SourceKind> {
        if self.sources.is_empty() {
            settings.sources.clone()
        } else {
            self.sources.clone()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = logging::init()?;
    let cli = Cli::parse();

    info!("jobscout v{} starting...", VERSION);

    let settings = Settings::load(&cli.config)?;
    let repo = open_store(&settings).await?;

    let args = match &cli.command {
        Command::CleanBlacklist => return clean_blacklist(&settings, repo).await,
        Command::Crawl(args)
        | Command::Enrich(args)
        | Command::CheckExpired(args)
        | Command::Run(args) => args,
    };

    let boards = Boards::build(&settings, &args.selected(&settings)).await?;
    let result = match &cli.command {
        Command::Crawl(_) => crawl(&settings, repo, &boards).await,
        Command::Enrich(_) => enrich(repo, &boards).await,
        Command::CheckExpired(_) => check_expired(repo, &boards).await,
        Command::Run(_) => {
            // Backfill runs even when some board failed to crawl
            let crawled = crawl(&settings, repo.clone(), &boards).await;
            let enriched = enrich(repo, &boards).await;
            combine(crawled, enriched)
        }
        Command::CleanBlacklist => Ok(()),
    };

    // The browser must be closed on success and failure alike
    boards.close().await;
    result
}

async fn open_store(settings: &Settings) -> Result<Arc<SqliteListingRepository>> {
    if let Some(dir) = settings.database_dir() {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create database directory {}", dir.display()))?;
    }

    let database_url = settings.database_url();
    info!(database = %database_url, "Initializing database...");
    let pool = create_pool(&database_url)
        .await
        .context("DB pool creation failed")?;
    run_migrations(&pool).await.context("Migration failed")?;

    Ok(Arc::new(SqliteListingRepository::new(pool)))
}

async fn crawl(
    settings: &Settings,
    repo: Arc<SqliteListingRepository>,
    boards: &Boards,
) -> Result<()> {
    let orchestrator = CrawlOrchestrator::new(
        repo as Arc<dyn TransactionalListingRepository>,
        Arc::new(SystemTimeProvider),
        settings.search()?,
        settings.blacklist()?,
    )
    .with_max_pages(settings.max_pages);

    let mut failures = SourceFailures::new("crawl");
    for board in boards.iter() {
        match orchestrator.crawl(board).await {
            Ok(report) => {
                info!(
                    source = %report.source,
                    inserted = report.inserted,
                    skipped = report.skipped,
                    blacklisted = report.blacklisted,
                    dimensions_failed = report.dimensions_failed,
                    "Crawl finished"
                );
                print_report(&report)?;
            }
            Err(e) => failures.record(board, e.into()),
        }
    }
    failures.into_result()
}

async fn enrich(repo: Arc<SqliteListingRepository>, boards: &Boards) -> Result<()> {
    let enricher = DetailEnricher::new(repo as Arc<dyn ListingRepository>);

    let mut failures = SourceFailures::new("enrich");
    for board in boards.iter() {
        match enricher.enrich(board).await {
            Ok(report) => {
                info!(
                    source = %report.source,
                    selected = report.selected,
                    updated = report.updated,
                    failed = report.failed,
                    "Enrichment finished"
                );
                print_report(&report)?;
            }
            Err(e) => failures.record(board, e.into()),
        }
    }
    failures.into_result()
}

async fn check_expired(repo: Arc<SqliteListingRepository>, boards: &Boards) -> Result<()> {
    let checker = ExpiryChecker::new(repo as Arc<dyn ListingRepository>);

    let mut failures = SourceFailures::new("check-expired");
    for board in boards.iter() {
        match checker.check(board).await {
            Ok(report) => {
                info!(
                    source = %report.source,
                    checked = report.checked,
                    expired = report.expired,
                    "Expiry check finished"
                );
                print_report(&report)?;
            }
            Err(e) => failures.record(board, e.into()),
        }
    }
    failures.into_result()
}

async fn clean_blacklist(settings: &Settings, repo: Arc<SqliteListingRepository>) -> Result<()> {
    let cleanup = BlacklistCleanup::new(repo, settings.blacklist()?);
    let report = cleanup.run().await.context("Blacklist cleanup failed")?;
    print_report(&report)
}

/// First error wins; a second one is logged so it is not lost
fn combine(first: Result<()>, second: Result<()>) -> Result<()> {
    match (first, second) {
        (Err(e), Err(other)) => {
            error!(error = ?other, "Second step also failed");
            Err(e)
        }
        (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
        (Ok(()), Ok(())) => Ok(()),
    }
}

/// Reports go to stdout as JSON; logs go to stderr
fn print_report<T: Serialize>(report: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// A failing source is logged and the next one still runs; the command fails at the end
struct SourceFailures {
    step: &'static str,
    sources: Vec<String>,
}

impl SourceFailures {
    fn new(step: &'static str) -> Self {
        Self {
            step,
            sources: Vec::new(),
        }
    }

    fn record(&mut self, board: &dyn JobBoard, e: anyhow::Error) {
        error!(source = board.source_name(), step = self.step, error = ?e, "Source failed");
        self.sources.push(board.source_name().to_string());
    }

    fn into_result(self) -> Result<()> {
        if !self.sources.is_empty() {
            bail!("{} failed for: {}", self.step, self.sources.join(", "));
        }
        Ok(())
    }
}
