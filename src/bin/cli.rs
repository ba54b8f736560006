//! jobscout CLI
//!
//! Local and scheduled entry point. Secrets come from the environment or a
//! `.env` file next to the working directory.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use jobscout::{
    config::{CredentialPresence, Credentials, load_config},
    error::{AppError, Result},
    models::{Config, StorageBackend},
    pipeline::{Pipeline, SourceSelector},
    services::{ExtractOptions, RatePolicy, SiteExtractor},
    storage::{LocalStorage, open_store},
    utils::http::HttpFetcher,
};

/// jobscout - boss.az / ejob.az job listing scraper
#[derive(Parser, Debug)]
#[command(name = "jobscout", version, about = "Scrapes job boards into a deduplicated job store")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape, deduplicate and persist; prints the run summary as JSON
    Run(RunArgs),

    /// Scrape only; prints the normalized listings as JSON
    Extract(ScrapeArgs),

    /// Validate the configuration file
    Validate,

    /// Show configured sources, credential presence and store contents
    Info,
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    scrape: ScrapeArgs,

    /// Trigger token, required when PARSER_SECRET is set
    #[arg(long, env = "PARSER_TOKEN", hide_env_values = true)]
    token: Option<String>,
}

#[derive(Args, Debug)]
struct ScrapeArgs {
    /// all, or a site key (boss, ejob-vac, ejob-muzdlu)
    #[arg(short, long, default_value = "all")]
    source: SourceSelector,

    /// Override the per-source listing cap
    #[arg(long)]
    max_listings: Option<usize>,

    /// Proxy, `host:port` or a full URL
    #[arg(long)]
    proxy: Option<String>,

    /// Fixed User-Agent instead of a random one
    #[arg(long)]
    user_agent: Option<String>,
}

impl ScrapeArgs {
    fn options(&self, config: &Config) -> ExtractOptions {
        let mut options = ExtractOptions::from_config(&config.rate_limit);
        if let Some(max) = self.max_listings {
            options.max_listings = max;
        }
        options.proxy = self.proxy.clone();
        options.identity = self.user_agent.clone();
        options
    }
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli.config)?;
    log::info!("Loaded configuration ({} sites)", config.sites.len());

    match cli.command {
        Command::Run(RunArgs { scrape: args, token }) => {
            let credentials = Credentials::from_env()?;
            credentials.check_trigger(token.as_deref())?;
            let store = open_store(&config.storage, &credentials)?;
            let options = args.options(&config);

            let pipeline = Pipeline::from_config(config, &credentials, store, options)?;
            let summary = pipeline.run_selected(&args.source).await?;

            log::info!(
                "Run finished: {} new, {} duplicates, {} failed of {}",
                summary.stats.new,
                summary.stats.duplicates,
                summary.stats.failed,
                summary.stats.total
            );
            print_json(&summary)?;
        }

        Command::Extract(args) => {
            let options = args.options(&config);
            let fetcher = Arc::new(HttpFetcher::from_config(
                &config.crawler,
                &config.rate_limit,
                options.proxy.as_deref(),
            )?);
            let policy = RatePolicy::from_config(&config);

            let mut jobs = Vec::new();
            for profile in args.source.select(&config.sites)? {
                let extractor =
                    SiteExtractor::new(profile.clone(), fetcher.clone(), policy.clone())?;
                let outcome = extractor.extract(&options).await;
                if let Some(error) = &outcome.error {
                    log::warn!("{}: {}", profile.name, error);
                }
                if let Some(status) = outcome.blocked_status {
                    log::warn!("{}: stopped on status {}", profile.name, status);
                }
                jobs.extend(outcome.jobs);
            }
            print_json(&jobs)?;
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            let fetcher = Arc::new(HttpFetcher::from_config(
                &config.crawler,
                &config.rate_limit,
                None,
            )?);
            let policy = RatePolicy::from_config(&config);
            for profile in &config.sites {
                SiteExtractor::new(profile.clone(), fetcher.clone(), policy.clone())
                    .map_err(|e| AppError::config(format!("site '{}': {e}", profile.key)))?;
                log::info!("✓ {} ({})", profile.key, profile.index_url);
            }
            log::info!("All validations passed!");
        }

        Command::Info => {
            for profile in &config.sites {
                log::info!(
                    "Source {:<12} {:<20} {}",
                    profile.key,
                    profile.name,
                    profile.index_url
                );
            }
            log::info!("Credentials: {}", CredentialPresence::from_env());
            match config.storage.backend {
                StorageBackend::Local => {
                    let storage =
                        LocalStorage::new(&config.storage.local_dir, config.storage.expiry_days);
                    let stats = storage.stats(Utc::now()).await?;
                    log::info!("Local store: {}", storage.root_dir().display());
                    print_json(&stats)?;
                }
                StorageBackend::Rest => {
                    log::info!("REST store, table '{}'", config.storage.table);
                }
            }
        }
    }

    Ok(())
}
