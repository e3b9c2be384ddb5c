//! Prospector CLI
//!
//! Local execution entry point.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use prospector::{
    config::{SearchCredentials, load_all, load_validated},
    error::{AppError, Result},
    models::{AgeFilter, Config, DashboardStats, ProviderKind, ProspectStatus, SearchFilters},
    pipeline,
    services::{Analyzer, DiscoveryEngine, HttpAnalyzer, create_provider},
    storage::{DEFAULT_HISTORY_LIMIT, LocalStorage, ProspectStore, QuotaStore},
    utils::report,
};
use uuid::Uuid;

/// Prospector - Website Redesign Lead Finder
#[derive(Parser, Debug)]
#[command(
    name = "prospector",
    version,
    about = "Finds small-business websites due for a redesign"
)]
struct Cli {
    /// Path to storage directory (prospects, history, quota, config.toml)
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Config file (default: {storage_dir}/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Use the randomized analyzer instead of fetching sites
    #[cfg(feature = "simulate")]
    #[arg(long, global = true)]
    simulate: bool,

    #[command(subcommand)]
    command: Command,
}

/// Discovery filters shared by the search commands.
#[derive(Args, Debug, Clone)]
struct FilterArgs {
    /// Sector key, or "all"
    #[arg(long, default_value = "all")]
    sector: String,

    /// Region key, or "all"
    #[arg(long, default_value = "all")]
    region: String,

    /// Website age bucket: all, very-old, old, outdated
    #[arg(long, default_value = "all")]
    age: AgeFilter,

    /// Free text appended to every query
    #[arg(short, long)]
    query: Option<String>,
}

impl From<FilterArgs> for SearchFilters {
    fn from(args: FilterArgs) -> Self {
        let filters = SearchFilters::new(args.sector, args.region).with_age(args.age);
        match args.query {
            Some(query) => filters.with_query(query),
            None => filters,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one discovery call and store the results
    Search {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Keep discovering in rounds until Ctrl-C or nothing new turns up
    Continuous {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// List stored prospects
    List {
        /// Only this outreach status
        #[arg(long)]
        status: Option<ProspectStatus>,

        /// Only this sector
        #[arg(long)]
        sector: Option<String>,
    },

    /// Change a prospect's outreach status
    Status { id: Uuid, status: ProspectStatus },

    /// Show recent searches
    History {
        #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: usize,
    },

    /// Show outreach statistics
    Stats,

    /// Show today's search quota
    Quota,

    /// Validate configuration and provider credentials
    Validate,

    /// Write a default config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Pick the analyzer for this run.
#[cfg_attr(not(feature = "simulate"), allow(unused_variables))]
fn build_analyzer(config: &Config, cli: &Cli) -> Result<Arc<dyn Analyzer>> {
    #[cfg(feature = "simulate")]
    if cli.simulate {
        log::info!("Using simulated website analysis");
        return Ok(Arc::new(prospector::services::RandomAnalyzer::new(
            std::time::Duration::from_millis(config.analyzer.simulated_latency_ms),
        )));
    }

    Ok(Arc::new(HttpAnalyzer::new(&config.analyzer)?))
}

fn build_engine(config: &Config, cli: &Cli) -> Result<DiscoveryEngine> {
    let provider = create_provider(&config.search)?;
    log::info!("Search provider: {}", provider.name());
    let analyzer = build_analyzer(config, cli)?;
    Ok(DiscoveryEngine::new(config, provider, analyzer))
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| cli.storage_dir.join("config.toml"));

    if let Command::Init { force } = &cli.command {
        if config_path.exists() && !force {
            log::warn!(
                "Config already exists at {}. Use --force to overwrite.",
                config_path.display()
            );
            return Ok(());
        }
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&config_path, Config::default().to_toml()?)?;
        log::info!("Default configuration written to {}", config_path.display());
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => load_validated(path)?,
        None => load_all(&cli.storage_dir)?,
    };
    let storage = LocalStorage::new(&cli.storage_dir);

    match &cli.command {
        Command::Search { filters } => {
            let engine = build_engine(&config, &cli)?;
            let filters = SearchFilters::from(filters.clone());
            pipeline::run_search(&config, &engine, &storage, &filters).await?;
        }

        Command::Continuous { filters } => {
            let engine = build_engine(&config, &cli)?;
            let filters = SearchFilters::from(filters.clone());
            pipeline::run_continuous(&config, &engine, &storage, &filters).await?;
        }

        Command::List { status, sector } => {
            let prospects: Vec<_> = storage
                .load_prospects()
                .await?
                .into_iter()
                .filter(|p| status.is_none_or(|s| p.status == s))
                .filter(|p| sector.as_ref().is_none_or(|s| &p.sector == s))
                .collect();

            report::header(&format!("{} prospects", prospects.len()));
            for prospect in &prospects {
                report::sub_item(&format!(
                    "{} {}",
                    prospect.id,
                    prospect.format("[{status}] {name} <{website}> age {age}, score {score}/10, {email}")
                ));
                if !prospect.technical_issues.is_empty() {
                    report::sub_item(&prospect.format("    issues: {issues}"));
                }
            }
        }

        Command::Status { id, status } => {
            if storage.update_status(*id, *status).await? {
                log::info!("Prospect {} is now {}", id, status);
            } else {
                return Err(AppError::validation(format!("no prospect with id {id}")));
            }
        }

        Command::History { limit } => {
            let entries = storage.recent_searches(*limit).await?;
            report::header("Recent searches");
            for entry in &entries {
                report::sub_item(&format!(
                    "{} sector={} region={} age={} query=\"{}\" -> {} results",
                    entry.created_at.format("%Y-%m-%d %H:%M"),
                    entry.filters.sector,
                    entry.filters.region,
                    entry.filters.website_age,
                    entry.query,
                    entry.results_count
                ));
            }
        }

        Command::Stats => {
            let stats = DashboardStats::from_prospects(&storage.load_prospects().await?);
            report::summary(
                "Outreach",
                &[
                    ("Total", stats.total.to_string()),
                    ("New", stats.new.to_string()),
                    ("Contacted", stats.contacted.to_string()),
                    ("Interested", stats.interested.to_string()),
                    ("Rejected", stats.rejected.to_string()),
                    ("Converted", stats.converted.to_string()),
                    ("Conversion rate", format!("{:.1}%", stats.conversion_rate)),
                ],
            );
        }

        Command::Quota => {
            let quota = storage.load_quota(config.quota.daily_limit).await?;
            report::summary(
                "Search quota",
                &[
                    ("Date", quota.date.to_string()),
                    ("Used", format!("{}/{}", quota.used, quota.daily_limit)),
                    ("Remaining", quota.remaining().to_string()),
                ],
            );
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            log::info!(
                "✓ Config OK ({} sectors, {} regions)",
                config.taxonomy.sectors.len(),
                config.taxonomy.regions.len()
            );
            if config.search.provider == ProviderKind::Google {
                let credentials = SearchCredentials::resolve(&config.search)?;
                log::info!("✓ Google credentials found (cx {})", credentials.cx);
            }
            log::info!("All validations passed!");
        }

        Command::Init { .. } => {}
    }

    Ok(())
}
