//! postmirror CLI
//!
//! Local execution entry point.

use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Parser, Subcommand};
use postmirror::{
    error::{AppError, Result},
    models::{Config, POSTS_DIR},
    pipeline,
    services::FeedCollector,
    storage::{LocalStorage, SiteStorage},
};

/// postmirror - Blog feed to static site mirror
#[derive(Parser, Debug)]
#[command(
    name = "postmirror",
    version,
    about = "Mirrors blog feeds into a static site with sitemaps"
)]
struct Cli {
    /// Site directory (output root)
    #[arg(short, long, default_value = ".")]
    site_dir: PathBuf,

    /// Configuration file (default: {site_dir}/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch all feeds and regenerate the site
    Build {
        /// Also write a JSON run report to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Rebuild index, sitemaps and robots.txt from posts/ only
    Rescan,

    /// Validate configuration file
    Validate,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },

    /// Show configuration and site summary
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| cli.site_dir.join("config.toml"));
    let storage = LocalStorage::new(&cli.site_dir);

    match cli.command {
        Command::Build { report } => {
            let config = load_valid_config(&config_path)?;
            // One timestamp for the whole run: lastmod and fallback dates.
            let now = Utc::now();

            log::info!("Step 1/2: Collecting {} feeds...", config.feeds.len());
            let collector = FeedCollector::new(&config.fetch)?;
            let outcome = collector.collect_all(&config.feeds).await;
            log::info!(
                "Collected {} entries ({} of {} feeds failed)",
                outcome.entries.len(),
                outcome.feed_failures,
                outcome.feed_total
            );

            log::info!("Step 2/2: Rendering site into {}", cli.site_dir.display());
            let summary = pipeline::run_build(&config, &storage, &outcome, now).await?;

            log::info!(
                "Generated: {} posts, index with {} cards, {} sitemap urls{}",
                summary.rendered_pages,
                summary.index_cards,
                summary.sitemap_urls,
                if summary.used_rescan {
                    " (rebuilt from posts/)"
                } else {
                    ""
                }
            );

            if let Some(path) = report {
                std::fs::write(&path, serde_json::to_string_pretty(&summary)?)?;
                log::info!("Report saved to {}", path.display());
            }
        }

        Command::Rescan => {
            let config = load_valid_config(&config_path)?;
            let cards = pipeline::run_rescan(&config, &storage, Utc::now()).await?;
            log::info!("Index rebuilt with {} cards", cards.len());
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            let config = Config::load(&config_path)?;

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!(
                "✓ Config OK ({} feeds, base URL {})",
                config.feeds.len(),
                config.base_url()
            );
        }

        Command::Init { force } => {
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
            log::info!("Default config written to {}", config_path.display());
        }

        Command::Info => {
            let config = Config::load_or_default(&config_path);
            log::info!("Site directory: {}", cli.site_dir.display());
            log::info!(
                "Config: {}",
                if config_path.exists() {
                    "exists"
                } else {
                    "not found (using defaults)"
                }
            );
            log::info!("Base URL: {}", config.base_url());
            for feed in &config.feeds {
                log::info!("Feed: {}", feed);
            }

            let pages = storage
                .list_dir(POSTS_DIR)
                .await?
                .iter()
                .filter(|name| pipeline::page::PageName::parse(name).is_some())
                .count();
            log::info!("Rendered posts on disk: {}", pages);
        }
    }

    log::info!("Done!");

    Ok(())
}

/// Load the config (defaults when missing) and refuse to run on invalid values.
fn load_valid_config(path: &Path) -> Result<Config> {
    let config = if path.exists() {
        Config::load(path)?
    } else {
        log::warn!("No config at {}, using defaults", path.display());
        Config::default()
    };
    config
        .validate()
        .map_err(|e| AppError::config(format!("{}: {e}", path.display())))?;
    Ok(config)
}
