//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::net::TcpListener;
use tracing::info;

use assetlens_core::EnhancedScraper;
use assetlens_shared::{AppConfig, init_config, load_config, load_config_from};

use crate::routes::{AppState, router};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// AssetLens: scrape pages into LLM-ready text with their visual assets.
#[derive(Parser)]
#[command(
    name = "assetlens",
    version,
    about = "Extract visual assets from HTML and scrape URLs into enriched, LLM-ready documents.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.assetlens/assetlens.toml.
    #[arg(long, global = true, env = "ASSETLENS_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run the HTTP service.
    Serve {
        /// Address to listen on (overrides `[server] bind`).
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Extract the asset manifest of a local HTML file.
    Extract {
        /// HTML file to read.
        file: PathBuf,

        /// Page URL used to resolve relative references.
        #[arg(short, long)]
        url: Option<String>,
    },

    /// Scrape a URL through the provider and print the fused document.
    Scrape {
        /// Page to scrape.
        url: String,

        /// Print the structured view as JSON instead of formatted text.
        #[arg(long)]
        json: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "assetlens=info",
        1 => "assetlens=debug,tower_http=debug",
        _ => "assetlens=trace,tower_http=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Command::Serve { bind } => cmd_serve(config_path, bind).await,
        Command::Extract { file, url } => cmd_extract(&file, url.as_deref()).await,
        Command::Scrape { url, json } => cmd_scrape(config_path, &url, json).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(config_path).await,
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    };
    Ok(config)
}

// ---------------------------------------------------------------------------
// serve
// ---------------------------------------------------------------------------

async fn cmd_serve(config_path: Option<&Path>, bind: Option<String>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let bind = bind.unwrap_or_else(|| config.server.bind.clone());

    // A missing API key only fails scrape requests, not startup.
    if config.provider.api_key().is_err() {
        tracing::warn!(
            var = %config.provider.api_key_env,
            "provider API key not set; /scrape-url-enhanced will fail until it is"
        );
    }

    let scraper = EnhancedScraper::from_config(&config)?;
    let app = router(AppState::new(scraper));

    let listener = TcpListener::bind(&bind)
        .await
        .wrap_err_with(|| format!("failed to bind {bind}"))?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}

// ---------------------------------------------------------------------------
// extract
// ---------------------------------------------------------------------------

async fn cmd_extract(file: &Path, url: Option<&str>) -> Result<()> {
    let html = tokio::fs::read_to_string(file)
        .await
        .wrap_err_with(|| format!("failed to read {}", file.display()))?;

    let assets = assetlens_extractor::extract(&html, url)?;
    println!("{}", serde_json::to_string_pretty(&assets)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// scrape
// ---------------------------------------------------------------------------

async fn cmd_scrape(config_path: Option<&Path>, url: &str, json: bool) -> Result<()> {
    let config = resolve_config(config_path)?;
    let scraper = EnhancedScraper::from_config(&config)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")?
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(format!("Scraping {url}"));

    let result = scraper.scrape_enhanced(url).await;
    spinner.finish_and_clear();

    let outcome = result.map_err(|e| eyre!("scrape failed: {e}"))?;
    info!(
        elapsed_ms = outcome.elapsed.as_millis(),
        cached = outcome.cached,
        "scrape finished"
    );

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&outcome.document.structured)?
        );
    } else {
        println!("{}", outcome.document.formatted_text);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
