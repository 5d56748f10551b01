//! songclash-challenge - challenge result report
//!
//! Reads the original player's and the challenger's result files, prints the
//! comparison report as JSON on stdout, resolving tracks through the catalog.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use songclash_challenge::catalog_client::CatalogClient;
use songclash_challenge::config::{resolve_catalog_settings, CatalogOverrides};
use songclash_challenge::lookup::{TimeoutLookup, TrackLookup};
use songclash_challenge::report::ChallengeReport;
use songclash_challenge::{ChallengeResults, EnrichmentController};
use songclash_common::config::{default_config_path, load_toml_config, TomlConfig};
use songclash_common::ResultSet;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for songclash-challenge
#[derive(Parser, Debug)]
#[command(name = "songclash-challenge")]
#[command(about = "Compare challenge results and resolve played tracks")]
#[command(version)]
struct Args {
    /// Original player's results (JSON array of rounds)
    original: PathBuf,

    /// Challenger's results (JSON array of rounds)
    player: PathBuf,

    /// TOML config file
    #[arg(short, long, env = "SONGCLASH_CONFIG")]
    config: Option<PathBuf>,

    /// Catalog base URL
    #[arg(long)]
    catalog_url: Option<String>,

    /// Catalog bearer token
    #[arg(long)]
    catalog_token: Option<String>,

    /// Per-lookup deadline in seconds (none by default)
    #[arg(long)]
    lookup_timeout: Option<u64>,

    /// Skip track lookups
    #[arg(long)]
    offline: bool,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().or_else(default_config_path);
    let toml_config = match &config_path {
        Some(path) => load_toml_config(path)?,
        None => TomlConfig::default(),
    };

    // Initialize tracing (RUST_LOG wins over the configured level)
    let default_filter = format!(
        "songclash_challenge={level},songclash_common={level}",
        level = toml_config.logging.level
    );
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting songclash-challenge {}", env!("CARGO_PKG_VERSION"));
    match &config_path {
        Some(path) if path.exists() => info!("Config: {}", path.display()),
        _ => info!("No config file; using defaults"),
    }

    let original = ResultSet::from_json_file(&args.original)?;
    let player = ResultSet::from_json_file(&args.player)?;
    let results = ChallengeResults::new(original, player).context("Invalid challenge results")?;

    let controller = Arc::new(EnrichmentController::new());

    if !args.offline {
        let overrides = CatalogOverrides {
            base_url: args.catalog_url.clone(),
            api_token: args.catalog_token.clone(),
        };
        let settings = resolve_catalog_settings(&overrides, &toml_config);
        info!("Catalog: {}", settings.base_url);

        let client = CatalogClient::new(&settings)?;
        let lookup: Arc<dyn TrackLookup> = match args.lookup_timeout {
            Some(secs) => Arc::new(TimeoutLookup::new(client, Duration::from_secs(secs))),
            None => Arc::new(client),
        };

        controller
            .spawn(Arc::clone(results.original()), lookup)
            .await
            .context("Enrichment task panicked")?;
    }

    let state = controller.state();
    let report = ChallengeReport::build(&results, &state)?;
    if let songclash_challenge::report::TrackDetail::Unavailable { reason } = &report.track_detail {
        warn!("Track detail unavailable: {}", reason);
    }
    info!("{}", report.summary());

    let json = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", json);

    Ok(())
}
