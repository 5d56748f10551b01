//! Catalog settings resolution
//!
//! **Priority:** CLI → ENV → TOML → compiled default

use songclash_common::config::TomlConfig;
use std::time::Duration;
use tracing::{info, warn};

/// Environment override for the catalog bearer token
pub const ENV_CATALOG_TOKEN: &str = "SONGCLASH_CATALOG_TOKEN";
/// Environment override for the catalog base URL
pub const ENV_CATALOG_URL: &str = "SONGCLASH_CATALOG_URL";

/// Effective catalog client settings
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSettings {
    pub base_url: String,
    pub api_token: Option<String>,
    pub timeout: Duration,
    /// 0 disables client-side rate limiting
    pub requests_per_second: u32,
}

impl CatalogSettings {
    /// Settings straight from a TOML config, no overrides
    pub fn from_toml(config: &TomlConfig) -> Self {
        Self {
            base_url: config.catalog.base_url.clone(),
            api_token: config.catalog.api_token.clone().filter(|t| is_valid_token(t)),
            timeout: Duration::from_secs(config.catalog.timeout_secs),
            requests_per_second: config.catalog.requests_per_second,
        }
    }
}

/// Command-line overrides (highest priority)
#[derive(Debug, Clone, Default)]
pub struct CatalogOverrides {
    pub base_url: Option<String>,
    pub api_token: Option<String>,
}

/// Resolve catalog settings from CLI overrides, environment and TOML
pub fn resolve_catalog_settings(cli: &CatalogOverrides, toml_config: &TomlConfig) -> CatalogSettings {
    let mut settings = CatalogSettings::from_toml(toml_config);

    let env_url = std::env::var(ENV_CATALOG_URL).ok().filter(|u| !u.trim().is_empty());
    if let Some(url) = cli.base_url.clone().or(env_url) {
        settings.base_url = url;
    }

    let cli_token = cli.api_token.clone().filter(|t| is_valid_token(t));
    let env_token = std::env::var(ENV_CATALOG_TOKEN).ok().filter(|t| is_valid_token(t));

    let sources: Vec<&str> = [
        cli_token.as_ref().map(|_| "command line"),
        env_token.as_ref().map(|_| "environment"),
        settings.api_token.as_ref().map(|_| "TOML"),
    ]
    .into_iter()
    .flatten()
    .collect();

    if sources.len() > 1 {
        warn!(
            "Catalog token found in multiple sources: {}. Using {}.",
            sources.join(", "),
            sources[0]
        );
    }

    settings.api_token = cli_token.or(env_token).or(settings.api_token);

    match sources.first() {
        Some(source) => info!("Catalog token loaded from {}", source),
        None => warn!(
            "No catalog token configured; requests will be sent unauthenticated. \
             Set {} or [catalog] api_token in the TOML config.",
            ENV_CATALOG_TOKEN
        ),
    }

    settings
}

/// Validate token (non-empty, non-whitespace)
pub fn is_valid_token(token: &str) -> bool {
    !token.trim().is_empty()
}
