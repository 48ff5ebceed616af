//! Application settings loaded from config.toml
//!
//! Every section has built-in defaults, so the file only needs to list what
//! differs. Secrets (the classifier API key, the database URL) come from the
//! environment and are never read from this file.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener settings
    pub server: ServerConfig,
    /// Points and listing limits
    pub rewards: RewardsConfig,
    /// Image classifier endpoint and model fallback order
    pub classifier: ClassifierConfig,
    /// Location autocomplete endpoint
    pub geocoder: GeocoderConfig,
    /// Redeemable rewards seeded on startup
    pub catalog: Vec<CatalogEntry>,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Points awarded per action and default page sizes
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RewardsConfig {
    /// Points credited for each submitted report
    pub report_points: i64,
    /// Points needed per leaderboard level
    pub level_step: i64,
    /// How many ledger entries the history view returns
    pub history_limit: u64,
    /// Default size of the recent reports list
    pub recent_reports_limit: u64,
    /// Default size of the collection task list
    pub task_limit: u64,
}

impl Default for RewardsConfig {
    fn default() -> Self {
        Self {
            report_points: 10,
            level_step: 20,
            history_limit: 10,
            recent_reports_limit: 10,
            task_limit: 20,
        }
    }
}

/// Image classifier settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Base URL of the generative language API
    pub endpoint: String,
    /// Models tried in order until one answers
    pub models: Vec<String>,
    /// Apply the quantity magnitude correction to model estimates
    pub correct_quantity: bool,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            models: [
                "gemini-2.0-flash",
                "gemini-2.5-flash",
                "gemini-2.5-pro",
                "gemini-2.0-flash-001",
                "gemini-2.0-flash-lite",
                "gemini-2.0-flash-exp",
                "gemini-2.0-flash-lite-preview-02-05",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            correct_quantity: true,
            timeout_secs: 30,
        }
    }
}

/// Geocoder settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    /// Base URL of the Nominatim-compatible service
    pub endpoint: String,
    /// Maximum suggestions per query
    pub result_limit: u32,
    /// Queries shorter than this are not sent
    pub min_query_len: usize,
    /// User-Agent sent upstream, required by the Nominatim usage policy
    pub user_agent: String,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://nominatim.openstreetmap.org".to_string(),
            result_limit: 5,
            min_query_len: 3,
            user_agent: concat!("waste-rewards/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// A redeemable catalog reward
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    /// Display name, also the seeding key
    pub name: String,
    /// Points required to redeem
    pub points: i64,
    /// Longer description
    #[serde(default)]
    pub description: Option<String>,
    /// How the reward is handed out
    #[serde(default)]
    pub collection_info: String,
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A field has the wrong type
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Loads configuration from `CONFIG_PATH` (default `./config.toml`).
///
/// A missing file is not an error: the built-in defaults are used instead.
/// A file that exists but does not parse is.
pub fn load_app_config() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());

    if !Path::new(&path).exists() {
        warn!("Config file {} not found, using defaults", path);
        return Ok(AppConfig::default());
    }

    let config = load_config(&path)?;
    info!(
        "Loaded configuration from {} ({} catalog rewards)",
        path,
        config.catalog.len()
    );
    Ok(config)
}
