use crate::error::PortalResult;
use serde::Deserialize;

/// Root application configuration. Loaded from environment variables
/// with the prefix `PESTOPS__` and an optional TOML/YAML config file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_node_id")]
    pub node_id: String,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

/// Where the record snapshots come from.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Directory holding `customers.json`, `cases.json` and
    /// `monthly_spend.json`. When unset the in-memory store is used.
    #[serde(default)]
    pub snapshot_dir: Option<String>,
    #[serde(default = "default_seed_demo_data")]
    pub seed_demo_data: bool,
}

/// Defaults for report requests that do not specify their own parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default = "default_reporting_window_days")]
    pub reporting_window_days: u32,
    #[serde(default = "default_trailing_period_days")]
    pub trailing_period_days: u32,
    #[serde(default = "default_projection_years")]
    pub projection_years: u32,
    #[serde(default = "default_upsell_top_k")]
    pub upsell_top_k: usize,
    #[serde(default = "default_upsell_lookback_months")]
    pub upsell_lookback_months: u32,
}

// Default functions
fn default_node_id() -> String {
    "portal-01".to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    8080
}
fn default_metrics_enabled() -> bool {
    true
}
fn default_metrics_port() -> u16 {
    9091
}
fn default_seed_demo_data() -> bool {
    true
}
fn default_reporting_window_days() -> u32 {
    365
}
fn default_trailing_period_days() -> u32 {
    30
}
fn default_projection_years() -> u32 {
    3
}
fn default_upsell_top_k() -> usize {
    10
}
fn default_upsell_lookback_months() -> u32 {
    6
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
            port: default_metrics_port(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            snapshot_dir: None,
            seed_demo_data: default_seed_demo_data(),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            reporting_window_days: default_reporting_window_days(),
            trailing_period_days: default_trailing_period_days(),
            projection_years: default_projection_years(),
            upsell_top_k: default_upsell_top_k(),
            upsell_lookback_months: default_upsell_lookback_months(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            api: ApiConfig::default(),
            metrics: MetricsConfig::default(),
            store: StoreConfig::default(),
            analytics: AnalyticsConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables only.
    pub fn load() -> PortalResult<Self> {
        Self::load_from(None)
    }

    /// Load configuration from an optional file, then environment variables.
    /// Environment values win over the file.
    pub fn load_from(path: Option<&str>) -> PortalResult<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }
        let builder = builder.add_source(
            config::Environment::with_prefix("PESTOPS")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }
}
