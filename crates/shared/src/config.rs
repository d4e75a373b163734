//! Application configuration management.
//!
//! The shop-facing sections mirror what the admin UI persists. They are
//! kept as plain strings here and validated into domain types by
//! `currex-core` at startup.

use std::collections::HashMap;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Exchange-rate provider and refresh configuration.
    #[serde(default)]
    pub rates: RatesConfig,
    /// Shop currency configuration.
    #[serde(default)]
    pub shop: ShopConfig,
    /// Visitor session configuration.
    #[serde(default)]
    pub session: SessionConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Bearer token for administrative routes. Admin routes are closed when unset.
    #[serde(default)]
    pub admin_token: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            admin_token: None,
        }
    }
}

/// Exchange-rate provider configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RatesConfig {
    /// Base URL of the rate API; `/latest/{BASE}` is appended.
    #[serde(default = "default_provider_base_url")]
    pub provider_base_url: String,
    /// Timeout for a single fetch, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Client identifier sent as the User-Agent header.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Scheduler tick interval, in seconds.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    /// Age after which the table is considered stale, in seconds.
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,
    /// Where the last good table is persisted between restarts.
    #[serde(default)]
    pub snapshot_path: Option<String>,
}

fn default_provider_base_url() -> String {
    "https://open.er-api.com/v6".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_user_agent() -> String {
    format!("currex/{}", env!("CARGO_PKG_VERSION"))
}

fn default_refresh_interval_secs() -> u64 {
    86_400 // daily
}

fn default_max_age_secs() -> u64 {
    86_400
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            provider_base_url: default_provider_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            refresh_interval_secs: default_refresh_interval_secs(),
            max_age_secs: default_max_age_secs(),
            snapshot_path: None,
        }
    }
}

/// Display settings for one currency as stored by the admin UI.
///
/// Missing fields take the shop defaults (left, 2, ",", ".").
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DisplayConfig {
    /// One of `left`, `right`, `left_space`, `right_space`.
    #[serde(default)]
    pub position: Option<String>,
    /// Number of decimal places.
    #[serde(default)]
    pub decimals: Option<u32>,
    /// Thousands separator.
    #[serde(default)]
    pub thousand_sep: Option<String>,
    /// Decimal separator.
    #[serde(default)]
    pub decimal_sep: Option<String>,
}

/// Shop currency configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ShopConfig {
    /// The shop's base currency; rates are stored relative to it.
    #[serde(default = "default_base_currency")]
    pub base_currency: String,
    /// Currencies offered to visitors, in display order.
    #[serde(default = "default_enabled_currencies")]
    pub enabled_currencies: Vec<String>,
    /// Currency used when nothing else decides.
    #[serde(default)]
    pub default_currency: Option<String>,
    /// Detect the visitor's currency from their country on first visit.
    #[serde(default)]
    pub auto_detect: bool,
    /// Re-run detection on every request for sessions that were auto-detected.
    #[serde(default)]
    pub geo_redetect: bool,
    /// Per-currency display settings keyed by currency code.
    #[serde(default)]
    pub display: HashMap<String, DisplayConfig>,
    /// Country code to currency code overrides.
    #[serde(default)]
    pub country_overrides: HashMap<String, String>,
    /// Payment gateway id to the currencies it accepts.
    #[serde(default)]
    pub gateway_restrictions: HashMap<String, Vec<String>>,
    /// Alternative currency dataset (JSON). The bundled dataset is used when unset.
    #[serde(default)]
    pub currency_dataset_path: Option<String>,
    /// Request header carrying the visitor's country code.
    #[serde(default = "default_geo_header")]
    pub geo_header: String,
}

fn default_base_currency() -> String {
    "USD".to_string()
}

fn default_enabled_currencies() -> Vec<String> {
    vec![default_base_currency()]
}

fn default_geo_header() -> String {
    "CF-IPCountry".to_string()
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            base_currency: default_base_currency(),
            enabled_currencies: default_enabled_currencies(),
            default_currency: None,
            auto_detect: false,
            geo_redetect: false,
            display: HashMap::new(),
            country_overrides: HashMap::new(),
            gateway_restrictions: HashMap::new(),
            currency_dataset_path: None,
            geo_header: default_geo_header(),
        }
    }
}

/// Visitor session configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Name of the cookie remembering the visitor's currency.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Cookie lifetime in days.
    #[serde(default = "default_cookie_ttl_days")]
    pub cookie_ttl_days: i64,
    /// Query parameter used to switch currency explicitly.
    #[serde(default = "default_query_param")]
    pub query_param: String,
}

fn default_cookie_name() -> String {
    "currex_currency".to_string()
}

fn default_cookie_ttl_days() -> i64 {
    30
}

fn default_query_param() -> String {
    "currency".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            cookie_ttl_days: default_cookie_ttl_days(),
            query_param: default_query_param(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("CURREX")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("shop.enabled_currencies"),
            )
            .build()?;

        config.try_deserialize()
    }
}
