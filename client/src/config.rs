//! Tracker configuration.

use std::str::FromStr;
use std::time::Duration;

use ratewatch_common::{constants, CurrencyCode, DurationExt};
use ratewatch_engine::RateEngineConfig;
use rust_decimal::Decimal;

/// Configuration for the rate tracker.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// URL of the rates endpoint.
    pub endpoint: String,
    /// Period between scheduled refreshes.
    pub refresh_interval: Duration,
    /// Timeout for a single fetch.
    pub request_timeout: Duration,
    /// Pipeline configuration.
    pub engine: RateEngineConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8000/rates/latest".to_string(),
            refresh_interval: constants::refresh_interval().as_std(),
            request_timeout: constants::request_timeout().as_std(),
            engine: RateEngineConfig::default(),
        }
    }
}

impl TrackerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from any variable lookup, starting from defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(endpoint) = lookup("RATES_ENDPOINT") {
            config.endpoint = endpoint;
        }

        if let Some(secs) = lookup("RATES_REFRESH_SECS") {
            if let Ok(secs) = secs.trim().parse() {
                config.refresh_interval = Duration::from_secs(secs);
            }
        }

        if let Some(secs) = lookup("RATES_REQUEST_TIMEOUT_SECS") {
            if let Ok(secs) = secs.trim().parse() {
                config.request_timeout = Duration::from_secs(secs);
            }
        }

        if let Some(provider) = lookup("RATES_PRIMARY_PROVIDER") {
            config.engine.primary_provider = provider;
        }

        if let Some(list) = lookup("RATES_PRIMARY_CURRENCIES") {
            config.engine.primary_currencies = parse_currency_list(&list);
        }

        if let Some(list) = lookup("RATES_EXCLUDED_CURRENCIES") {
            config.engine.normalizer.excluded_currencies = parse_currency_list(&list);
        }

        if let Some(provider) = lookup("RATES_CROSS_RATE_PROVIDER") {
            config.engine.normalizer.cross_rate_provider = provider;
        }

        if let Some(threshold) = lookup("RATES_CROSS_RATE_MIN_BUY") {
            if let Ok(threshold) = Decimal::from_str(threshold.trim()) {
                config.engine.normalizer.cross_rate_min_buy = threshold;
            }
        }

        if let Some(flag) = lookup("RATES_HISTORY_PINS_PRIMARY") {
            config.engine.history_pins_primary = parse_flag(&flag);
        }

        if let Some(flag) = lookup("RATES_CURRENT_INCLUDES_PRIMARY") {
            config.engine.current_includes_primary = parse_flag(&flag);
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.endpoint.trim().is_empty() {
            return Err("Rates endpoint cannot be empty".to_string());
        }

        if self.refresh_interval.is_zero() {
            return Err("Refresh interval cannot be zero".to_string());
        }

        if self.request_timeout.is_zero() {
            return Err("Request timeout cannot be zero".to_string());
        }

        self.engine.validate()
    }
}

fn parse_currency_list(list: &str) -> Vec<CurrencyCode> {
    list.split(',')
        .map(CurrencyCode::new)
        .filter(|code| !code.is_empty())
        .collect()
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
