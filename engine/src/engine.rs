//! Pipeline facade.

use ratewatch_common::{CurrencyCode, RateRecord, RawRate};
use tracing::{debug, instrument};

use crate::filter::{self, FilterSet, PrimaryRule};
use crate::normalizer::{Normalizer, NormalizerPolicy};
use crate::view::{ViewProjector, Views};

/// Configuration for the rate engine.
#[derive(Debug, Clone)]
pub struct RateEngineConfig {
    /// Drop policy applied during normalization.
    pub normalizer: NormalizerPolicy,
    /// Provider given the fixed reference view.
    pub primary_provider: String,
    /// Currencies of the reference view, in display order.
    pub primary_currencies: Vec<CurrencyCode>,
    /// Keep primary-source rows in history when a provider is selected.
    pub history_pins_primary: bool,
    /// Show the primary source among the current rates, subject to the
    /// provider filter.
    pub current_includes_primary: bool,
}

impl Default for RateEngineConfig {
    fn default() -> Self {
        Self {
            normalizer: NormalizerPolicy::default(),
            primary_provider: "NBU".to_string(),
            primary_currencies: vec![CurrencyCode::usd(), CurrencyCode::eur()],
            history_pins_primary: false,
            current_includes_primary: false,
        }
    }
}

impl RateEngineConfig {
    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.primary_provider.is_empty() {
            return Err("Primary provider cannot be empty".to_string());
        }

        if self.primary_currencies.is_empty() {
            return Err("Primary currency set cannot be empty".to_string());
        }

        if self.primary_currencies.iter().any(CurrencyCode::is_empty) {
            return Err("Primary currency codes cannot be empty".to_string());
        }

        Ok(())
    }
}

/// Runs normalization and projection with a fixed configuration.
#[derive(Debug, Clone)]
pub struct RateEngine {
    normalizer: Normalizer,
    projector: ViewProjector,
    config: RateEngineConfig,
}

impl RateEngine {
    /// Create a new engine.
    pub fn new(config: RateEngineConfig) -> Self {
        let history_rule = if config.history_pins_primary {
            PrimaryRule::Pin
        } else {
            PrimaryRule::FollowFilter
        };
        let current_rule = if config.current_includes_primary {
            PrimaryRule::FollowFilter
        } else {
            PrimaryRule::Exclude
        };

        Self {
            normalizer: Normalizer::new(config.normalizer.clone()),
            projector: ViewProjector::new(
                config.primary_provider.clone(),
                config.primary_currencies.clone(),
                history_rule,
            )
            .with_current_rule(current_rule),
            config,
        }
    }

    /// Coerce raw records and drop policy-excluded ones.
    #[instrument(skip_all, fields(raw = raw.len()))]
    pub fn normalize(&self, raw: &[RawRate]) -> Vec<RateRecord> {
        let records = self.normalizer.normalize(raw);
        debug!(kept = records.len(), dropped = raw.len() - records.len(), "Normalized records");
        records
    }

    /// Build all three views under the given filters.
    #[instrument(skip_all, fields(records = records.len(), currency = %filters.currency, provider = %filters.provider))]
    pub fn project(&self, records: &[RateRecord], filters: &FilterSet) -> Views {
        let views = self.projector.project(records, filters);
        debug!(
            primary = views.primary_source.len(),
            current = views.current_rates.len(),
            history = views.history.len(),
            "Projected views"
        );
        views
    }

    /// Providers a user can filter by.
    pub fn provider_options(&self, records: &[RateRecord]) -> Vec<String> {
        filter::provider_options(records, &self.config.primary_provider)
    }

    /// Currencies a user can filter by.
    pub fn currency_options(&self, records: &[RateRecord]) -> Vec<CurrencyCode> {
        filter::currency_options(records)
    }
}

impl Default for RateEngine {
    fn default() -> Self {
        Self::new(RateEngineConfig::default())
    }
}
