//! Currency and provider predicates.
//!
//! Every function here keeps the relative order of its input.

use ratewatch_common::{CurrencyCode, CurrencyFilter, ProviderFilter, RateRecord};

/// The user's current filter choices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    pub currency: CurrencyFilter,
    pub provider: ProviderFilter,
}

impl FilterSet {
    /// Create a filter set.
    pub fn new(currency: CurrencyFilter, provider: ProviderFilter) -> Self {
        Self { currency, provider }
    }

    /// Check the currency predicate.
    pub fn currency_matches(&self, record: &RateRecord) -> bool {
        self.currency.matches(&record.currency)
    }

    /// Check the provider predicate.
    pub fn provider_matches(&self, record: &RateRecord) -> bool {
        self.provider.matches(&record.provider)
    }
}

/// How a view treats the primary source relative to the provider filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryRule {
    /// Primary-source records never appear.
    Exclude,
    /// Primary-source records are filtered like any other provider.
    FollowFilter,
    /// Primary-source records bypass the provider filter.
    Pin,
}

/// Apply both predicates, treating `primary` according to `rule`.
pub fn apply(
    records: &[RateRecord],
    filters: &FilterSet,
    primary: &str,
    rule: PrimaryRule,
) -> Vec<RateRecord> {
    records
        .iter()
        .filter(|r| filters.currency_matches(r))
        .filter(|r| {
            let is_primary = r.provider == primary;
            match rule {
                PrimaryRule::Exclude => !is_primary && filters.provider_matches(r),
                PrimaryRule::FollowFilter => filters.provider_matches(r),
                PrimaryRule::Pin => is_primary || filters.provider_matches(r),
            }
        })
        .cloned()
        .collect()
}

/// Records from one provider only.
pub fn from_provider(records: &[RateRecord], provider: &str) -> Vec<RateRecord> {
    records
        .iter()
        .filter(|r| r.provider == provider)
        .cloned()
        .collect()
}

/// Distinct non-primary providers, in first-seen order.
pub fn provider_options(records: &[RateRecord], primary: &str) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for record in records {
        if record.provider != primary
            && !record.provider.is_empty()
            && !seen.contains(&record.provider)
        {
            seen.push(record.provider.clone());
        }
    }
    seen
}

/// Distinct currency codes, in first-seen order.
pub fn currency_options(records: &[RateRecord]) -> Vec<CurrencyCode> {
    let mut seen: Vec<CurrencyCode> = Vec::new();
    for record in records {
        if !record.currency.is_empty() && !seen.contains(&record.currency) {
            seen.push(record.currency.clone());
        }
    }
    seen
}
