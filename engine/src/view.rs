//! View projection.

use std::fmt;

use ratewatch_common::{CurrencyCode, RateRecord};
use serde::Serialize;

use crate::extremum::Extrema;
use crate::filter::{self, FilterSet, PrimaryRule};
use crate::reducer::latest_per_group;

/// Identifies one of the projected views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewId {
    /// Fixed-size reference rows from the primary source.
    PrimarySource,
    /// Latest rate per provider and currency, with highlights.
    CurrentRates,
    /// Every filtered observation.
    History,
}

impl ViewId {
    pub const ALL: [ViewId; 3] = [ViewId::PrimarySource, ViewId::CurrentRates, ViewId::History];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewId::PrimarySource => "primary_source",
            ViewId::CurrentRates => "current_rates",
            ViewId::History => "history",
        }
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A projected row: the record plus highlight flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateRow {
    #[serde(flatten)]
    pub record: RateRecord,
    pub is_best_buy: bool,
    pub is_worst_sell: bool,
}

impl RateRow {
    /// A row without highlights.
    pub fn plain(record: RateRecord) -> Self {
        Self {
            record,
            is_best_buy: false,
            is_worst_sell: false,
        }
    }
}

/// The three projected views.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Views {
    pub primary_source: Vec<RateRow>,
    pub current_rates: Vec<RateRow>,
    pub history: Vec<RateRow>,
}

impl Views {
    /// Rows of one view.
    pub fn rows(&self, view: ViewId) -> &[RateRow] {
        match view {
            ViewId::PrimarySource => &self.primary_source,
            ViewId::CurrentRates => &self.current_rates,
            ViewId::History => &self.history,
        }
    }

    /// Mutable rows of one view, for reordering.
    pub fn rows_mut(&mut self, view: ViewId) -> &mut Vec<RateRow> {
        match view {
            ViewId::PrimarySource => &mut self.primary_source,
            ViewId::CurrentRates => &mut self.current_rates,
            ViewId::History => &mut self.history,
        }
    }
}

/// Builds the views from normalized records.
#[derive(Debug, Clone)]
pub struct ViewProjector {
    primary_provider: String,
    primary_currencies: Vec<CurrencyCode>,
    current_rule: PrimaryRule,
    history_rule: PrimaryRule,
}

impl ViewProjector {
    /// Create a projector. The current-rates view excludes the primary
    /// source; use [`ViewProjector::with_current_rule`] to change that.
    pub fn new(
        primary_provider: impl Into<String>,
        primary_currencies: Vec<CurrencyCode>,
        history_rule: PrimaryRule,
    ) -> Self {
        Self {
            primary_provider: primary_provider.into(),
            primary_currencies,
            current_rule: PrimaryRule::Exclude,
            history_rule,
        }
    }

    /// Set how the current-rates view treats the primary source.
    pub fn with_current_rule(mut self, rule: PrimaryRule) -> Self {
        self.current_rule = rule;
        self
    }

    /// Build all three views.
    pub fn project(&self, records: &[RateRecord], filters: &FilterSet) -> Views {
        Views {
            primary_source: self.primary_view(records),
            current_rates: self.current_view(records, filters),
            history: self.history_view(records, filters),
        }
    }

    /// One row per fixed currency, latest primary-source record or a
    /// zero placeholder. Filters do not apply.
    pub fn primary_view(&self, records: &[RateRecord]) -> Vec<RateRow> {
        let latest = latest_per_group(&filter::from_provider(records, &self.primary_provider));

        self.primary_currencies
            .iter()
            .map(|currency| {
                latest
                    .iter()
                    .find(|r| &r.currency == currency)
                    .cloned()
                    .unwrap_or_else(|| {
                        RateRecord::placeholder(self.primary_provider.clone(), currency.clone())
                    })
            })
            .map(RateRow::plain)
            .collect()
    }

    /// Latest record per provider and currency, with highlights.
    pub fn current_view(&self, records: &[RateRecord], filters: &FilterSet) -> Vec<RateRow> {
        let filtered = filter::apply(records, filters, &self.primary_provider, self.current_rule);
        let latest = latest_per_group(&filtered);
        let extrema = Extrema::track(&latest);

        latest
            .into_iter()
            .map(|record| RateRow {
                is_best_buy: extrema.is_best_buy(&record),
                is_worst_sell: extrema.is_worst_sell(&record),
                record,
            })
            .collect()
    }

    /// Every filtered record, in input order, without highlights.
    pub fn history_view(&self, records: &[RateRecord], filters: &FilterSet) -> Vec<RateRow> {
        filter::apply(records, filters, &self.primary_provider, self.history_rule)
            .into_iter()
            .map(RateRow::plain)
            .collect()
    }
}

impl Default for ViewProjector {
    fn default() -> Self {
        Self::new(
            "NBU",
            vec![CurrencyCode::usd(), CurrencyCode::eur()],
            PrimaryRule::FollowFilter,
        )
    }
}
