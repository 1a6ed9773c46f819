//! Rate records and the wire payload they arrive in.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::currency::CurrencyCode;
use crate::time::{epoch_millis, parse_timestamp, ObservedAt};

/// A single bid/ask observation from one provider, after normalization.
///
/// Records are immutable once ingested. Pipeline stages clone records into
/// new collections instead of editing them in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateRecord {
    /// Provider name, compared case-sensitively.
    pub provider: String,
    /// Normalized currency code.
    pub currency: CurrencyCode,
    /// Price at which the provider buys the currency.
    pub buy: Decimal,
    /// Price at which the provider sells the currency.
    pub sell: Decimal,
    /// Observation time as received. May be empty or malformed.
    pub observed_at: String,
}

impl RateRecord {
    /// Create a new rate record.
    pub fn new(
        provider: impl Into<String>,
        currency: CurrencyCode,
        buy: Decimal,
        sell: Decimal,
        observed_at: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            currency,
            buy,
            sell,
            observed_at: observed_at.into(),
        }
    }

    /// Zero-valued stand-in used when a provider has no data for a currency.
    pub fn placeholder(provider: impl Into<String>, currency: CurrencyCode) -> Self {
        Self::new(provider, currency, Decimal::ZERO, Decimal::ZERO, "")
    }

    /// Parsed observation time, `None` if it cannot be parsed.
    pub fn observed(&self) -> ObservedAt {
        parse_timestamp(&self.observed_at)
    }

    /// Observation time in epoch milliseconds, `0` if it cannot be parsed.
    pub fn observed_millis(&self) -> i64 {
        epoch_millis(self.observed())
    }

    /// Grouping key used by the recency reducer.
    pub fn group_key(&self) -> (&str, &CurrencyCode) {
        (self.provider.as_str(), &self.currency)
    }
}

/// A record as it arrives from the data source, before any coercion.
///
/// Every field is optional and loosely typed. Both the historical wire names
/// (`bank`, `date`) and the descriptive names (`provider`, `observedAt`) are
/// accepted. When a record carries both, the first non-null one in
/// [`PROVIDER_FIELDS`] / [`DATE_FIELDS`] order is used.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct RawRate {
    pub bank: Option<Value>,
    pub currency: Option<Value>,
    pub buy: Option<Value>,
    pub sell: Option<Value>,
    pub date: Option<Value>,
}

/// Accepted names for the provider field, in lookup order.
pub const PROVIDER_FIELDS: &[&str] = &["bank", "provider"];

/// Accepted names for the observation time, in lookup order.
pub const DATE_FIELDS: &[&str] = &["date", "observedAt", "observed_at"];

impl RawRate {
    /// Read a raw record out of an arbitrary JSON value.
    ///
    /// Anything that is not an object yields a record with every field
    /// missing; the normalizer decides what to do with it.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self::from(fields),
            _ => Self::default(),
        }
    }
}

impl From<Map<String, Value>> for RawRate {
    fn from(mut fields: Map<String, Value>) -> Self {
        Self {
            bank: take_field(&mut fields, PROVIDER_FIELDS),
            currency: take_field(&mut fields, &["currency"]),
            buy: take_field(&mut fields, &["buy"]),
            sell: take_field(&mut fields, &["sell"]),
            date: take_field(&mut fields, DATE_FIELDS),
        }
    }
}

// Null counts as missing, so a null name falls through to its alias.
fn take_field(fields: &mut Map<String, Value>, names: &[&str]) -> Option<Value> {
    names
        .iter()
        .filter_map(|name| fields.remove(*name))
        .find(|value| !value.is_null())
}

/// Response body of the rates endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RatesPayload {
    #[serde(default)]
    pub rates: Vec<Value>,
}

impl RatesPayload {
    /// Parse a payload from raw bytes.
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// Split the payload into raw records.
    pub fn into_raw_rates(self) -> Vec<RawRate> {
        self.rates.into_iter().map(RawRate::from_value).collect()
    }
}
