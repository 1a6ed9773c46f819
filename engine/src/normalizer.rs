//! Raw record cleanup.

use std::str::FromStr;

use ratewatch_common::{CurrencyCode, RateRecord, RawRate};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

/// Rules deciding which raw records never reach the pipeline.
#[derive(Debug, Clone)]
pub struct NormalizerPolicy {
    /// Currencies dropped outright.
    pub excluded_currencies: Vec<CurrencyCode>,
    /// Provider whose feed mixes cross-rate quotes into its bid/ask pairs.
    pub cross_rate_provider: String,
    /// Quotes from `cross_rate_provider` with `buy` below this are cross-rates.
    pub cross_rate_min_buy: Decimal,
}

impl Default for NormalizerPolicy {
    fn default() -> Self {
        Self {
            excluded_currencies: vec![CurrencyCode::rub()],
            cross_rate_provider: "Monobank".to_string(),
            cross_rate_min_buy: Decimal::TEN,
        }
    }
}

/// Why a record was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Currency is on the exclusion list.
    ExcludedCurrency,
    /// Low `buy` from the cross-rate provider.
    CrossRate,
}

/// Coerces raw records into [`RateRecord`]s and applies the drop policy.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    policy: NormalizerPolicy,
}

impl Normalizer {
    /// Create a normalizer with the given policy.
    pub fn new(policy: NormalizerPolicy) -> Self {
        Self { policy }
    }

    /// Normalize a batch, keeping input order.
    pub fn normalize(&self, raw: &[RawRate]) -> Vec<RateRecord> {
        raw.iter()
            .filter_map(|r| match self.normalize_one(r) {
                Ok(record) => Some(record),
                Err(reason) => {
                    debug!(?reason, provider = ?r.bank, currency = ?r.currency, "Dropping record");
                    None
                }
            })
            .collect()
    }

    /// Normalize a single record.
    ///
    /// Malformed non-key fields never cause a drop; they are coerced.
    pub fn normalize_one(&self, raw: &RawRate) -> Result<RateRecord, DropReason> {
        let record = RateRecord::new(
            coerce_string(raw.bank.as_ref()),
            CurrencyCode::new(coerce_string(raw.currency.as_ref())),
            coerce_decimal(raw.buy.as_ref()),
            coerce_decimal(raw.sell.as_ref()),
            coerce_string(raw.date.as_ref()),
        );

        if self.policy.excluded_currencies.contains(&record.currency) {
            return Err(DropReason::ExcludedCurrency);
        }

        if record.provider == self.policy.cross_rate_provider
            && record.buy < self.policy.cross_rate_min_buy
        {
            return Err(DropReason::CrossRate);
        }

        Ok(record)
    }
}

/// Read a number out of a loosely typed field. Anything non-numeric is `0`.
pub fn coerce_decimal(value: Option<&Value>) -> Decimal {
    match value {
        Some(Value::Number(n)) => parse_decimal(&n.to_string()),
        Some(Value::String(s)) => parse_decimal(s),
        _ => Decimal::ZERO,
    }
}

/// Read text out of a loosely typed field. Missing or structured values are empty.
pub fn coerce_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn parse_decimal(text: &str) -> Decimal {
    let text = text.trim();
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn raw(value: Value) -> RawRate {
        RawRate::from_value(value)
    }

    #[test]
    fn test_coerce_decimal() {
        assert_eq!(coerce_decimal(Some(&json!(27.5))), dec!(27.5));
        assert_eq!(coerce_decimal(Some(&json!(" 41.20 "))), dec!(41.20));
        assert_eq!(coerce_decimal(Some(&json!("1e1"))), dec!(10));
        assert_eq!(coerce_decimal(Some(&json!("n/a"))), dec!(0));
        assert_eq!(coerce_decimal(Some(&json!(true))), dec!(0));
        assert_eq!(coerce_decimal(Some(&Value::Null)), dec!(0));
        assert_eq!(coerce_decimal(None), dec!(0));
    }

    #[test]
    fn test_coerce_string() {
        assert_eq!(coerce_string(Some(&json!("NBU"))), "NBU");
        assert_eq!(coerce_string(Some(&json!(840))), "840");
        assert_eq!(coerce_string(Some(&json!({"a": 1}))), "");
        assert_eq!(coerce_string(None), "");
    }

    #[test]
    fn test_missing_fields_default() {
        let normalizer = Normalizer::default();
        let record = normalizer
            .normalize_one(&raw(json!({"bank": "PrivatBank", "currency": "usd"})))
            .unwrap();

        assert_eq!(record.provider, "PrivatBank");
        assert_eq!(record.currency, CurrencyCode::usd());
        assert_eq!(record.buy, dec!(0));
        assert_eq!(record.sell, dec!(0));
        assert_eq!(record.observed_at, "");
    }

    #[test]
    fn test_excluded_currency_any_case() {
        let normalizer = Normalizer::default();
        let result = normalizer.normalize_one(&raw(json!({
            "bank": "PrivatBank", "currency": " rub", "buy": 0.3, "sell": 0.4
        })));
        assert_eq!(result, Err(DropReason::ExcludedCurrency));
    }

    #[test]
    fn test_cross_rate_dropped_only_for_designated_provider() {
        let normalizer = Normalizer::default();

        let cross = raw(json!({"bank": "Monobank", "currency": "USD", "buy": 5.0, "sell": 6.0}));
        assert_eq!(normalizer.normalize_one(&cross), Err(DropReason::CrossRate));

        let at_threshold = raw(json!({"bank": "Monobank", "currency": "USD", "buy": 10, "sell": 11}));
        assert!(normalizer.normalize_one(&at_threshold).is_ok());

        let other = raw(json!({"bank": "PrivatBank", "currency": "USD", "buy": 5.0, "sell": 6.0}));
        assert!(normalizer.normalize_one(&other).is_ok());

        let other_case = raw(json!({"bank": "monobank", "currency": "USD", "buy": 5.0, "sell": 6.0}));
        assert!(normalizer.normalize_one(&other_case).is_ok());
    }

    #[test]
    fn test_missing_buy_from_cross_rate_provider_is_dropped() {
        let normalizer = Normalizer::default();
        let record = raw(json!({"bank": "Monobank", "currency": "EUR", "sell": 44.1}));
        assert_eq!(normalizer.normalize_one(&record), Err(DropReason::CrossRate));
    }

    #[test]
    fn test_normalize_keeps_order() {
        let normalizer = Normalizer::new(NormalizerPolicy {
            excluded_currencies: vec![],
            cross_rate_provider: "X".to_string(),
            cross_rate_min_buy: dec!(1),
        });
        let batch = vec![
            raw(json!({"bank": "B", "currency": "eur", "buy": 2})),
            raw(json!({"bank": "X", "currency": "usd", "buy": 0.5})),
            raw(json!({"bank": "A", "currency": "usd", "buy": 3})),
        ];

        let records = normalizer.normalize(&batch);
        let providers: Vec<_> = records.iter().map(|r| r.provider.as_str()).collect();
        assert_eq!(providers, vec!["B", "A"]);
    }
}
