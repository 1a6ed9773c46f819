//! Best-buy / worst-sell tracking per currency.

use std::collections::HashMap;

use ratewatch_common::{CurrencyCode, RateRecord};
use rust_decimal::Decimal;

/// Per-currency extremes over a reduced record set.
#[derive(Debug, Clone, Default)]
pub struct Extrema {
    best_buy: HashMap<CurrencyCode, Decimal>,
    worst_sell: HashMap<CurrencyCode, Decimal>,
}

impl Extrema {
    /// Compute the highest `buy` and lowest `sell` for each currency.
    pub fn track(records: &[RateRecord]) -> Self {
        let mut extrema = Self::default();

        for record in records {
            extrema
                .best_buy
                .entry(record.currency.clone())
                .and_modify(|best| *best = (*best).max(record.buy))
                .or_insert(record.buy);
            extrema
                .worst_sell
                .entry(record.currency.clone())
                .and_modify(|worst| *worst = (*worst).min(record.sell))
                .or_insert(record.sell);
        }

        extrema
    }

    /// Highest `buy` seen for a currency.
    pub fn best_buy(&self, currency: &CurrencyCode) -> Option<Decimal> {
        self.best_buy.get(currency).copied()
    }

    /// Lowest `sell` seen for a currency.
    pub fn worst_sell(&self, currency: &CurrencyCode) -> Option<Decimal> {
        self.worst_sell.get(currency).copied()
    }

    /// Exact equality with the tracked best buy. Every tied record qualifies.
    pub fn is_best_buy(&self, record: &RateRecord) -> bool {
        self.best_buy(&record.currency) == Some(record.buy)
    }

    /// Exact equality with the tracked worst sell. Every tied record qualifies.
    pub fn is_worst_sell(&self, record: &RateRecord) -> bool {
        self.worst_sell(&record.currency) == Some(record.sell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn rec(provider: &str, currency: &str, buy: Decimal, sell: Decimal) -> RateRecord {
        RateRecord::new(provider, CurrencyCode::new(currency), buy, sell, "")
    }

    #[test]
    fn test_tracks_per_currency() {
        let records = vec![
            rec("A", "USD", dec!(27.20), dec!(27.60)),
            rec("B", "USD", dec!(27.10), dec!(27.90)),
            rec("A", "EUR", dec!(29.00), dec!(29.50)),
        ];

        let extrema = Extrema::track(&records);
        assert_eq!(extrema.best_buy(&CurrencyCode::usd()), Some(dec!(27.20)));
        assert_eq!(extrema.worst_sell(&CurrencyCode::usd()), Some(dec!(27.60)));
        assert_eq!(extrema.best_buy(&CurrencyCode::eur()), Some(dec!(29.00)));
        assert_eq!(extrema.best_buy(&CurrencyCode::new("GBP")), None);

        assert!(extrema.is_best_buy(&records[0]));
        assert!(!extrema.is_best_buy(&records[1]));
        assert!(extrema.is_worst_sell(&records[0]));
        assert!(!extrema.is_worst_sell(&records[1]));
    }

    #[test]
    fn test_every_tie_is_flagged() {
        let records = vec![
            rec("A", "USD", dec!(27.2), dec!(27.9)),
            rec("B", "USD", dec!(27.20), dec!(27.90)),
            rec("C", "USD", dec!(27.1), dec!(28.0)),
        ];

        let extrema = Extrema::track(&records);
        let flagged: Vec<_> = records.iter().filter(|r| extrema.is_best_buy(r)).collect();
        assert_eq!(flagged.len(), 2);
        assert_eq!(records.iter().filter(|r| extrema.is_worst_sell(r)).count(), 2);
    }

    #[test]
    fn test_no_tolerance() {
        let records = vec![
            rec("A", "USD", dec!(27.2000001), dec!(1)),
            rec("B", "USD", dec!(27.2), dec!(1)),
        ];

        let extrema = Extrema::track(&records);
        assert!(extrema.is_best_buy(&records[0]));
        assert!(!extrema.is_best_buy(&records[1]));
    }

    #[test]
    fn test_zero_values_still_tracked() {
        let records = vec![rec("A", "USD", dec!(0), dec!(0))];
        let extrema = Extrema::track(&records);
        assert!(extrema.is_best_buy(&records[0]));
        assert!(extrema.is_worst_sell(&records[0]));
    }
}
