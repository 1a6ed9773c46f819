//! Recency reduction: one record per (provider, currency).

use std::collections::HashMap;

use ratewatch_common::{CurrencyCode, ObservedAt, RateRecord};

/// Keep the most recent record of every (provider, currency) group.
///
/// A later record replaces the retained one only if its timestamp is
/// strictly greater, so on ties the first record in input order stays.
/// Unparseable timestamps order before every parsed one. Output follows the
/// order in which groups were first seen.
pub fn latest_per_group(records: &[RateRecord]) -> Vec<RateRecord> {
    let mut slots: HashMap<(&str, &CurrencyCode), usize> = HashMap::new();
    let mut retained: Vec<(&RateRecord, ObservedAt)> = Vec::new();

    for record in records {
        let observed = record.observed();
        match slots.get(&record.group_key()) {
            Some(&idx) => {
                if observed > retained[idx].1 {
                    retained[idx] = (record, observed);
                }
            }
            None => {
                slots.insert(record.group_key(), retained.len());
                retained.push((record, observed));
            }
        }
    }

    retained.into_iter().map(|(r, _)| r.clone()).collect()
}
