//! Column sorting with ascending/descending toggling.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use ratewatch_common::RateWatchError;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::view::{RateRow, ViewId};

/// A sortable column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Provider,
    Currency,
    Buy,
    Sell,
    Date,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Provider => "provider",
            SortKey::Currency => "currency",
            SortKey::Buy => "buy",
            SortKey::Sell => "sell",
            SortKey::Date => "date",
        }
    }

    /// Parse a comma-separated key list such as `"bank,currency"`.
    pub fn parse_list(list: &str) -> Result<Vec<SortKey>, RateWatchError> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(SortKey::from_str)
            .collect()
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = RateWatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "provider" | "bank" => Ok(SortKey::Provider),
            "currency" => Ok(SortKey::Currency),
            "buy" => Ok(SortKey::Buy),
            "sell" => Ok(SortKey::Sell),
            "date" | "observedat" | "observed_at" => Ok(SortKey::Date),
            _ => Err(RateWatchError::InvalidInput {
                message: format!("unknown sort key '{}'", s),
                field: Some("sort".to_string()),
            }),
        }
    }
}

/// Sort direction, also used as the column indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    fn from_ascending(ascending: bool) -> Self {
        if ascending {
            SortDirection::Ascending
        } else {
            SortDirection::Descending
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Binds a sort key to how its cell value is read and compared.
#[derive(Clone, Copy)]
pub struct ColumnDescriptor {
    pub key: SortKey,
    pub value: fn(&RateRow) -> String,
    pub compare: fn(&str, &str) -> Ordering,
}

impl fmt::Debug for ColumnDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDescriptor").field("key", &self.key).finish()
    }
}

fn provider_cell(row: &RateRow) -> String {
    row.record.provider.clone()
}

fn currency_cell(row: &RateRow) -> String {
    row.record.currency.to_string()
}

fn buy_cell(row: &RateRow) -> String {
    format!("{:.2}", row.record.buy)
}

fn sell_cell(row: &RateRow) -> String {
    format!("{:.2}", row.record.sell)
}

// Epoch millis, so dates order chronologically rather than as text.
// Unparseable dates read as 0 and so sort after any pre-1970 date.
fn date_cell(row: &RateRow) -> String {
    row.record.observed_millis().to_string()
}

static COLUMNS: [ColumnDescriptor; 5] = [
    ColumnDescriptor {
        key: SortKey::Provider,
        value: provider_cell,
        compare: compare_cells,
    },
    ColumnDescriptor {
        key: SortKey::Currency,
        value: currency_cell,
        compare: compare_cells,
    },
    ColumnDescriptor {
        key: SortKey::Buy,
        value: buy_cell,
        compare: compare_cells,
    },
    ColumnDescriptor {
        key: SortKey::Sell,
        value: sell_cell,
        compare: compare_cells,
    },
    ColumnDescriptor {
        key: SortKey::Date,
        value: date_cell,
        compare: compare_cells,
    },
];

/// Column descriptors for every sort key.
pub fn columns() -> &'static [ColumnDescriptor] {
    &COLUMNS
}

/// Descriptor for one key.
pub fn descriptor(key: SortKey) -> &'static ColumnDescriptor {
    match key {
        SortKey::Provider => &COLUMNS[0],
        SortKey::Currency => &COLUMNS[1],
        SortKey::Buy => &COLUMNS[2],
        SortKey::Sell => &COLUMNS[3],
        SortKey::Date => &COLUMNS[4],
    }
}

/// Numeric comparison when both cells parse as numbers, otherwise
/// case-insensitive text comparison.
pub fn compare_cells(a: &str, b: &str) -> Ordering {
    match (parse_number(a), parse_number(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => a.to_lowercase().cmp(&b.to_lowercase()),
    }
}

fn parse_number(cell: &str) -> Option<Decimal> {
    let cell = cell.trim();
    Decimal::from_str(cell)
        .or_else(|_| Decimal::from_scientific(cell))
        .ok()
}

/// Tracks per-view sort flags and column indicators.
///
/// Flags are keyed by view and the full key list, default to ascending on
/// first use and flip on every toggle. They live as long as the toggler.
#[derive(Debug, Clone, Default)]
pub struct SortToggler {
    ascending: HashMap<(ViewId, Vec<SortKey>), bool>,
    indicators: HashMap<ViewId, (SortKey, SortDirection)>,
}

impl SortToggler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reorder `rows` by `keys` and flip the stored direction.
    ///
    /// Rows tied on every key keep their relative order. Empty input or an
    /// empty key list leaves rows, flags and indicators untouched.
    pub fn toggle(
        &mut self,
        view: ViewId,
        keys: &[SortKey],
        rows: &mut [RateRow],
    ) -> Option<SortDirection> {
        if rows.is_empty() || keys.is_empty() {
            return None;
        }

        let flag = self
            .ascending
            .entry((view, keys.to_vec()))
            .and_modify(|asc| *asc = !*asc)
            .or_insert(true);
        let direction = SortDirection::from_ascending(*flag);

        let columns: Vec<&ColumnDescriptor> = keys.iter().map(|k| descriptor(*k)).collect();
        rows.sort_by(|a, b| {
            for column in &columns {
                let ordering = (column.compare)(&(column.value)(a), &(column.value)(b));
                if ordering != Ordering::Equal {
                    return direction.apply(ordering);
                }
            }
            Ordering::Equal
        });

        self.indicators.insert(view, (keys[0], direction));
        Some(direction)
    }

    /// Indicator for a column: set only on the primary key of the last toggle.
    pub fn indicator(&self, view: ViewId, key: SortKey) -> Option<SortDirection> {
        self.indicators
            .get(&view)
            .filter(|(k, _)| *k == key)
            .map(|(_, d)| *d)
    }

    /// Direction the last toggle of this exact key list produced.
    pub fn last_direction(&self, view: ViewId, keys: &[SortKey]) -> Option<SortDirection> {
        self.ascending
            .get(&(view, keys.to_vec()))
            .map(|asc| SortDirection::from_ascending(*asc))
    }
}
