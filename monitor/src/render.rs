//! Text and JSON rendering of the board.

use std::fmt::Write;

use ratewatch_engine::{RateRow, SortDirection, SortKey, ViewId, Views};
use serde::Serialize;

const BEST_BUY_MARK: char = '*';
const WORST_SELL_MARK: char = '!';

fn title(view: ViewId) -> &'static str {
    match view {
        ViewId::PrimarySource => "Reference rates",
        ViewId::CurrentRates => "Current rates",
        ViewId::History => "History",
    }
}

fn heading(key: SortKey, indicator: Option<(SortKey, SortDirection)>) -> String {
    let label = key.as_str().to_uppercase();
    match indicator {
        Some((k, SortDirection::Ascending)) if k == key => format!("{} ^", label),
        Some((k, SortDirection::Descending)) if k == key => format!("{} v", label),
        _ => label,
    }
}

fn amount(value: &rust_decimal::Decimal, marked: bool, mark: char) -> String {
    if marked {
        format!("{:.2}{}", value, mark)
    } else {
        format!("{:.2} ", value)
    }
}

/// Render one view as a fixed-width table.
pub fn table(
    view: ViewId,
    rows: &[RateRow],
    indicator: Option<(SortKey, SortDirection)>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", title(view));
    let _ = writeln!(
        out,
        "{:<16}{:<10}{:>12}{:>12}  {}",
        heading(SortKey::Provider, indicator),
        heading(SortKey::Currency, indicator),
        heading(SortKey::Buy, indicator),
        heading(SortKey::Sell, indicator),
        heading(SortKey::Date, indicator),
    );

    if rows.is_empty() {
        let _ = writeln!(out, "(no rates)");
        return out;
    }

    for row in rows {
        let record = &row.record;
        let _ = writeln!(
            out,
            "{:<16}{:<10}{:>12}{:>12}  {}",
            record.provider,
            record.currency,
            amount(&record.buy, row.is_best_buy, BEST_BUY_MARK),
            amount(&record.sell, row.is_worst_sell, WORST_SELL_MARK),
            record.observed_at,
        );
    }
    out
}

/// Render every view, primary source first.
pub fn board<F>(views: &Views, indicator: F) -> String
where
    F: Fn(ViewId) -> Option<(SortKey, SortDirection)>,
{
    ViewId::ALL
        .iter()
        .map(|view| table(*view, views.rows(*view), indicator(*view)))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Serialize)]
struct JsonBoard<'a> {
    views: &'a Views,
    indicators: Vec<JsonIndicator>,
}

#[derive(Serialize)]
struct JsonIndicator {
    view: ViewId,
    key: SortKey,
    direction: SortDirection,
}

/// Render the views and active indicators as a JSON document.
pub fn json<F>(views: &Views, indicator: F) -> serde_json::Result<String>
where
    F: Fn(ViewId) -> Option<(SortKey, SortDirection)>,
{
    let indicators = ViewId::ALL
        .iter()
        .filter_map(|view| {
            indicator(*view).map(|(key, direction)| JsonIndicator {
                view: *view,
                key,
                direction,
            })
        })
        .collect();

    serde_json::to_string_pretty(&JsonBoard { views, indicators })
}
