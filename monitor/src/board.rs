//! Board state held by the terminal front end.

use ratewatch_client::RatesController;
use ratewatch_engine::sort::columns;
use ratewatch_engine::{SortDirection, SortKey, ViewId};
use tracing::debug;

/// A requested ordering for one view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortPlan {
    pub view: ViewId,
    pub keys: Vec<SortKey>,
    pub direction: SortDirection,
}

impl SortPlan {
    pub fn new(view: ViewId, keys: Vec<SortKey>, descending: bool) -> Self {
        let direction = if descending {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        Self {
            view,
            keys,
            direction,
        }
    }

    /// Apply the plan through the controller's toggler.
    ///
    /// The toggler flips on every call, so a second toggle is issued when
    /// the first one lands on the other direction. Returns the direction the
    /// rows ended up in, `None` if the view was empty.
    pub fn apply(&self, controller: &RatesController) -> Option<SortDirection> {
        let direction = controller.toggle_sort(self.view, &self.keys)?;
        if direction == self.direction {
            return Some(direction);
        }

        debug!(view = %self.view, "Re-toggling sort to reach requested direction");
        controller.toggle_sort(self.view, &self.keys)
    }
}

/// Apply every plan in order.
pub fn apply_plans(controller: &RatesController, plans: &[SortPlan]) {
    for plan in plans {
        plan.apply(controller);
    }
}

/// The column carrying the sort indicator of a view, if any.
pub fn indicator(controller: &RatesController, view: ViewId) -> Option<(SortKey, SortDirection)> {
    columns()
        .iter()
        .find_map(|column| controller.indicator(view, column.key).map(|d| (column.key, d)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratewatch_client::StaticRateSource;
    use ratewatch_common::RawRate;
    use ratewatch_engine::{RateEngine, RateEngineConfig};
    use serde_json::json;
    use std::sync::Arc;

    fn raw(bank: &str, currency: &str, buy: f64, sell: f64, date: &str) -> RawRate {
        RawRate::from_value(json!({
            "bank": bank, "currency": currency, "buy": buy, "sell": sell, "date": date,
        }))
    }

    async fn loaded_controller() -> RatesController {
        let source = Arc::new(StaticRateSource::new("test"));
        source.push_rates(vec![
            raw("PrivatBank", "USD", 41.0, 41.5, "2024-03-01T10:00:00Z"),
            raw("Oschadbank", "USD", 40.8, 41.6, "2024-03-01T09:00:00Z"),
            raw("Monobank", "EUR", 44.1, 44.9, "2024-03-01T08:00:00Z"),
        ]);
        let controller = RatesController::new(RateEngine::new(RateEngineConfig::default()), source);
        controller.refresh().await.unwrap();
        controller
    }

    fn providers(rows: &[ratewatch_engine::RateRow]) -> Vec<&str> {
        rows.iter().map(|r| r.record.provider.as_str()).collect()
    }

    #[tokio::test]
    async fn test_ascending_plan_is_stable_across_rerenders() {
        let controller = loaded_controller().await;
        let plan = SortPlan::new(ViewId::History, vec![SortKey::Provider], false);

        assert_eq!(plan.apply(&controller), Some(SortDirection::Ascending));
        assert_eq!(
            providers(&controller.rows(ViewId::History)),
            vec!["Monobank", "Oschadbank", "PrivatBank"]
        );

        // A second application must not flip the board to descending.
        assert_eq!(plan.apply(&controller), Some(SortDirection::Ascending));
        assert_eq!(
            providers(&controller.rows(ViewId::History)),
            vec!["Monobank", "Oschadbank", "PrivatBank"]
        );
    }

    #[tokio::test]
    async fn test_descending_plan() {
        let controller = loaded_controller().await;
        let plan = SortPlan::new(ViewId::History, vec![SortKey::Provider], true);

        assert_eq!(plan.apply(&controller), Some(SortDirection::Descending));
        assert_eq!(
            providers(&controller.rows(ViewId::History)),
            vec!["PrivatBank", "Oschadbank", "Monobank"]
        );
        assert_eq!(
            indicator(&controller, ViewId::History),
            Some((SortKey::Provider, SortDirection::Descending))
        );
    }

    #[tokio::test]
    async fn test_plan_on_empty_view_is_noop() {
        let source = Arc::new(StaticRateSource::new("test"));
        let controller = RatesController::new(RateEngine::new(RateEngineConfig::default()), source);
        let plan = SortPlan::new(ViewId::History, vec![SortKey::Buy], true);

        assert_eq!(plan.apply(&controller), None);
        assert_eq!(indicator(&controller, ViewId::History), None);
    }
}
