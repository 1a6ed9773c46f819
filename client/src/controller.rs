//! Presentation controller.
//!
//! Owns the session state a rate board renders: the last fetched records,
//! the user's filters, the projected views and the sort flags. Fetching is
//! the only suspension point and no lock is held across it, so filter and
//! sort calls stay responsive while a refresh is in flight.
//!
//! Overlapping refreshes are not guarded: whichever fetch resolves last
//! replaces the records, regardless of which was issued last.

use std::sync::Arc;

use parking_lot::RwLock;
use ratewatch_common::{now, CurrencyCode, CurrencyFilter, ProviderFilter, RateRecord, Timestamp};
use ratewatch_engine::{FilterSet, RateEngine, RateRow, SortDirection, SortKey, SortToggler, ViewId, Views};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::error::SourceResult;
use crate::source::RateSource;

/// Refresh outcome counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshStats {
    pub attempts: u64,
    pub successes: u64,
    pub failures: u64,
    /// Records kept after normalization by the last successful refresh.
    pub last_record_count: usize,
    pub last_success_at: Option<Timestamp>,
}

#[derive(Debug, Default)]
struct Session {
    records: Arc<Vec<RateRecord>>,
    filters: FilterSet,
    views: Views,
    sorter: SortToggler,
}

/// Controller for one rate board.
pub struct RatesController {
    engine: RateEngine,
    source: Arc<dyn RateSource>,
    session: RwLock<Session>,
    stats: RwLock<RefreshStats>,
    updates: watch::Sender<u64>,
}

impl RatesController {
    /// Create a controller with no data yet. Views start out projected from
    /// an empty record set, so the primary-source view already has its rows.
    pub fn new(engine: RateEngine, source: Arc<dyn RateSource>) -> Self {
        let mut session = Session::default();
        session.views = engine.project(&session.records, &session.filters);

        let (updates, _) = watch::channel(0);

        Self {
            engine,
            source,
            session: RwLock::new(session),
            stats: RwLock::new(RefreshStats::default()),
            updates,
        }
    }

    /// Fetch a fresh batch and replace the working set.
    ///
    /// On failure the previous records and views stay as they are. Returns
    /// the number of records kept after normalization.
    #[instrument(skip(self), fields(source = self.source.name()))]
    pub async fn refresh(&self) -> SourceResult<usize> {
        self.stats.write().attempts += 1;
        debug!("Refreshing rates");

        let raw = match self.source.fetch().await {
            Ok(raw) => raw,
            Err(e) => {
                self.stats.write().failures += 1;
                warn!(error = %e, retryable = e.is_retryable(), "Refresh failed, keeping previous rates");
                return Err(e);
            }
        };

        let records = self.engine.normalize(&raw);
        let count = records.len();

        {
            let mut session = self.session.write();
            session.records = Arc::new(records);
            self.render(&mut session);
        }

        {
            let mut stats = self.stats.write();
            stats.successes += 1;
            stats.last_record_count = count;
            stats.last_success_at = Some(now());
        }

        info!(count, "Rates refreshed");
        Ok(count)
    }

    /// Change the currency filter and re-project. Never fetches.
    pub fn set_currency_filter(&self, filter: CurrencyFilter) {
        let mut session = self.session.write();
        session.filters.currency = filter;
        self.render(&mut session);
    }

    /// Change the provider filter and re-project. Never fetches.
    pub fn set_provider_filter(&self, filter: ProviderFilter) {
        let mut session = self.session.write();
        session.filters.provider = filter;
        self.render(&mut session);
    }

    /// Reorder one view by `keys`, flipping its direction for that key list.
    ///
    /// Only presentation order changes. The next refresh or filter change
    /// re-projects the view in pipeline order.
    pub fn toggle_sort(&self, view: ViewId, keys: &[SortKey]) -> Option<SortDirection> {
        let mut session = self.session.write();
        let Session { views, sorter, .. } = &mut *session;
        sorter.toggle(view, keys, views.rows_mut(view))
    }

    /// Column indicator for a view.
    pub fn indicator(&self, view: ViewId, key: SortKey) -> Option<SortDirection> {
        self.session.read().sorter.indicator(view, key)
    }

    /// Snapshot of all views in presentation order.
    pub fn views(&self) -> Views {
        self.session.read().views.clone()
    }

    /// Snapshot of one view in presentation order.
    pub fn rows(&self, view: ViewId) -> Vec<RateRow> {
        self.session.read().views.rows(view).to_vec()
    }

    /// Current filter choices.
    pub fn filters(&self) -> FilterSet {
        self.session.read().filters.clone()
    }

    /// The normalized records from the last successful refresh.
    pub fn records(&self) -> Arc<Vec<RateRecord>> {
        self.session.read().records.clone()
    }

    /// Providers available for the provider filter.
    pub fn provider_options(&self) -> Vec<String> {
        self.engine.provider_options(&self.records())
    }

    /// Currencies available for the currency filter.
    pub fn currency_options(&self) -> Vec<CurrencyCode> {
        self.engine.currency_options(&self.records())
    }

    /// Refresh counters.
    pub fn stats(&self) -> RefreshStats {
        self.stats.read().clone()
    }

    /// Subscribe to re-projections. The value is a counter bumped every time
    /// the views are rebuilt by a refresh or a filter change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.updates.subscribe()
    }

    fn render(&self, session: &mut Session) {
        session.views = self.engine.project(&session.records, &session.filters);
        self.updates.send_modify(|generation| *generation += 1);
    }
}
