//! RateWatch terminal board
//!
//! Polls a rates endpoint and prints the reference, current-rates and
//! history tables after every refresh.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod board;
mod render;

use board::SortPlan;
use ratewatch_client::{HttpRateSource, RatesController, RefreshScheduler, TrackerConfig};
use ratewatch_common::{CurrencyFilter, ProviderFilter, RateWatchError};
use ratewatch_engine::{RateEngine, SortKey, ViewId};

/// RateWatch CLI
#[derive(Parser, Debug)]
#[command(name = "ratewatch")]
#[command(about = "Currency exchange rate board")]
struct Args {
    /// Rates endpoint (overrides RATES_ENDPOINT)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Refresh interval in seconds (overrides RATES_REFRESH_SECS)
    #[arg(short, long)]
    interval: Option<u64>,

    /// Currency filter, ALL for every currency
    #[arg(short, long, default_value = "ALL")]
    currency: String,

    /// Provider filter, ALL for every provider
    #[arg(short, long, default_value = "ALL")]
    provider: String,

    /// Sort keys for the current-rates table, e.g. "currency,buy"
    #[arg(long)]
    sort_current: Option<String>,

    /// Sort keys for the history table, e.g. "date"
    #[arg(long)]
    sort_history: Option<String>,

    /// Sort descending instead of ascending
    #[arg(long)]
    descending: bool,

    /// Refresh once, print and exit
    #[arg(long)]
    once: bool,

    /// Print the board as JSON
    #[arg(long)]
    json: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

impl Args {
    fn tracker_config(&self) -> anyhow::Result<TrackerConfig> {
        let mut config = TrackerConfig::from_env();

        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(secs) = self.interval {
            config.refresh_interval = Duration::from_secs(secs);
        }

        config.validate().map_err(RateWatchError::ConfigurationError)?;
        Ok(config)
    }

    fn sort_plans(&self) -> anyhow::Result<Vec<SortPlan>> {
        let mut plans = Vec::new();

        for (view, keys) in [
            (ViewId::CurrentRates, &self.sort_current),
            (ViewId::History, &self.sort_history),
        ] {
            if let Some(keys) = keys {
                let keys = SortKey::parse_list(keys)
                    .with_context(|| format!("invalid sort keys for {}", view))?;
                if !keys.is_empty() {
                    plans.push(SortPlan::new(view, keys, self.descending));
                }
            }
        }

        Ok(plans)
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
    );

    // Logs go to stderr so the board on stdout stays clean.
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_board(controller: &RatesController, plans: &[SortPlan], json: bool) -> anyhow::Result<()> {
    board::apply_plans(controller, plans);

    let views = controller.views();
    let indicator = |view| board::indicator(controller, view);

    if json {
        println!("{}", render::json(&views, indicator)?);
    } else {
        println!("{}", render::board(&views, indicator));
    }
    Ok(())
}

/// Draw the board now and again after every re-projection, until `shutdown`
/// resolves.
///
/// The first draw does not wait for a refresh, so an unreachable endpoint
/// still shows the reference rows. `shutdown` is polled as one future for
/// the whole run.
async fn run_board<S, D>(controller: &RatesController, shutdown: S, mut draw: D) -> anyhow::Result<()>
where
    S: Future<Output = ()>,
    D: FnMut(&RatesController) -> anyhow::Result<()>,
{
    let mut updates = controller.subscribe();
    tokio::pin!(shutdown);

    draw(controller)?;

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                draw(controller)?;
            }
            _ = &mut shutdown => {
                info!("Shutting down");
                break;
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_json);

    let config = args.tracker_config()?;
    let plans = args.sort_plans()?;
    let currency = CurrencyFilter::parse_currency(&args.currency)?;
    let provider = ProviderFilter::parse_provider(&args.provider)?;

    info!(
        endpoint = %config.endpoint,
        interval_secs = config.refresh_interval.as_secs(),
        "Starting RateWatch"
    );

    let source = Arc::new(HttpRateSource::from_config(&config)?);
    let engine = RateEngine::new(config.engine.clone());
    let controller = Arc::new(RatesController::new(engine, source));
    controller.set_currency_filter(currency);
    controller.set_provider_filter(provider);

    if args.once {
        if let Err(e) = controller.refresh().await {
            warn!(error = %e, "Refresh failed, showing empty board");
        }
        return print_board(&controller, &plans, args.json);
    }

    let scheduler = RefreshScheduler::spawn(controller.clone(), config.refresh_interval);
    info!("Press Ctrl+C to stop");

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
        }
    };
    let result = run_board(&controller, shutdown, |controller| {
        print_board(controller, &plans, args.json)
    })
    .await;

    scheduler.cancel();
    scheduler.join().await?;
    result?;

    let stats = controller.stats();
    info!(
        attempts = stats.attempts,
        successes = stats.successes,
        failures = stats.failures,
        "RateWatch stopped"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratewatch_client::StaticRateSource;
    use ratewatch_common::RawRate;
    use ratewatch_engine::{SortDirection, Views};
    use serde_json::json;
    use tokio::sync::oneshot;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("ratewatch").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.currency, "ALL");
        assert_eq!(args.provider, "ALL");
        assert!(!args.once);
        assert!(args.sort_plans().unwrap().is_empty());
    }

    #[test]
    fn test_sort_plans() {
        let args = parse(&[
            "--sort-current",
            "currency,buy",
            "--sort-history",
            "date",
            "--descending",
        ]);
        let plans = args.sort_plans().unwrap();

        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].view, ViewId::CurrentRates);
        assert_eq!(plans[0].keys, vec![SortKey::Currency, SortKey::Buy]);
        assert_eq!(plans[0].direction, SortDirection::Descending);
        assert_eq!(plans[1].view, ViewId::History);
        assert_eq!(plans[1].keys, vec![SortKey::Date]);
    }

    #[test]
    fn test_bad_sort_key_is_rejected() {
        let args = parse(&["--sort-history", "price"]);
        assert!(args.sort_plans().is_err());
    }

    #[test]
    fn test_cli_overrides_config() {
        let args = parse(&["--endpoint", "http://rates.local/latest", "--interval", "5"]);
        let config = args.tracker_config().unwrap();

        assert_eq!(config.endpoint, "http://rates.local/latest");
        assert_eq!(config.refresh_interval, Duration::from_secs(5));
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let args = parse(&["--interval", "0"]);
        assert!(args.tracker_config().is_err());
    }

    fn controller(source: Arc<StaticRateSource>) -> RatesController {
        RatesController::new(RateEngine::default(), source)
    }

    #[tokio::test]
    async fn test_board_drawn_while_endpoint_is_down() {
        let source = Arc::new(StaticRateSource::new("test"));
        source.push_failure("connection refused");
        let controller = controller(source);
        assert!(controller.refresh().await.is_err());

        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        stop_tx.send(()).unwrap();

        let mut drawn: Vec<Views> = Vec::new();
        run_board(
            &controller,
            async {
                let _ = stop_rx.await;
            },
            |controller| {
                drawn.push(controller.views());
                Ok(())
            },
        )
        .await
        .unwrap();

        assert_eq!(drawn.len(), 1);
        assert_eq!(drawn[0].primary_source.len(), 2);
        assert!(drawn[0].current_rates.is_empty());

        let text = render::board(&drawn[0], |_| None);
        assert!(text.contains("Reference rates"));
        assert!(text.contains("NBU"));
    }

    #[tokio::test]
    async fn test_board_redrawn_after_refresh_with_single_shutdown_future() {
        let source = Arc::new(StaticRateSource::new("test"));
        source.push_rates(vec![RawRate::from_value(json!({
            "bank": "PrivatBank", "currency": "USD", "buy": 41.0, "sell": 41.5, "date": "2024-03-01"
        }))]);
        let controller = controller(source);

        // The shutdown future refreshes once, then resolves a little later.
        // Re-creating it per loop pass would refresh again and fail.
        let shutdown = async {
            controller.refresh().await.unwrap();
            tokio::time::sleep(Duration::from_millis(50)).await;
        };

        let mut current_rows = Vec::new();
        run_board(&controller, shutdown, |controller| {
            current_rows.push(controller.views().current_rates.len());
            Ok(())
        })
        .await
        .unwrap();

        assert_eq!(current_rows, vec![0, 1]);
        assert_eq!(controller.stats().attempts, 1);
        assert_eq!(controller.stats().failures, 0);
    }
}
