//! RateWatch Client Library
//!
//! Connects the rate engine to the outside world: a [`RateSource`] to pull
//! observations from, a [`RatesController`] that owns the session state a
//! rate board renders, and a [`RefreshScheduler`] that drives periodic
//! refreshes.

pub mod config;
pub mod controller;
pub mod error;
pub mod scheduler;
pub mod source;

pub use config::TrackerConfig;
pub use controller::{RatesController, RefreshStats};
pub use error::{SourceError, SourceResult};
pub use scheduler::{RefreshScheduler, SchedulerHandle};
pub use source::{HttpRateSource, RateSource};

#[cfg(any(test, feature = "test-utils"))]
pub use source::StaticRateSource;
