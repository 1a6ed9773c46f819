//! RateWatch Engine
//!
//! Turns raw rate observations into the ordered row sets a rate board shows.
//!
//! # Pipeline
//!
//! - [`Normalizer`]: coerces loosely typed records and drops policy-excluded ones
//! - [`filter`]: currency/provider predicates, order preserving
//! - [`reducer`]: latest observation per (provider, currency)
//! - [`Extrema`]: best buy / worst sell per currency
//! - [`ViewProjector`]: primary-source, current-rates and history views
//! - [`SortToggler`]: on-demand reordering of a projected view
//!
//! # Example
//!
//! ```rust,ignore
//! use ratewatch_engine::{RateEngine, RateEngineConfig, FilterSet};
//!
//! let engine = RateEngine::new(RateEngineConfig::default());
//! let records = engine.normalize(&payload.into_raw_rates());
//! let views = engine.project(&records, &FilterSet::default());
//! ```

pub mod engine;
pub mod normalizer;
pub mod filter;
pub mod reducer;
pub mod extremum;
pub mod view;
pub mod sort;

pub use engine::{RateEngine, RateEngineConfig};
pub use normalizer::{DropReason, Normalizer, NormalizerPolicy};
pub use filter::{FilterSet, PrimaryRule};
pub use extremum::Extrema;
pub use view::{RateRow, ViewId, ViewProjector, Views};
pub use sort::{ColumnDescriptor, SortDirection, SortKey, SortToggler};
