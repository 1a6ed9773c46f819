//! RateWatch Common Types
//!
//! This crate contains the shared data model used across RateWatch,
//! including currency codes, rate records, filter selections and
//! timestamp handling.

pub mod currency;
pub mod rate;
pub mod selection;
pub mod error;
pub mod time;

pub use currency::*;
pub use rate::*;
pub use selection::*;
pub use error::*;
pub use time::*;
