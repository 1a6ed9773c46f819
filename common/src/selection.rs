//! Filter selections.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::currency::CurrencyCode;
use crate::error::{RateWatchError, Result};

/// Literal used by the UI for "no restriction".
pub const ALL: &str = "ALL";

/// A filter value: either everything or one specific value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Selection<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Selection<T> {
    /// Check whether a value passes this selection.
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(wanted) => wanted == value,
        }
    }
}

/// Currency filter. Matching is on normalized codes.
pub type CurrencyFilter = Selection<CurrencyCode>;

/// Provider filter. Matching is exact and case-sensitive.
pub type ProviderFilter = Selection<String>;

impl CurrencyFilter {
    /// Parse a UI choice. `ALL` in any case means no restriction.
    pub fn parse_currency(choice: &str) -> Result<Self> {
        let code = CurrencyCode::new(choice);
        if code.is_empty() {
            return Err(RateWatchError::InvalidInput {
                message: "currency filter cannot be empty".to_string(),
                field: Some("currency".to_string()),
            });
        }
        if code.code() == ALL {
            Ok(Selection::All)
        } else {
            Ok(Selection::Only(code))
        }
    }
}

impl ProviderFilter {
    /// Parse a UI choice. Only the exact literal `ALL` means no restriction.
    pub fn parse_provider(choice: &str) -> Result<Self> {
        if choice.is_empty() {
            return Err(RateWatchError::InvalidInput {
                message: "provider filter cannot be empty".to_string(),
                field: Some("provider".to_string()),
            });
        }
        if choice == ALL {
            Ok(Selection::All)
        } else {
            Ok(Selection::Only(choice.to_string()))
        }
    }
}

impl<T: fmt::Display> fmt::Display for Selection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => write!(f, "{}", ALL),
            Selection::Only(v) => write!(f, "{}", v),
        }
    }
}
