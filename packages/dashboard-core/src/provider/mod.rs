//! Market data providers.
//!
//! [`MarketDataProvider`] is the seam between the dashboard and whatever
//! source supplies adjusted-close prices. Implementations:
//!
//! - [`YahooProvider`]: Yahoo Finance chart API over blocking HTTP
//! - [`JsonFileProvider`]: prices stored in a local JSON file
//! - [`StaticProvider`]: in-memory series, used for tests and demos
//!
//! Providers are called synchronously; the dashboard issues the ticker fetch
//! and the benchmark fetch one after the other.

mod errors;
mod file;
mod memory;
mod yahoo;

pub use errors::ProviderError;
pub use file::JsonFileProvider;
pub use memory::StaticProvider;
pub use yahoo::{YahooProvider, DEFAULT_BASE_URL as YAHOO_BASE_URL};

use chrono::NaiveDate;
use indexmap::IndexMap;

use crate::types::{PriceSeries, Ticker};

/// Source of daily adjusted-close prices.
pub trait MarketDataProvider {
    /// Short name used in log messages.
    fn name(&self) -> &str;

    /// Fetch adjusted-close prices for `tickers` over the inclusive range `[start, end]`.
    ///
    /// Tickers the source knows nothing about are left out of the result
    /// rather than reported as errors; an empty map means no data at all.
    fn fetch_adjusted_close(
        &self,
        tickers: &[Ticker],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<IndexMap<Ticker, PriceSeries>, ProviderError>;
}
