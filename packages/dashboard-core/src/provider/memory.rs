//! In-memory price source.

use std::cell::Cell;

use chrono::NaiveDate;
use indexmap::IndexMap;

use super::{MarketDataProvider, ProviderError};
use crate::types::{PriceSeries, Ticker};

/// Provider serving series held in memory.
#[derive(Debug, Default)]
pub struct StaticProvider {
    series: IndexMap<Ticker, Vec<(NaiveDate, f64)>>,
    failure: Option<String>,
    calls: Cell<usize>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider whose every fetch fails with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// Add the full history of one ticker.
    pub fn with_series(mut self, ticker: Ticker, points: Vec<(NaiveDate, f64)>) -> Self {
        self.series.insert(ticker, points);
        self
    }

    /// Number of fetches served so far.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl MarketDataProvider for StaticProvider {
    fn name(&self) -> &str {
        "static"
    }

    fn fetch_adjusted_close(
        &self,
        tickers: &[Ticker],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<IndexMap<Ticker, PriceSeries>, ProviderError> {
        self.calls.set(self.calls.get() + 1);

        if let Some(message) = &self.failure {
            return Err(ProviderError::Api(message.clone()));
        }

        let mut result = IndexMap::new();
        for ticker in tickers {
            let Some(points) = self.series.get(ticker) else {
                continue;
            };

            let series = PriceSeries::new(ticker.clone(), points.clone())
                .map_err(|e| ProviderError::Parse(e.to_string()))?
                .within(start, end);

            if !series.is_empty() {
                result.insert(ticker.clone(), series);
            }
        }

        Ok(result)
    }
}
