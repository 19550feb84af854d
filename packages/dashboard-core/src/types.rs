//! Core data types for the dashboard.

use std::fmt;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Reserved key of the benchmark index series.
pub const BENCHMARK: &str = "IBOV";

/// Reserved key of the synthetic equal-weighted portfolio series.
pub const PORTFOLIO: &str = "portfolio";

/// Equity ticker symbol.
///
/// User tickers are trimmed and upper-cased. The two pseudo-tickers
/// [`BENCHMARK`] and [`PORTFOLIO`] are built through [`Ticker::benchmark`]
/// and [`Ticker::portfolio`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticker(String);

impl Ticker {
    /// Create a ticker from a user-supplied symbol.
    pub fn new(symbol: &str) -> Self {
        Self(symbol.trim().to_uppercase())
    }

    /// The benchmark pseudo-ticker.
    pub fn benchmark() -> Self {
        Self(BENCHMARK.to_string())
    }

    /// The portfolio pseudo-ticker.
    pub fn portfolio() -> Self {
        Self(PORTFOLIO.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_benchmark(&self) -> bool {
        self.0 == BENCHMARK
    }

    pub fn is_portfolio(&self) -> bool {
        self.0 == PORTFOLIO
    }

    /// Whether this symbol collides with one of the pseudo-tickers.
    pub fn is_reserved(&self) -> bool {
        self.0.eq_ignore_ascii_case(BENCHMARK) || self.0.eq_ignore_ascii_case(PORTFOLIO)
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Ticker {
    fn from(symbol: &str) -> Self {
        Self::new(symbol)
    }
}

/// Adjusted-close prices of one ticker, ordered by strictly increasing date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceSeries {
    pub ticker: Ticker,
    pub points: Vec<(NaiveDate, f64)>,
}

impl PriceSeries {
    /// Create a series, sorting points by date.
    ///
    /// Fails if the same date appears twice.
    pub fn new(ticker: Ticker, mut points: Vec<(NaiveDate, f64)>) -> Result<Self> {
        points.sort_by_key(|(date, _)| *date);

        if let Some(pair) = points.windows(2).find(|pair| pair[0].0 == pair[1].0) {
            return Err(Error::Alignment(format!(
                "{} has more than one price on {}",
                ticker, pair[0].0
            )));
        }

        Ok(Self { ticker, points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|(date, _)| *date)
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|(_, value)| *value)
    }

    /// Keep only points inside the inclusive range `[start, end]`.
    pub fn within(&self, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            ticker: self.ticker.clone(),
            points: self
                .points
                .iter()
                .filter(|(date, _)| *date >= start && *date <= end)
                .copied()
                .collect(),
        }
    }
}

/// Per-run price snapshot: one shared date axis and one column per ticker.
///
/// Columns keep insertion order and always hold exactly one value per date.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct PriceTable {
    dates: Vec<NaiveDate>,
    columns: IndexMap<Ticker, Vec<f64>>,
}

impl PriceTable {
    /// Create an empty table over a strictly increasing date axis.
    pub fn new(dates: Vec<NaiveDate>) -> Result<Self> {
        if let Some(pair) = dates.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(Error::Alignment(format!(
                "dates must be strictly increasing, found {} followed by {}",
                pair[0], pair[1]
            )));
        }

        Ok(Self {
            dates,
            columns: IndexMap::new(),
        })
    }

    /// Add or replace a column. Its length must match the date axis.
    pub fn insert(&mut self, ticker: Ticker, values: Vec<f64>) -> Result<()> {
        if values.len() != self.dates.len() {
            return Err(Error::Alignment(format!(
                "{} has {} prices for {} dates",
                ticker,
                values.len(),
                self.dates.len()
            )));
        }

        self.columns.insert(ticker, values);
        Ok(())
    }

    /// Builder-style [`PriceTable::insert`].
    pub fn with_column(mut self, ticker: Ticker, values: Vec<f64>) -> Result<Self> {
        self.insert(ticker, values)?;
        Ok(self)
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Number of dates (rows).
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn contains(&self, ticker: &Ticker) -> bool {
        self.columns.contains_key(ticker)
    }

    pub fn get(&self, ticker: &Ticker) -> Option<&[f64]> {
        self.columns.get(ticker).map(Vec::as_slice)
    }

    pub fn tickers(&self) -> impl Iterator<Item = &Ticker> {
        self.columns.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Ticker, &[f64])> {
        self.columns
            .iter()
            .map(|(ticker, values)| (ticker, values.as_slice()))
    }

    /// Extract one column as a dated series.
    pub fn series(&self, ticker: &Ticker) -> Option<PriceSeries> {
        self.columns.get(ticker).map(|values| PriceSeries {
            ticker: ticker.clone(),
            points: self.dates.iter().copied().zip(values.iter().copied()).collect(),
        })
    }
}

/// Scalar metrics derived for one ticker within a single analysis run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DerivedMetrics {
    /// Cumulative return over the window as a fraction (0.10 for 10%)
    pub total_return: f64,
    /// Sample standard deviation of daily returns scaled by sqrt(252)
    pub annualized_volatility: f64,
}

impl DerivedMetrics {
    /// Return divided by volatility; no risk-free rate is subtracted.
    ///
    /// `None` when volatility is zero or not finite.
    pub fn sharpe_proxy(&self) -> Option<f64> {
        if self.annualized_volatility.is_finite() && self.annualized_volatility > 0.0 {
            Some(self.total_return / self.annualized_volatility)
        } else {
            None
        }
    }
}

/// API response wrapper for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}
