//! Equal-weighted synthetic portfolio.

use crate::types::{PriceTable, Ticker};
use crate::{Error, Result};

/// Equal allocation across `n` tickers: `1/n` each.
pub fn equal_weights(n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }

    vec![1.0 / n as f64; n]
}

/// Calculate the equal-weighted portfolio price for every date.
///
/// # Arguments
///
/// * `prices` - Aligned price table (may include the benchmark)
/// * `tickers` - User-selected tickers; the benchmark is never part of the portfolio
///
/// # Returns
///
/// One value per date: `sum(price[t][date] * 1/N)` over the N tickers.
pub fn compute_portfolio_series(prices: &PriceTable, tickers: &[Ticker]) -> Result<Vec<f64>> {
    let constituents: Vec<&Ticker> = tickers.iter().filter(|t| !t.is_benchmark()).collect();

    if constituents.is_empty() {
        return Err(Error::InsufficientData(
            "At least one ticker is needed to build the portfolio".to_string(),
        ));
    }

    let weights = equal_weights(constituents.len());
    let mut portfolio = vec![0.0; prices.len()];

    for (ticker, weight) in constituents.into_iter().zip(weights) {
        let values = prices
            .get(ticker)
            .ok_or_else(|| Error::InsufficientData(format!("No prices for {}", ticker)))?;

        for (acc, price) in portfolio.iter_mut().zip(values) {
            *acc += price * weight;
        }
    }

    Ok(portfolio)
}

/// Return a copy of `prices` with the portfolio series appended under `portfolio`.
pub fn with_portfolio(prices: &PriceTable, tickers: &[Ticker]) -> Result<PriceTable> {
    let series = compute_portfolio_series(prices, tickers)?;
    prices.clone().with_column(Ticker::portfolio(), series)
}
