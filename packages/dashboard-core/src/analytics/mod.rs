//! Portfolio analytics.
//!
//! Pure transformations over a per-run [`PriceTable`]: the equal-weighted
//! portfolio, normalized prices, daily returns, annualized volatility and
//! total return. Nothing here performs I/O or mutates the caller's table.

mod align;
mod performance;
mod portfolio;
mod risk;

pub use align::{align, validate, AlignmentPolicy};
pub use performance::{compute_total_return, holding_period_return, normalize, NORMALIZED_BASE};
pub use portfolio::{compute_portfolio_series, equal_weights, with_portfolio};
pub use risk::{
    compute_returns, compute_volatility, compute_volatility_with, sample_std, sharpe_proxy,
    simple_returns, volatility, TRADING_DAYS_PER_YEAR,
};

use indexmap::IndexMap;
use serde::Serialize;

use crate::types::{DerivedMetrics, PriceTable, Ticker};
use crate::{Error, Result};

/// Everything one analysis run produces.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    /// Raw prices with the `portfolio` column appended
    pub prices: PriceTable,
    /// Prices rebased to 100 at the first date
    pub normalized: PriceTable,
    /// Daily simple returns per ticker
    pub returns: IndexMap<Ticker, Vec<f64>>,
    /// Total return and annualized volatility per ticker
    pub metrics: IndexMap<Ticker, DerivedMetrics>,
}

impl Analysis {
    pub fn metrics_for(&self, ticker: &Ticker) -> Option<&DerivedMetrics> {
        self.metrics.get(ticker)
    }
}

/// Run the full pipeline with 252 trading days per year.
pub fn analyze(prices: &PriceTable, tickers: &[Ticker]) -> Result<Analysis> {
    analyze_with(prices, tickers, TRADING_DAYS_PER_YEAR)
}

/// Run the full pipeline.
///
/// Validates the input contract, appends the portfolio, normalizes, then
/// derives returns, volatility and total return for every column.
pub fn analyze_with(
    prices: &PriceTable,
    tickers: &[Ticker],
    periods_per_year: u32,
) -> Result<Analysis> {
    validate(prices, tickers)?;

    let prices = with_portfolio(prices, tickers)?;
    let normalized = normalize(&prices)?;
    let returns = compute_returns(&prices);
    let volatility = compute_volatility_with(&returns, periods_per_year);
    let total_return = compute_total_return(&normalized);

    let metrics = total_return
        .into_iter()
        .map(|(ticker, total_return)| {
            let annualized_volatility = volatility.get(&ticker).copied().ok_or_else(|| {
                Error::InsufficientData(format!("No returns computed for {}", ticker))
            })?;
            Ok((
                ticker,
                DerivedMetrics {
                    total_return,
                    annualized_volatility,
                },
            ))
        })
        .collect::<Result<IndexMap<_, _>>>()?;

    tracing::debug!(
        "Analysed {} series over {} dates",
        metrics.len(),
        prices.len()
    );

    Ok(Analysis {
        prices,
        normalized,
        returns,
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn dates(n: u32) -> Vec<NaiveDate> {
        (2..2 + n)
            .map(|d| NaiveDate::from_ymd_opt(2023, 1, d).unwrap())
            .collect()
    }

    #[test]
    fn test_single_ticker_scenario() {
        let prices = PriceTable::new(dates(4))
            .unwrap()
            .with_column(Ticker::new("AAA"), vec![10.0, 11.0, 12.0, 11.0])
            .unwrap()
            .with_column(Ticker::benchmark(), vec![100.0, 102.0, 101.0, 103.0])
            .unwrap();

        let analysis = analyze(&prices, &[Ticker::new("AAA")]).unwrap();

        assert_eq!(
            analysis.prices.get(&Ticker::portfolio()),
            analysis.prices.get(&Ticker::new("AAA"))
        );
        assert_eq!(analysis.normalized.get(&Ticker::new("AAA")).unwrap()[0], 100.0);

        let aaa = analysis.metrics_for(&Ticker::new("AAA")).unwrap();
        assert_relative_eq!(aaa.total_return, 0.10, epsilon = 1e-12);

        let ibov = analysis.metrics_for(&Ticker::benchmark()).unwrap();
        assert_relative_eq!(ibov.total_return, 0.03, epsilon = 1e-12);
    }

    #[test]
    fn test_two_ticker_scenario() {
        let prices = PriceTable::new(dates(4))
            .unwrap()
            .with_column(Ticker::new("AAA"), vec![10.0, 10.0, 10.0, 10.0])
            .unwrap()
            .with_column(Ticker::new("BBB"), vec![30.0, 33.0, 36.0, 39.0])
            .unwrap()
            .with_column(Ticker::benchmark(), vec![100.0, 101.0, 102.0, 103.0])
            .unwrap();

        let analysis = analyze(&prices, &[Ticker::new("AAA"), Ticker::new("BBB")]).unwrap();

        let portfolio = analysis.prices.get(&Ticker::portfolio()).unwrap();
        for (actual, expected) in portfolio.iter().zip([20.0, 21.5, 23.0, 24.5]) {
            assert_relative_eq!(*actual, expected, epsilon = 1e-12);
        }

        let flat = analysis.metrics_for(&Ticker::new("AAA")).unwrap();
        assert_eq!(flat.annualized_volatility, 0.0);
        assert_eq!(flat.sharpe_proxy(), None);

        let order: Vec<&str> = analysis.metrics.keys().map(Ticker::as_str).collect();
        assert_eq!(order, vec!["AAA", "BBB", "IBOV", "portfolio"]);
    }

    #[test]
    fn test_zero_first_price_fails_before_output() {
        let prices = PriceTable::new(dates(3))
            .unwrap()
            .with_column(Ticker::new("AAA"), vec![0.0, 1.0, 2.0])
            .unwrap()
            .with_column(Ticker::benchmark(), vec![100.0, 101.0, 102.0])
            .unwrap();

        let result = analyze(&prices, &[Ticker::new("AAA")]);
        assert!(matches!(result, Err(Error::DivisionByZero(_))));
    }

    #[test]
    fn test_insufficient_data() {
        let prices = PriceTable::new(dates(1))
            .unwrap()
            .with_column(Ticker::new("AAA"), vec![10.0])
            .unwrap()
            .with_column(Ticker::benchmark(), vec![100.0])
            .unwrap();

        let result = analyze(&prices, &[Ticker::new("AAA")]);
        assert!(matches!(result, Err(Error::InsufficientData(_))));
    }

    #[test]
    fn test_returns_and_volatility_cover_portfolio() {
        let prices = PriceTable::new(dates(5))
            .unwrap()
            .with_column(Ticker::new("AAA"), vec![10.0, 10.4, 10.1, 10.9, 11.3])
            .unwrap()
            .with_column(Ticker::new("BBB"), vec![52.0, 50.5, 51.0, 49.8, 53.2])
            .unwrap()
            .with_column(Ticker::benchmark(), vec![110.0, 111.2, 109.9, 112.4, 113.0])
            .unwrap();

        let analysis = analyze(&prices, &[Ticker::new("AAA"), Ticker::new("BBB")]).unwrap();

        for (ticker, returns) in &analysis.returns {
            assert_eq!(returns.len(), 4, "{} returns", ticker);
        }
        for metrics in analysis.metrics.values() {
            assert!(metrics.annualized_volatility > 0.0);
        }
    }
}
