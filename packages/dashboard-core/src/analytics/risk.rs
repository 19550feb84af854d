//! Daily returns and annualized volatility.

use indexmap::IndexMap;

use crate::types::{DerivedMetrics, PriceTable, Ticker};

/// Trading days per year used to annualize daily volatility.
pub const TRADING_DAYS_PER_YEAR: u32 = 252;

/// Simple daily returns for every column.
///
/// `(p[i] - p[i-1]) / p[i-1]`; the first (undefined) return is dropped, so
/// each output is one element shorter than its price column.
pub fn compute_returns(prices: &PriceTable) -> IndexMap<Ticker, Vec<f64>> {
    prices
        .iter()
        .map(|(ticker, values)| (ticker.clone(), simple_returns(values)))
        .collect()
}

/// Simple returns between consecutive prices.
pub fn simple_returns(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .map(|pair| (pair[1] - pair[0]) / pair[0])
        .collect()
}

/// Annualized volatility for every return series, assuming 252 trading days.
pub fn compute_volatility(returns: &IndexMap<Ticker, Vec<f64>>) -> IndexMap<Ticker, f64> {
    compute_volatility_with(returns, TRADING_DAYS_PER_YEAR)
}

/// Annualized volatility for every return series.
pub fn compute_volatility_with(
    returns: &IndexMap<Ticker, Vec<f64>>,
    periods_per_year: u32,
) -> IndexMap<Ticker, f64> {
    returns
        .iter()
        .map(|(ticker, values)| (ticker.clone(), volatility(values, periods_per_year)))
        .collect()
}

/// Sample standard deviation (N-1 denominator) scaled by `sqrt(periods_per_year)`.
///
/// NaN when fewer than 2 returns are available.
pub fn volatility(returns: &[f64], periods_per_year: u32) -> f64 {
    sample_std(returns) * (periods_per_year as f64).sqrt()
}

/// Unbiased sample standard deviation; NaN for fewer than 2 values.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);

    variance.sqrt()
}

/// Return/volatility ratio used to colour the risk-return chart.
pub fn sharpe_proxy(metrics: &DerivedMetrics) -> Option<f64> {
    metrics.sharpe_proxy()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn table(columns: &[(&str, Vec<f64>)]) -> PriceTable {
        let n = columns[0].1.len() as u32;
        let dates = (1..=n)
            .map(|d| NaiveDate::from_ymd_opt(2024, 5, d).unwrap())
            .collect();
        let mut table = PriceTable::new(dates).unwrap();
        for (ticker, values) in columns {
            table.insert(Ticker::new(ticker), values.clone()).unwrap();
        }
        table
    }

    #[test]
    fn test_returns_length() {
        for n in 2..10 {
            let prices = table(&[("AAA", (1..=n).map(|i| i as f64 * 3.0).collect())]);
            let returns = compute_returns(&prices);
            assert_eq!(returns[&Ticker::new("AAA")].len(), n - 1);
        }
    }

    #[test]
    fn test_returns_values() {
        let returns = simple_returns(&[10.0, 11.0, 12.0, 11.0]);

        assert_relative_eq!(returns[0], 0.1, epsilon = 1e-12);
        assert_relative_eq!(returns[1], 1.0 / 11.0, epsilon = 1e-12);
        assert_relative_eq!(returns[2], -1.0 / 12.0, epsilon = 1e-12);
    }

    #[test]
    fn test_volatility_sample_estimator() {
        let returns = vec![0.01, -0.01, 0.02, -0.02];
        // mean 0, sum of squares 0.001, / (4 - 1)
        let expected = (0.001_f64 / 3.0).sqrt() * 252.0_f64.sqrt();

        assert_relative_eq!(volatility(&returns, 252), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_volatility_constant_prices_is_zero() {
        let prices = table(&[("FLAT", vec![50.0; 6])]);
        let vols = compute_volatility(&compute_returns(&prices));

        assert_eq!(vols[&Ticker::new("FLAT")], 0.0);
    }

    #[test]
    fn test_volatility_non_negative() {
        let prices = table(&[
            ("UP", vec![10.0, 10.5, 11.2, 11.9, 12.0]),
            ("DOWN", vec![40.0, 38.0, 37.5, 33.0, 30.1]),
            ("CHOP", vec![5.0, 6.0, 4.0, 7.0, 3.0]),
        ]);
        let vols = compute_volatility(&compute_returns(&prices));

        for (_, vol) in vols {
            assert!(vol > 0.0);
        }
    }

    #[test]
    fn test_volatility_needs_two_returns() {
        assert!(volatility(&[0.01], 252).is_nan());
        assert!(volatility(&[], 252).is_nan());
    }

    #[test]
    fn test_volatility_custom_periods() {
        let mut returns = IndexMap::new();
        returns.insert(Ticker::new("AAA"), vec![0.01, -0.01, 0.02, -0.02]);

        let daily = compute_volatility_with(&returns, 1)[&Ticker::new("AAA")];
        let yearly = compute_volatility_with(&returns, 252)[&Ticker::new("AAA")];

        assert_relative_eq!(yearly, daily * 252.0_f64.sqrt(), epsilon = 1e-12);
    }
}
