//! Relative performance: normalized prices and total return.

use indexmap::IndexMap;

use crate::types::{PriceTable, Ticker};
use crate::{Error, Result};

/// Base value every normalized series starts from.
pub const NORMALIZED_BASE: f64 = 100.0;

/// Rescale every column so that its first observation equals 100.
///
/// The first point is written as exactly `100.0`; later points are
/// `100 * p / p[0]`. Fails with [`Error::DivisionByZero`] if a first price is zero.
pub fn normalize(prices: &PriceTable) -> Result<PriceTable> {
    let mut normalized = PriceTable::new(prices.dates().to_vec())?;

    for (ticker, values) in prices.iter() {
        let Some(&first) = values.first() else {
            return Err(Error::InsufficientData(format!(
                "{} has no prices to normalize",
                ticker
            )));
        };

        if first == 0.0 {
            return Err(Error::DivisionByZero(ticker.clone()));
        }

        let rescaled = values
            .iter()
            .enumerate()
            .map(|(i, price)| {
                if i == 0 {
                    NORMALIZED_BASE
                } else {
                    NORMALIZED_BASE * price / first
                }
            })
            .collect();

        normalized.insert(ticker.clone(), rescaled)?;
    }

    Ok(normalized)
}

/// Cumulative return over the window for every normalized column.
///
/// `(last - 100) / 100`, i.e. 0.10 for a 10% gain.
pub fn compute_total_return(normalized: &PriceTable) -> IndexMap<Ticker, f64> {
    normalized
        .iter()
        .map(|(ticker, values)| {
            let last = values.last().copied().unwrap_or(f64::NAN);
            (ticker.clone(), (last - NORMALIZED_BASE) / NORMALIZED_BASE)
        })
        .collect()
}

/// Holding period return from raw prices as a fraction.
pub fn holding_period_return(initial_value: f64, final_value: f64) -> f64 {
    if initial_value == 0.0 {
        return f64::NAN;
    }
    (final_value - initial_value) / initial_value
}
