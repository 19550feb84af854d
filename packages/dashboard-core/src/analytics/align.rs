//! Date alignment of fetched series and input contract checks.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::{PriceSeries, PriceTable, Ticker};
use crate::{Error, Result};

/// How to treat series whose date sets differ.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentPolicy {
    /// Fail with [`Error::Alignment`] on any difference.
    Strict,
    /// Keep only the dates every series has, logging what was dropped.
    #[default]
    InnerJoin,
}

/// Build a [`PriceTable`] from fetched series, keeping their order.
pub fn align(series: &IndexMap<Ticker, PriceSeries>, policy: AlignmentPolicy) -> Result<PriceTable> {
    let Some((first_ticker, first)) = series.first() else {
        return Err(Error::InsufficientData("No price series to align".to_string()));
    };

    let dates: Vec<NaiveDate> = match policy {
        AlignmentPolicy::Strict => {
            let reference: Vec<NaiveDate> = first.dates().collect();
            for (ticker, other) in series.iter().skip(1) {
                if !other.dates().eq(reference.iter().copied()) {
                    return Err(Error::Alignment(format!(
                        "{} has {} dates but {} has {}",
                        ticker,
                        other.len(),
                        first_ticker,
                        reference.len()
                    )));
                }
            }
            reference
        }
        AlignmentPolicy::InnerJoin => {
            let mut common: BTreeSet<NaiveDate> = first.dates().collect();
            for other in series.values().skip(1) {
                let dates: BTreeSet<NaiveDate> = other.dates().collect();
                common.retain(|date| dates.contains(date));
            }

            if common.is_empty() {
                return Err(Error::Alignment(
                    "The selected series have no trading dates in common".to_string(),
                ));
            }

            common.into_iter().collect()
        }
    };

    let mut table = PriceTable::new(dates)?;
    for (ticker, s) in series {
        let by_date: HashMap<NaiveDate, f64> = s.points.iter().copied().collect();
        let values: Vec<f64> = table
            .dates()
            .iter()
            .filter_map(|date| by_date.get(date).copied())
            .collect();

        let dropped = s.len() - values.len();
        if dropped > 0 {
            tracing::warn!(
                "Dropped {} of {} dates from {} that other series do not have",
                dropped,
                s.len(),
                ticker
            );
        }

        table.insert(ticker.clone(), values)?;
    }

    Ok(table)
}

/// Check the analytics input contract.
///
/// The table must hold the benchmark and every user ticker, with at least two
/// dates, and the user tickers must not use a reserved name.
pub fn validate(prices: &PriceTable, tickers: &[Ticker]) -> Result<()> {
    if tickers.is_empty() {
        return Err(Error::InsufficientData("No tickers selected".to_string()));
    }

    if let Some(reserved) = tickers.iter().find(|t| t.is_reserved()) {
        return Err(Error::ReservedTicker(reserved.to_string()));
    }

    if prices.contains(&Ticker::portfolio()) {
        return Err(Error::ReservedTicker(Ticker::portfolio().to_string()));
    }

    if !prices.contains(&Ticker::benchmark()) {
        return Err(Error::InsufficientData(format!(
            "Benchmark {} is missing",
            Ticker::benchmark()
        )));
    }

    if let Some(missing) = tickers.iter().find(|t| !prices.contains(t)) {
        return Err(Error::InsufficientData(format!("No prices for {}", missing)));
    }

    if prices.len() < 2 {
        let ticker = prices
            .tickers()
            .next()
            .map(Ticker::to_string)
            .unwrap_or_default();
        return Err(Error::InsufficientData(format!(
            "{} has {} price(s); at least 2 are needed to compute returns",
            ticker,
            prices.len()
        )));
    }

    Ok(())
}
