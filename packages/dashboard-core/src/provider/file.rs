//! Prices read from a local JSON file.
//!
//! The file maps ticker symbols to `[date, price]` pairs:
//!
//! ```json
//! {
//!   "PETR4": [["2023-01-02", 22.1], ["2023-01-03", 21.4]],
//!   "IBOV": [["2023-01-02", 106376.0], ["2023-01-03", 104166.0]]
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use indexmap::IndexMap;

use super::{MarketDataProvider, ProviderError};
use crate::types::{PriceSeries, Ticker};

/// Provider backed by a JSON price file, loaded once on open.
#[derive(Debug)]
pub struct JsonFileProvider {
    path: PathBuf,
    series: IndexMap<Ticker, PriceSeries>,
}

impl JsonFileProvider {
    /// Read and parse the file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ProviderError> {
        let path = path.as_ref().to_path_buf();
        let content = fs::read_to_string(&path)?;
        let raw: IndexMap<String, Vec<(NaiveDate, f64)>> = serde_json::from_str(&content)?;

        let series = raw
            .into_iter()
            .map(|(symbol, points)| {
                let ticker = Ticker::new(&symbol);
                PriceSeries::new(ticker.clone(), points)
                    .map(|series| (ticker, series))
                    .map_err(|e| ProviderError::Parse(format!("{}: {}", path.display(), e)))
            })
            .collect::<Result<IndexMap<_, _>, _>>()?;

        tracing::debug!("Loaded {} series from {}", series.len(), path.display());

        Ok(Self { path, series })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MarketDataProvider for JsonFileProvider {
    fn name(&self) -> &str {
        "json-file"
    }

    fn fetch_adjusted_close(
        &self,
        tickers: &[Ticker],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<IndexMap<Ticker, PriceSeries>, ProviderError> {
        Ok(tickers
            .iter()
            .filter_map(|ticker| {
                self.series
                    .get(ticker)
                    .map(|series| series.within(start, end))
                    .filter(|series| !series.is_empty())
                    .map(|series| (ticker.clone(), series))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, day).unwrap()
    }

    #[test]
    fn test_open_and_fetch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prices.json");
        fs::write(
            &path,
            r#"{
                "petr4": [["2023-01-03", 21.4], ["2023-01-02", 22.1], ["2023-01-04", 22.0]],
                "IBOV": [["2023-01-02", 106376.0], ["2023-01-03", 104166.0]]
            }"#,
        )
        .unwrap();

        let provider = JsonFileProvider::open(&path).unwrap();
        let result = provider
            .fetch_adjusted_close(
                &[Ticker::new("PETR4"), Ticker::benchmark(), Ticker::new("VALE3")],
                date(2),
                date(3),
            )
            .unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(
            result[&Ticker::new("PETR4")].points,
            vec![(date(2), 22.1), (date(3), 21.4)]
        );
        assert_eq!(result[&Ticker::benchmark()].len(), 2);
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempdir().unwrap();
        let result = JsonFileProvider::open(dir.path().join("missing.json"));
        assert!(matches!(result, Err(ProviderError::Io(_))));
    }

    #[test]
    fn test_open_rejects_duplicate_dates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prices.json");
        fs::write(&path, r#"{"AAA": [["2023-01-02", 1.0], ["2023-01-02", 2.0]]}"#).unwrap();

        let result = JsonFileProvider::open(&path);
        assert!(matches!(result, Err(ProviderError::Parse(_))));
    }
}
