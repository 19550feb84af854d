//! Yahoo Finance chart API client.

use std::time::Duration;

use chrono::{DateTime, Days, NaiveDate, NaiveTime};
use indexmap::IndexMap;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;

use super::{MarketDataProvider, ProviderError};
use crate::config::DashboardConfig;
use crate::types::{PriceSeries, Ticker};

/// Default chart endpoint.
pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance API response structures
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize, Default)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
    adjclose: Option<Vec<AdjClose>>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    adjclose: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

/// Daily adjusted-close prices from the Yahoo Finance chart endpoint.
///
/// Exchange suffixes are added on the way out (`PETR4` is requested as
/// `PETR4.SA`) and the benchmark is requested by its index symbol; results are
/// keyed by the tickers the caller asked for.
#[derive(Debug, Clone)]
pub struct YahooProvider {
    client: Client,
    base_url: String,
    ticker_suffix: String,
    benchmark_symbol: String,
}

impl YahooProvider {
    /// Create a provider with explicit settings.
    pub fn new(
        base_url: &str,
        ticker_suffix: &str,
        benchmark_symbol: &str,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0")
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            ticker_suffix: ticker_suffix.to_string(),
            benchmark_symbol: benchmark_symbol.to_string(),
        })
    }

    /// Create a provider from the dashboard configuration.
    pub fn from_config(config: &DashboardConfig) -> Result<Self, ProviderError> {
        Self::new(
            &config.yahoo_base_url,
            &config.ticker_suffix,
            &config.benchmark_symbol,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Symbol sent to Yahoo for a ticker.
    pub fn provider_symbol(&self, ticker: &Ticker) -> String {
        if ticker.is_benchmark() {
            return self.benchmark_symbol.clone();
        }

        let symbol = ticker.as_str();
        if symbol.contains('.') || symbol.starts_with('^') {
            symbol.to_string()
        } else {
            format!("{}{}", symbol, self.ticker_suffix)
        }
    }

    fn fetch_one(
        &self,
        ticker: &Ticker,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<PriceSeries>, ProviderError> {
        let symbol = self.provider_symbol(ticker);
        let url = format!("{}/{}", self.base_url, symbol.replace('^', "%5E"));
        let (period1, period2) = period_bounds(start, end);

        tracing::debug!("Fetching {} ({}) from {} to {}", ticker, symbol, start, end);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("includeAdjustedClose", "true".to_string()),
            ])
            .send()?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!("Yahoo has no data for {}", symbol);
            return Ok(None);
        }

        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ProviderError::Api(format!("{} for {}: {}", status, symbol, body)));
        }

        let body: ChartResponse = response.json()?;
        parse_chart(ticker, body, start, end)
    }
}

impl MarketDataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo"
    }

    fn fetch_adjusted_close(
        &self,
        tickers: &[Ticker],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<IndexMap<Ticker, PriceSeries>, ProviderError> {
        let mut result = IndexMap::new();

        for ticker in tickers {
            if let Some(series) = self.fetch_one(ticker, start, end)? {
                result.insert(ticker.clone(), series);
            }
        }

        Ok(result)
    }
}

/// Unix timestamps covering `[start, end]`; the upper bound is exclusive on Yahoo's side.
fn period_bounds(start: NaiveDate, end: NaiveDate) -> (i64, i64) {
    let from = start.and_time(NaiveTime::MIN).and_utc().timestamp();
    let to = end
        .checked_add_days(Days::new(1))
        .unwrap_or(end)
        .and_time(NaiveTime::MIN)
        .and_utc()
        .timestamp();
    (from, to)
}

fn parse_chart(
    ticker: &Ticker,
    response: ChartResponse,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Option<PriceSeries>, ProviderError> {
    if let Some(error) = response.chart.error {
        return Err(ProviderError::Api(format!(
            "{} - {}",
            error.code, error.description
        )));
    }

    let Some(data) = response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
    else {
        return Ok(None);
    };

    let Some(timestamps) = data.timestamp else {
        return Ok(None);
    };

    // Adjusted close when Yahoo provides it, plain close otherwise.
    let prices = match data.indicators.adjclose.and_then(|a| a.into_iter().next()) {
        Some(adj) => adj.adjclose,
        None => data
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|q| q.close)
            .ok_or_else(|| ProviderError::Parse(format!("no close prices for {}", ticker)))?,
    };

    let offset = data.meta.gmtoffset;
    let mut points = Vec::with_capacity(timestamps.len());
    for (ts, price) in timestamps.iter().zip(prices) {
        let Some(price) = price else {
            continue;
        };
        let date = DateTime::from_timestamp(ts + offset, 0)
            .ok_or_else(|| ProviderError::Parse(format!("invalid timestamp {}", ts)))?
            .date_naive();
        points.push((date, price));
    }

    let series = PriceSeries::new(ticker.clone(), points)
        .map_err(|e| ProviderError::Parse(e.to_string()))?
        .within(start, end);

    if series.is_empty() {
        Ok(None)
    } else {
        Ok(Some(series))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn provider() -> YahooProvider {
        YahooProvider::new(DEFAULT_BASE_URL, ".SA", "^BVSP", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_provider_symbol() {
        let provider = provider();
        assert_eq!(provider.provider_symbol(&Ticker::new("petr4")), "PETR4.SA");
        assert_eq!(provider.provider_symbol(&Ticker::benchmark()), "^BVSP");
        assert_eq!(provider.provider_symbol(&Ticker::new("AAPL.MX")), "AAPL.MX");
    }

    #[test]
    fn test_period_bounds_include_end_date() {
        let (from, to) = period_bounds(date(2023, 1, 2), date(2023, 1, 3));
        assert_eq!(from, 1_672_617_600);
        assert_eq!(to - from, 2 * 86_400);
    }

    #[test]
    fn test_parse_chart_prefers_adjclose() {
        // 2023-01-02 and 2023-01-03 at 13:00 UTC, Sao Paulo offset
        let body: ChartResponse = serde_json::from_str(
            r#"{"chart":{"result":[{
                "meta":{"symbol":"PETR4.SA","gmtoffset":-10800},
                "timestamp":[1672664400,1672750800,1672837200],
                "indicators":{
                    "quote":[{"close":[23.0,22.0,21.0]}],
                    "adjclose":[{"adjclose":[20.5,null,19.25]}]
                }
            }],"error":null}}"#,
        )
        .unwrap();

        let series = parse_chart(&Ticker::new("PETR4"), body, date(2023, 1, 1), date(2023, 1, 31))
            .unwrap()
            .unwrap();

        assert_eq!(series.ticker.as_str(), "PETR4");
        assert_eq!(
            series.points,
            vec![(date(2023, 1, 2), 20.5), (date(2023, 1, 4), 19.25)]
        );
    }

    #[test]
    fn test_parse_chart_falls_back_to_close() {
        let body: ChartResponse = serde_json::from_str(
            r#"{"chart":{"result":[{
                "meta":{"gmtoffset":0},
                "timestamp":[1672664400],
                "indicators":{"quote":[{"close":[106376.0]}]}
            }],"error":null}}"#,
        )
        .unwrap();

        let series = parse_chart(&Ticker::benchmark(), body, date(2023, 1, 1), date(2023, 1, 31))
            .unwrap()
            .unwrap();
        assert_eq!(series.points, vec![(date(2023, 1, 2), 106376.0)]);
    }

    #[test]
    fn test_parse_chart_error() {
        let body: ChartResponse = serde_json::from_str(
            r#"{"chart":{"result":null,"error":{"code":"Bad Request","description":"Invalid input"}}}"#,
        )
        .unwrap();

        let result = parse_chart(&Ticker::new("XXX"), body, date(2023, 1, 1), date(2023, 1, 31));
        assert!(matches!(result, Err(ProviderError::Api(_))));
    }

    #[test]
    fn test_parse_chart_without_timestamps_is_empty() {
        let body: ChartResponse = serde_json::from_str(
            r#"{"chart":{"result":[{"meta":{},"indicators":{"quote":[{}]}}],"error":null}}"#,
        )
        .unwrap();

        let result = parse_chart(&Ticker::new("XXX"), body, date(2023, 1, 1), date(2023, 1, 31));
        assert!(matches!(result, Ok(None)));
    }
}
