//! One dashboard invocation: fetch, align, analyse, present.
//!
//! Every error is terminal for the invocation. Nothing is rendered unless the
//! whole pipeline succeeds, and the user retries with new inputs.

use std::collections::HashSet;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;

use crate::analytics::{self, Analysis};
use crate::assets::icon_url;
use crate::config::DashboardConfig;
use crate::provider::MarketDataProvider;
use crate::render::{format_percent, JsonRenderer, Renderer};
use crate::types::{PriceSeries, Ticker};
use crate::{Error, Result};

/// User input for one invocation.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardRequest {
    /// Selected tickers, in selection order
    pub tickers: Vec<Ticker>,
    /// First date of the window (inclusive)
    pub start: NaiveDate,
    /// Last date of the window (inclusive)
    pub end: NaiveDate,
}

impl DashboardRequest {
    pub fn new(tickers: Vec<Ticker>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            tickers,
            start,
            end,
        }
    }

    /// Parse a comma-separated ticker list such as `"PETR4, vale3"`.
    pub fn parse_tickers(list: &str) -> Vec<Ticker> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Ticker::new)
            .collect()
    }

    /// Reject reserved or repeated tickers and empty date windows.
    pub fn validate(&self) -> Result<()> {
        if self.start >= self.end {
            return Err(Error::InvalidDateRange {
                start: self.start,
                end: self.end,
            });
        }

        let mut seen = HashSet::new();
        for ticker in &self.tickers {
            if ticker.is_reserved() {
                return Err(Error::ReservedTicker(ticker.to_string()));
            }
            if !seen.insert(ticker) {
                return Err(Error::DuplicateTicker(ticker.to_string()));
            }
        }

        Ok(())
    }
}

/// Labelled metrics for one ticker.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MetricCard {
    pub ticker: Ticker,
    pub label: String,
    pub icon_url: String,
    /// Total return over the window as a fraction
    pub total_return: f64,
    /// Annualized volatility as a fraction
    pub volatility: f64,
}

impl MetricCard {
    pub fn formatted_return(&self) -> String {
        format_percent(self.total_return)
    }

    pub fn formatted_volatility(&self) -> String {
        format_percent(self.volatility)
    }
}

/// One line of the relative performance chart.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LineSeries {
    pub label: String,
    pub values: Vec<f64>,
}

/// Normalized prices over time.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LineChart {
    pub title: String,
    pub dates: Vec<NaiveDate>,
    pub series: Vec<LineSeries>,
}

/// One point of the risk/return chart.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScatterPoint {
    pub label: String,
    /// x: annualized volatility
    pub volatility: f64,
    /// y: total return
    pub total_return: f64,
    /// colour: return / volatility
    pub sharpe: Option<f64>,
}

/// Everything the renderer needs, in presentation order.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardView {
    pub title: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub cards: Vec<MetricCard>,
    pub performance: LineChart,
    pub risk_return: Vec<ScatterPoint>,
}

/// Presentation order: selection order, then the benchmark, then the portfolio.
pub fn display_order(tickers: &[Ticker]) -> Vec<Ticker> {
    tickers
        .iter()
        .filter(|t| !t.is_reserved())
        .cloned()
        .chain([Ticker::benchmark(), Ticker::portfolio()])
        .collect()
}

/// Run one invocation.
///
/// Returns `Ok(None)` when no tickers were selected; the pipeline is not
/// invoked and no data is fetched.
pub fn run(
    request: &DashboardRequest,
    provider: &dyn MarketDataProvider,
    config: &DashboardConfig,
) -> Result<Option<DashboardView>> {
    if request.tickers.is_empty() {
        tracing::debug!("No tickers selected, nothing to do");
        return Ok(None);
    }

    request.validate()?;

    tracing::info!(
        "Building dashboard for {} ticker(s) from {} to {} using {}",
        request.tickers.len(),
        request.start,
        request.end,
        provider.name()
    );

    let mut fetched = fetch(provider, &request.tickers, request.start, request.end)?;
    let benchmark = fetch(
        provider,
        &[Ticker::benchmark()],
        request.start,
        request.end,
    )?;
    fetched.extend(benchmark);

    let prices = analytics::align(&fetched, config.alignment)?;
    let analysis =
        analytics::analyze_with(&prices, &request.tickers, config.trading_days_per_year)?;

    build_view(&config.title, request, &analysis).map(Some)
}

/// Run one invocation and hand the result to `renderer`.
///
/// The renderer is only invoked when the whole pipeline succeeded.
pub fn run_and_render(
    request: &DashboardRequest,
    provider: &dyn MarketDataProvider,
    renderer: &mut dyn Renderer,
    config: &DashboardConfig,
) -> Result<Option<DashboardView>> {
    let Some(view) = run(request, provider, config)? else {
        return Ok(None);
    };

    renderer.render(&view)?;
    Ok(Some(view))
}

/// [`run_and_render`] for JSON output.
///
/// A failed run is also written to the renderer's output as an error
/// response, so JSON consumers see the failure. The error is still returned.
pub fn run_and_render_json(
    request: &DashboardRequest,
    provider: &dyn MarketDataProvider,
    renderer: &mut JsonRenderer,
    config: &DashboardConfig,
) -> Result<Option<DashboardView>> {
    let result = run_and_render(request, provider, renderer, config);
    if let Err(err) = &result {
        renderer.render_error(&err.to_string())?;
    }
    result
}

/// Fetch `tickers`, in request order, failing on errors or missing data.
fn fetch(
    provider: &dyn MarketDataProvider,
    tickers: &[Ticker],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<IndexMap<Ticker, PriceSeries>> {
    let names = tickers
        .iter()
        .map(Ticker::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    let mut fetched = provider
        .fetch_adjusted_close(tickers, start, end)
        .map_err(|e| Error::Fetch(format!("could not download {}: {}", names, e)))?;

    if fetched.is_empty() {
        return Err(Error::Fetch(format!(
            "no prices returned for {} between {} and {}",
            names, start, end
        )));
    }

    let mut ordered = IndexMap::with_capacity(tickers.len());
    for ticker in tickers {
        match fetched.swap_remove(ticker) {
            Some(series) if !series.is_empty() => {
                tracing::debug!("Fetched {} prices for {}", series.len(), ticker);
                ordered.insert(ticker.clone(), series);
            }
            _ => {
                return Err(Error::Fetch(format!(
                    "no prices returned for {} between {} and {}",
                    ticker, start, end
                )))
            }
        }
    }

    Ok(ordered)
}

/// Turn an analysis into display requests.
pub fn build_view(
    title: &str,
    request: &DashboardRequest,
    analysis: &Analysis,
) -> Result<DashboardView> {
    let order = display_order(&request.tickers);

    let mut cards = Vec::with_capacity(order.len());
    let mut series = Vec::with_capacity(order.len());
    let mut risk_return = Vec::with_capacity(order.len());

    for ticker in &order {
        let metrics = analysis.metrics_for(ticker).ok_or_else(|| {
            Error::InsufficientData(format!("No metrics computed for {}", ticker))
        })?;
        let normalized = analysis.normalized.get(ticker).ok_or_else(|| {
            Error::InsufficientData(format!("No normalized prices for {}", ticker))
        })?;

        cards.push(MetricCard {
            ticker: ticker.clone(),
            label: ticker.to_string(),
            icon_url: icon_url(ticker),
            total_return: metrics.total_return,
            volatility: metrics.annualized_volatility,
        });

        series.push(LineSeries {
            label: ticker.to_string(),
            values: normalized.to_vec(),
        });

        risk_return.push(ScatterPoint {
            label: ticker.to_string(),
            volatility: metrics.annualized_volatility,
            total_return: metrics.total_return,
            sharpe: metrics.sharpe_proxy(),
        });
    }

    Ok(DashboardView {
        title: title.to_string(),
        start: request.start,
        end: request.end,
        cards,
        performance: LineChart {
            title: "Relative performance".to_string(),
            dates: analysis.normalized.dates().to_vec(),
            series,
        },
        risk_return,
    })
}
