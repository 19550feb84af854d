//! Dashboard Core - equity performance dashboard library.
//!
//! Given a set of tickers and a date range, this crate fetches adjusted-close
//! prices, builds an equal-weighted portfolio next to a benchmark index and
//! prepares everything a dashboard needs to show:
//!
//! - **Analytics**: normalized prices, daily returns, annualized volatility, total return
//! - **Providers**: Yahoo Finance chart API, JSON files, in-memory series
//! - **Dashboard**: one fetch-analyse-present invocation
//! - **Rendering**: self-contained HTML/SVG page or JSON
//!
//! # Example
//!
//! ```rust,no_run
//! use chrono::NaiveDate;
//! use dashboard_core::{dashboard, DashboardConfig, DashboardRequest, Ticker, YahooProvider};
//!
//! let config = DashboardConfig::default();
//! let provider = YahooProvider::from_config(&config).unwrap();
//! let request = DashboardRequest::new(
//!     vec![Ticker::new("PETR4"), Ticker::new("VALE3")],
//!     NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(),
//!     NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
//! );
//!
//! if let Some(view) = dashboard::run(&request, &provider, &config).unwrap() {
//!     for card in &view.cards {
//!         println!("{}: {} / {}", card.label, card.total_return, card.volatility);
//!     }
//! }
//! ```

pub mod analytics;
pub mod assets;
pub mod config;
pub mod dashboard;
pub mod provider;
pub mod render;
pub mod types;

use chrono::NaiveDate;

// Re-export commonly used types
pub use types::{
    ApiResponse, DerivedMetrics, PriceSeries, PriceTable, Ticker, BENCHMARK, PORTFOLIO,
};

// Re-export main functionality
pub use analytics::{
    align, analyze, compute_portfolio_series, compute_returns, compute_total_return,
    compute_volatility, equal_weights, normalize, sharpe_proxy, AlignmentPolicy, Analysis,
    TRADING_DAYS_PER_YEAR,
};
pub use config::DashboardConfig;
pub use dashboard::{DashboardRequest, DashboardView, LineChart, MetricCard, ScatterPoint};
pub use provider::{
    JsonFileProvider, MarketDataProvider, ProviderError, StaticProvider, YahooProvider,
};
pub use render::{format_percent, HtmlRenderer, JsonRenderer, Renderer};

/// Error types for dashboard-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to fetch market data: {0}")]
    Fetch(String),

    #[error("Price series are not aligned: {0}")]
    Alignment(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Division by zero: first price of {0} is zero")]
    DivisionByZero(Ticker),

    #[error("Ticker {0} is reserved")]
    ReservedTicker(String),

    #[error("Ticker {0} was selected more than once")]
    DuplicateTicker(String),

    #[error("Invalid date range: {start} is not before {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<ProviderError> for Error {
    fn from(err: ProviderError) -> Self {
        Error::Fetch(err.to_string())
    }
}

/// Result type for dashboard-core operations.
pub type Result<T> = std::result::Result<T, Error>;
