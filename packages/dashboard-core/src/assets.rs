//! Icon lookup for metric cards.

use crate::types::Ticker;

const PORTFOLIO_ICON: &str = "https://raw.githubusercontent.com/codigoquant/stock_dashboard/c9f45ca0748dd827fc13e29ee51a941a74dfad95/images/pie-chart-dollar-svgrepo-com.svg";
const BENCHMARK_ICON: &str = "https://raw.githubusercontent.com/codigoquant/stock_dashboard/c9f45ca0748dd827fc13e29ee51a941a74dfad95/images/pie-chart-svgrepo-com.svg";
const TICKER_ICON_BASE: &str = "https://raw.githubusercontent.com/thefintz/icones-b3/main/icones";

/// Icon URL shown next to a ticker's metrics.
pub fn icon_url(ticker: &Ticker) -> String {
    if ticker.is_portfolio() {
        PORTFOLIO_ICON.to_string()
    } else if ticker.is_benchmark() {
        BENCHMARK_ICON.to_string()
    } else {
        format!("{}/{}.png", TICKER_ICON_BASE, ticker)
    }
}
