//! Inline SVG charts.

use chrono::{Datelike, NaiveDate};

use super::{escape, format_percent};
use crate::dashboard::{LineChart, ScatterPoint};

const WIDTH: i32 = 640;
const HEIGHT: i32 = 420;
const PADDING: f64 = 48.0;
const AXIS_COLOR: &str = "#444";
const GRID_COLOR: &str = "#e3e3e3";
const MUTED_COLOR: &str = "#8c8c8c";
const POINT_RADIUS: f64 = 16.0;
const Y_TICKS: usize = 5;
const NOT_ENOUGH_DATA: &str =
    r#"<p class="empty">Not enough data to estimate volatility for this period.</p>"#;

const PALETTE: [&str; 10] = [
    "#348dc1", "#ff9933", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#17becf",
    "#bcbd22", "#7f7f7f",
];

/// Closed interval covered by an axis.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Extent {
    min: f64,
    max: f64,
}

impl Extent {
    /// Extent of the finite values, widened so it is never flat.
    fn of(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for v in values.into_iter().filter(|v| v.is_finite()) {
            min = min.min(v);
            max = max.max(v);
        }

        if !min.is_finite() || !max.is_finite() {
            return None;
        }

        if min == max {
            let adjust = if min == 0.0 { 1.0 } else { min.abs() * 0.1 };
            min -= adjust;
            max += adjust;
        }

        Some(Self { min, max })
    }

    /// Grow by `fraction` of the span on both sides.
    fn padded(self, fraction: f64) -> Self {
        let pad = (self.max - self.min) * fraction;
        Self {
            min: self.min - pad,
            max: self.max + pad,
        }
    }

    fn ticks(self, count: usize) -> Vec<f64> {
        let step = (self.max - self.min) / (count.max(2) - 1) as f64;
        (0..count.max(2))
            .map(|i| self.min + step * i as f64)
            .collect()
    }
}

fn scale_y(value: f64, extent: Extent, height: f64) -> f64 {
    let inner_height = height - 2.0 * PADDING;
    let norm = (value - extent.min) / (extent.max - extent.min);
    PADDING + (1.0 - norm) * inner_height
}

fn scale_x(value: f64, extent: Extent, width: f64) -> f64 {
    let inner_width = width - 2.0 * PADDING;
    let norm = (value - extent.min) / (extent.max - extent.min);
    PADDING + norm * inner_width
}

fn x_positions(len: usize, width: f64) -> Vec<f64> {
    if len == 0 {
        return Vec::new();
    }

    if len == 1 {
        return vec![width / 2.0];
    }

    let inner_width = width - 2.0 * PADDING;
    (0..len)
        .map(|i| PADDING + inner_width * (i as f64 / (len - 1) as f64))
        .collect()
}

fn svg_header(width: i32, height: i32) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}"><style>text{{font-family:Arial,sans-serif;font-size:10px;fill:#666}}</style>"#,
        w = width,
        h = height
    )
}

fn svg_footer() -> &'static str {
    "</svg>"
}

fn add_value_axis(svg: &mut String, extent: Extent, width: f64, height: f64, percent: bool) {
    for tick in extent.ticks(Y_TICKS) {
        let y = scale_y(tick, extent, height);
        let label = if percent {
            format_percent(tick)
        } else {
            format!("{:.0}", tick)
        };

        svg.push_str(&format!(
            r#"<line x1="{x1:.2}" y1="{y:.2}" x2="{x2:.2}" y2="{y:.2}" stroke="{color}" stroke-width="0.5" />"#,
            x1 = PADDING,
            x2 = width - PADDING,
            y = y,
            color = GRID_COLOR
        ));
        svg.push_str(&format!(
            r#"<text x="{x:.2}" y="{y:.2}" text-anchor="end">{label}</text>"#,
            x = PADDING - 6.0,
            y = y + 3.0,
            label = label
        ));
    }
}

fn add_time_axis(svg: &mut String, dates: &[NaiveDate], xs: &[f64], width: f64, height: f64) {
    if dates.is_empty() || xs.is_empty() {
        return;
    }

    let axis_y = height - PADDING;
    svg.push_str(&format!(
        r#"<line x1="{x1:.2}" y1="{y:.2}" x2="{x2:.2}" y2="{y:.2}" stroke="{color}" stroke-width="1" />"#,
        x1 = PADDING,
        x2 = width - PADDING,
        y = axis_y,
        color = AXIS_COLOR
    ));

    // One label per month, thinned so that at most ~8 are shown.
    let months: Vec<usize> = dates
        .iter()
        .enumerate()
        .filter(|(i, d)| *i == 0 || (d.year(), d.month()) != (dates[i - 1].year(), dates[i - 1].month()))
        .map(|(i, _)| i)
        .collect();
    let stride = months.len().div_ceil(8).max(1);

    for &idx in months.iter().step_by(stride) {
        let x = xs[idx];
        svg.push_str(&format!(
            r#"<line x1="{x:.2}" y1="{y1:.2}" x2="{x:.2}" y2="{y2:.2}" stroke="{color}" stroke-width="0.5" />"#,
            x = x,
            y1 = PADDING,
            y2 = axis_y,
            color = GRID_COLOR
        ));
        svg.push_str(&format!(
            r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle">{label}</text>"#,
            x = x,
            y = axis_y + 16.0,
            label = dates[idx].format("%m/%Y")
        ));
    }
}

fn add_legend(svg: &mut String, entries: &[(String, &str)]) {
    let x = PADDING + 10.0;
    let mut y = PADDING + 14.0;

    for (label, color) in entries {
        svg.push_str(&format!(
            r#"<line x1="{x1:.2}" y1="{y:.2}" x2="{x2:.2}" y2="{y:.2}" stroke="{color}" stroke-width="2" />"#,
            x1 = x,
            x2 = x + 20.0,
            y = y - 4.0,
            color = color
        ));
        svg.push_str(&format!(
            r##"<text x="{x:.2}" y="{y:.2}" text-anchor="start" fill="#333">{label}</text>"##,
            x = x + 26.0,
            y = y,
            label = escape(label)
        ));
        y += 14.0;
    }
}

/// Multi-series line chart of normalized prices.
pub fn line_chart(chart: &LineChart) -> String {
    if chart.dates.is_empty() || chart.series.is_empty() {
        return String::new();
    }

    let width = WIDTH as f64;
    let height = HEIGHT as f64;
    let xs = x_positions(chart.dates.len(), width);

    let Some(extent) = Extent::of(chart.series.iter().flat_map(|s| s.values.iter().copied()))
    else {
        return String::new();
    };
    let extent = extent.padded(0.05);

    let mut svg = svg_header(WIDTH, HEIGHT);
    add_value_axis(&mut svg, extent, width, height, false);

    let mut legend = Vec::with_capacity(chart.series.len());
    for (i, series) in chart.series.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        let points = xs
            .iter()
            .zip(&series.values)
            .filter(|(_, v)| v.is_finite())
            .map(|(x, v)| format!("{:.2},{:.2}", x, scale_y(*v, extent, height)))
            .collect::<Vec<_>>()
            .join(" ");

        svg.push_str(&format!(
            r#"<polyline fill="none" stroke="{color}" stroke-width="1.5" points="{points}" />"#,
            color = color,
            points = points
        ));
        legend.push((series.label.clone(), color));
    }

    add_time_axis(&mut svg, &chart.dates, &xs, width, height);
    add_legend(&mut svg, &legend);

    svg.push_str(svg_footer());
    svg
}

/// Reversed blue-red diverging scale: `t = 0` is red, `t = 1` is blue.
pub fn diverging_color(t: f64) -> String {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.5 };
    let red = (255.0 * (1.0 - t)).round() as u8;
    let blue = (255.0 * t).round() as u8;
    format!("#{:02x}00{:02x}", red, blue)
}

/// Risk/return scatter: x is volatility, y is total return, colour is the Sharpe proxy.
///
/// Points without a finite volatility and return are left out. When none
/// remain (a two-date window has no volatility) a short notice replaces the chart.
pub fn scatter_chart(points: &[ScatterPoint]) -> String {
    let points: Vec<&ScatterPoint> = points
        .iter()
        .filter(|p| p.volatility.is_finite() && p.total_return.is_finite())
        .collect();

    let width = WIDTH as f64;
    let height = HEIGHT as f64;

    let (Some(x_extent), Some(y_extent)) = (
        Extent::of(points.iter().map(|p| p.volatility)),
        Extent::of(points.iter().map(|p| p.total_return)),
    ) else {
        return NOT_ENOUGH_DATA.to_string();
    };
    let x_extent = x_extent.padded(0.15);
    let y_extent = y_extent.padded(0.15);
    let sharpe_extent = Extent::of(points.iter().filter_map(|p| p.sharpe));

    let mut svg = svg_header(WIDTH, HEIGHT);
    add_value_axis(&mut svg, y_extent, width, height, true);

    let axis_y = height - PADDING;
    svg.push_str(&format!(
        r#"<line x1="{x1:.2}" y1="{y:.2}" x2="{x2:.2}" y2="{y:.2}" stroke="{color}" stroke-width="1" />"#,
        x1 = PADDING,
        x2 = width - PADDING,
        y = axis_y,
        color = AXIS_COLOR
    ));
    for tick in x_extent.ticks(Y_TICKS) {
        svg.push_str(&format!(
            r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle">{label}</text>"#,
            x = scale_x(tick, x_extent, width),
            y = axis_y + 16.0,
            label = format_percent(tick)
        ));
    }
    svg.push_str(&format!(
        r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle">Volatility (annualized)</text>"#,
        x = width / 2.0,
        y = height - 8.0
    ));
    svg.push_str(&format!(
        r#"<text x="12" y="{y:.2}" text-anchor="middle" transform="rotate(-90 12 {y:.2})">Total return</text>"#,
        y = height / 2.0
    ));

    for point in &points {
        let color = match (point.sharpe, sharpe_extent) {
            (Some(s), Some(extent)) => diverging_color((s - extent.min) / (extent.max - extent.min)),
            _ => MUTED_COLOR.to_string(),
        };
        let cx = scale_x(point.volatility, x_extent, width);
        let cy = scale_y(point.total_return, y_extent, height);

        svg.push_str(&format!(
            r#"<circle cx="{cx:.2}" cy="{cy:.2}" r="{r:.1}" fill="{color}" fill-opacity="0.85"><title>{label}: {ret} / {vol}</title></circle>"#,
            cx = cx,
            cy = cy,
            r = POINT_RADIUS,
            color = color,
            label = escape(&point.label),
            ret = format_percent(point.total_return),
            vol = format_percent(point.volatility)
        ));
        svg.push_str(&format!(
            r##"<text x="{cx:.2}" y="{y:.2}" text-anchor="middle" style="fill:#fff;font-size:8px">{label}</text>"##,
            cx = cx,
            y = cy + 3.0,
            label = escape(&point.label)
        ));
    }

    if let Some(extent) = sharpe_extent {
        add_color_bar(&mut svg, extent, width);
    }

    svg.push_str(svg_footer());
    svg
}

fn add_color_bar(svg: &mut String, extent: Extent, width: f64) {
    let x = width - PADDING + 12.0;
    let top = PADDING;
    let bar_height = 120.0;

    svg.push_str(&format!(
        r#"<defs><linearGradient id="sharpe-scale" x1="0" y1="1" x2="0" y2="0"><stop offset="0" stop-color="{low}" /><stop offset="1" stop-color="{high}" /></linearGradient></defs>"#,
        low = diverging_color(0.0),
        high = diverging_color(1.0)
    ));
    svg.push_str(&format!(
        r#"<rect x="{x:.2}" y="{y:.2}" width="10" height="{h:.2}" fill="url(#sharpe-scale)" />"#,
        x = x,
        y = top,
        h = bar_height
    ));
    svg.push_str(&format!(
        r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle">Sharpe</text>"#,
        x = x + 5.0,
        y = top - 8.0
    ));
    svg.push_str(&format!(
        r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle">{max:.1}</text><text x="{x:.2}" y="{y2:.2}" text-anchor="middle">{min:.1}</text>"#,
        x = x + 5.0,
        y = top + 10.0 + bar_height,
        y2 = top + 22.0 + bar_height,
        max = extent.max,
        min = extent.min
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::LineSeries;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, m, d).unwrap()
    }

    #[test]
    fn test_extent_widens_flat_range() {
        let extent = Extent::of([100.0, 100.0]).unwrap();
        assert!(extent.min < 100.0 && extent.max > 100.0);

        let zero = Extent::of([0.0]).unwrap();
        assert_eq!((zero.min, zero.max), (-1.0, 1.0));

        assert!(Extent::of([f64::NAN]).is_none());
    }

    #[test]
    fn test_scale_maps_extent_to_plot_area() {
        let extent = Extent { min: 0.0, max: 1.0 };
        let height = HEIGHT as f64;
        assert_eq!(scale_y(0.0, extent, height), height - PADDING);
        assert_eq!(scale_y(1.0, extent, height), PADDING);
    }

    #[test]
    fn test_diverging_color() {
        assert_eq!(diverging_color(0.0), "#ff0000");
        assert_eq!(diverging_color(1.0), "#0000ff");
        assert_eq!(diverging_color(f64::NAN), "#800080");
    }

    #[test]
    fn test_line_chart_has_one_polyline_per_series() {
        let chart = LineChart {
            title: "Relative performance".to_string(),
            dates: vec![date(1, 2), date(1, 3), date(2, 1)],
            series: vec![
                LineSeries {
                    label: "AAA".to_string(),
                    values: vec![100.0, 110.0, 120.0],
                },
                LineSeries {
                    label: "IBOV".to_string(),
                    values: vec![100.0, 101.0, 99.0],
                },
            ],
        };

        let svg = line_chart(&chart);
        assert!(svg.starts_with("<svg"));
        assert_eq!(svg.matches("<polyline").count(), 2);
        assert!(svg.contains(">AAA</text>"));
        assert!(svg.contains(">02/2023</text>"));
    }

    #[test]
    fn test_line_chart_empty() {
        let chart = LineChart {
            title: String::new(),
            dates: Vec::new(),
            series: Vec::new(),
        };
        assert!(line_chart(&chart).is_empty());
    }

    #[test]
    fn test_scatter_chart_points() {
        let points = vec![
            ScatterPoint {
                label: "AAA".to_string(),
                volatility: 0.3,
                total_return: 0.1,
                sharpe: Some(1.0 / 3.0),
            },
            ScatterPoint {
                label: "FLAT".to_string(),
                volatility: 0.0,
                total_return: 0.0,
                sharpe: None,
            },
        ];

        let svg = scatter_chart(&points);
        assert_eq!(svg.matches("<circle").count(), 2);
        assert!(svg.contains(MUTED_COLOR));
        assert!(svg.contains("Sharpe"));
        assert!(svg.contains("Volatility (annualized)"));
    }

    #[test]
    fn test_scatter_chart_without_volatility() {
        // two dates give one return per series, so no volatility
        let points = vec![
            ScatterPoint {
                label: "AAA".to_string(),
                volatility: f64::NAN,
                total_return: 0.1,
                sharpe: None,
            },
            ScatterPoint {
                label: "IBOV".to_string(),
                volatility: f64::NAN,
                total_return: 0.02,
                sharpe: None,
            },
        ];

        let html = scatter_chart(&points);
        assert!(!html.contains("<svg"));
        assert!(html.contains("Not enough data"));
        assert_eq!(scatter_chart(&[]), html);
    }

    #[test]
    fn test_scatter_chart_skips_undefined_points() {
        let points = vec![
            ScatterPoint {
                label: "AAA".to_string(),
                volatility: 0.3,
                total_return: 0.1,
                sharpe: Some(1.0 / 3.0),
            },
            ScatterPoint {
                label: "BBB".to_string(),
                volatility: f64::NAN,
                total_return: 0.05,
                sharpe: None,
            },
        ];

        let svg = scatter_chart(&points);
        assert_eq!(svg.matches("<circle").count(), 1);
        assert!(!svg.contains(">BBB</text>"));
    }
}
