//! Standalone HTML page.

use std::path::PathBuf;

use super::chart::{line_chart, scatter_chart};
use super::{escape, write_output, Renderer};
use crate::dashboard::{DashboardView, MetricCard};
use crate::Result;

const TEMPLATE: &str = include_str!("template.html");

/// Writes the dashboard as a single HTML file with inline SVG charts.
#[derive(Debug, Clone)]
pub struct HtmlRenderer {
    path: PathBuf,
}

impl HtmlRenderer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Renderer for HtmlRenderer {
    fn render(&mut self, view: &DashboardView) -> Result<()> {
        write_output(&self.path, &render_html(view))
    }
}

fn sign_class(value: f64) -> &'static str {
    if value > 0.0 {
        "positive"
    } else if value < 0.0 {
        "negative"
    } else {
        ""
    }
}

fn card_html(card: &MetricCard) -> String {
    format!(
        r#"<div class="card"><img src="{icon}" alt="{label}"><div><div class="ticker">{label}</div><div class="metric">Return: <span class="{class}">{ret}</span></div><div class="metric">Volatility: {vol}</div></div></div>"#,
        icon = escape(&card.icon_url),
        label = escape(&card.label),
        class = sign_class(card.total_return),
        ret = card.formatted_return(),
        vol = card.formatted_volatility()
    )
}

/// Build the full page for `view`.
pub fn render_html(view: &DashboardView) -> String {
    let date_range = format!(
        "{} - {}",
        view.start.format("%d/%m/%Y"),
        view.end.format("%d/%m/%Y")
    );
    let cards = view
        .cards
        .iter()
        .map(card_html)
        .collect::<Vec<_>>()
        .join("\n");
    let title = escape(&view.title);
    let performance_title = escape(&view.performance.title);
    let performance = line_chart(&view.performance);
    let risk_return = scatter_chart(&view.risk_return);

    fill_template(
        TEMPLATE,
        &[
            ("title", title.as_str()),
            ("date_range", date_range.as_str()),
            ("cards", cards.as_str()),
            ("performance_title", performance_title.as_str()),
            ("performance", performance.as_str()),
            ("risk_return", risk_return.as_str()),
        ],
    )
}

/// Replace `{{key}}` placeholders in one pass.
///
/// Substituted values are copied as-is and never scanned for placeholders;
/// unknown keys are left in place.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];

        let Some(close) = after.find("}}") else {
            out.push_str(&rest[open..]);
            return out;
        };

        let key = &after[..close];
        match values.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[open..open + close + 4]),
        }
        rest = &after[close + 2..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::tests::sample_view;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_render_html_contains_sections() {
        let html = render_html(&sample_view());

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Equity Dashboard</title>"));
        assert!(html.contains("02/01/2023 - 04/01/2023"));
        assert!(html.contains("Relative performance"));
        assert!(html.contains("Risk / return"));
        assert!(!html.contains("{{"));

        assert_eq!(html.matches(r#"<div class="card">"#).count(), 3);
        assert!(html.contains(r#"<span class="positive">20%</span>"#));
        assert!(html.contains("Volatility: 35%"));
        assert!(html.contains("icones-b3/main/icones/AAA.png"));
    }

    #[test]
    fn test_cards_keep_view_order() {
        let html = render_html(&sample_view());
        let aaa = html.find(r#"alt="AAA""#).unwrap();
        let ibov = html.find(r#"alt="IBOV""#).unwrap();
        let portfolio = html.find(r#"alt="portfolio""#).unwrap();
        assert!(aaa < ibov && ibov < portfolio);
    }

    #[test]
    fn test_title_is_escaped() {
        let mut view = sample_view();
        view.title = "<script>".to_string();
        let html = render_html(&view);
        assert!(html.contains("<title>&lt;script&gt;</title>"));
        assert!(!html.contains("<title><script>"));
    }

    #[test]
    fn test_placeholder_in_title_is_not_expanded() {
        let mut view = sample_view();
        view.title = "{{cards}} {{risk_return}}".to_string();
        let html = render_html(&view);

        assert!(html.contains("<title>{{cards}} {{risk_return}}</title>"));
        assert!(html.contains("<h1>{{cards}} {{risk_return}}</h1>"));
        assert_eq!(html.matches(r#"<div class="card">"#).count(), 3);
    }

    #[test]
    fn test_fill_template() {
        let filled = fill_template(
            "a {{x}} b {{y}} c {{unknown}} {{open",
            &[("x", "{{y}}"), ("y", "2")],
        );
        assert_eq!(filled, "a {{y}} b 2 c {{unknown}} {{open");
    }

    #[test]
    fn test_html_renderer_writes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dashboard.html");
        let mut renderer = HtmlRenderer::new(&path);

        renderer.render(&sample_view()).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, render_html(&sample_view()));
    }
}
