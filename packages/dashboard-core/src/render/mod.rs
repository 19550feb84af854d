//! Presentation of a finished dashboard.
//!
//! The pipeline hands a [`DashboardView`] to a [`Renderer`] only after every
//! step succeeded. Two renderers ship with the crate: a self-contained HTML
//! page with inline SVG charts, and a JSON dump of the view.

mod chart;
mod html;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::dashboard::DashboardView;
use crate::types::ApiResponse;
use crate::Result;

pub use chart::{diverging_color, line_chart, scatter_chart};
pub use html::{render_html, HtmlRenderer};

/// Output path meaning "write to stdout".
pub const STDOUT_PATH: &str = "-";

/// Consumer of a finished dashboard.
pub trait Renderer {
    fn render(&mut self, view: &DashboardView) -> Result<()>;
}

/// Format a fraction as a whole percentage: `0.1` becomes `"10%"`.
///
/// Undefined values (NaN, infinities) are shown as `"n/a"`.
pub fn format_percent(value: f64) -> String {
    if !value.is_finite() {
        return "n/a".to_string();
    }

    // `{:.0}` rounds ties to even, so 0.125 shows as 12%
    let pct = format!("{:.0}", value * 100.0);
    if pct == "-0" {
        return "0%".to_string();
    }
    format!("{}%", pct)
}

/// Escape text for HTML bodies and attribute values.
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn write_output(path: &Path, content: &str) -> Result<()> {
    if path == Path::new(STDOUT_PATH) {
        let mut stdout = io::stdout().lock();
        stdout.write_all(content.as_bytes())?;
        stdout.write_all(b"\n")?;
        return Ok(());
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    tracing::info!("Wrote {}", path.display());
    Ok(())
}

/// Writes the view as JSON, wrapped in an [`ApiResponse`].
#[derive(Debug, Clone)]
pub struct JsonRenderer {
    path: PathBuf,
}

impl JsonRenderer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Write a failed run as `{"ok": false, "error": ...}` to the same output.
    pub fn render_error(&mut self, message: &str) -> Result<()> {
        let body = serde_json::to_string_pretty(&ApiResponse::<()>::err(message))?;
        write_output(&self.path, &body)
    }
}

impl Renderer for JsonRenderer {
    fn render(&mut self, view: &DashboardView) -> Result<()> {
        let body = serde_json::to_string_pretty(&ApiResponse::ok(view))?;
        write_output(&self.path, &body)
    }
}
