//! Interactive HTML chart of per-bucket cumulative returns.
//!
//! The output is a standalone page that loads Plotly from its CDN; traces and layout
//! are embedded as JSON.

use seasonality_core::{BucketKey, Bucketing, Result, SeasonalityError, SeasonalityReport};
use serde::Serialize;
use serde_json::json;
use std::path::Path;
use tracing::{debug, instrument};

/// Plotly bundle loaded by the generated page.
pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Line colours, assigned to buckets in label order.
const PALETTE: [(u8, u8, u8); 12] = [
    (255, 0, 0),
    (0, 0, 255),
    (0, 255, 0),
    (255, 255, 0),
    (255, 183, 176),
    (255, 145, 0),
    (0, 255, 255),
    (255, 51, 153),
    (153, 51, 255),
    (0, 204, 204),
    (204, 102, 0),
    (102, 102, 255),
];

const CHART_ID: &str = "seasonality-chart";

/// Presentation settings for [`ChartRenderer`].
#[derive(Clone, Debug, PartialEq)]
pub struct ChartOptions {
    /// Chart and page title.
    pub title: String,
    /// Line width of the current bucket.
    pub highlight_width: f64,
    /// Line width of every other bucket.
    pub base_width: f64,
    /// Opacity of every other bucket.
    pub dim_alpha: f64,
    /// Script URL of the Plotly bundle.
    pub plotly_src: String,
}

impl ChartOptions {
    /// Creates options with the given title and default styling.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            highlight_width: 3.0,
            base_width: 1.0,
            dim_alpha: 0.4,
            plotly_src: PLOTLY_CDN.to_string(),
        }
    }

    /// Default options for an asset and bucketing, e.g. "BTCUSDT Cumulative Returns by Weekday".
    #[must_use]
    pub fn for_bucketing(asset: &str, bucketing: Bucketing) -> Self {
        Self::new(format!("{asset} Cumulative Returns by {}", bucketing.title()))
    }

    /// Sets the opacity of non-highlighted buckets.
    #[must_use]
    pub fn with_dim_alpha(mut self, alpha: f64) -> Self {
        self.dim_alpha = alpha;
        self
    }
}

#[derive(Debug, Serialize)]
struct Line {
    color: String,
    width: f64,
}

#[derive(Debug, Serialize)]
struct Trace {
    #[serde(rename = "type")]
    kind: &'static str,
    mode: &'static str,
    name: String,
    x: Vec<String>,
    y: Vec<f64>,
    line: Line,
}

/// Renders a [`SeasonalityReport`] as an interactive cumulative-return chart.
#[derive(Clone, Debug)]
pub struct ChartRenderer {
    options: ChartOptions,
}

impl ChartRenderer {
    /// Create a renderer with the given options.
    #[must_use]
    pub const fn new(options: ChartOptions) -> Self {
        Self { options }
    }

    fn traces(&self, report: &SeasonalityReport, current: BucketKey) -> Vec<Trace> {
        report
            .iter()
            .enumerate()
            .filter(|(_, bucket)| !bucket.is_empty())
            .map(|(i, bucket)| {
                let (r, g, b) = PALETTE[i % PALETTE.len()];
                let (alpha, width) = if bucket.key == current {
                    (1.0, self.options.highlight_width)
                } else {
                    (self.options.dim_alpha, self.options.base_width)
                };
                Trace {
                    kind: "scatter",
                    mode: "lines",
                    name: bucket.label.clone(),
                    x: bucket
                        .trajectory
                        .iter()
                        .map(|p| p.timestamp.format("%Y-%m-%d %H:%M:%S").to_string())
                        .collect(),
                    y: bucket.trajectory.iter().map(|p| p.cumulative_return).collect(),
                    line: Line {
                        color: format!("rgba({r}, {g}, {b}, {alpha})"),
                        width,
                    },
                }
            })
            .collect()
    }

    fn layout(&self) -> serde_json::Value {
        let axis_font = json!({ "color": "white" });
        json!({
            "title": { "text": self.options.title, "font": { "color": "grey" } },
            "plot_bgcolor": "black",
            "paper_bgcolor": "black",
            "xaxis": {
                "title": { "text": "Date", "font": { "color": "grey" } },
                "type": "date",
                "tickformat": "%Y-%m-%d",
                "tickmode": "auto",
                "nticks": 30,
                "gridcolor": "rgba(0, 0, 0, 0)",
                "zerolinecolor": "rgba(0, 0, 0, 1)",
                "tickfont": axis_font,
                "rangeslider": { "visible": false },
            },
            "yaxis": {
                "title": { "text": "Cumulative Returns", "font": { "color": "grey" } },
                "type": "linear",
                "gridcolor": "rgba(0, 0, 0, 0)",
                "zerolinecolor": "rgba(0, 0, 0, 1)",
                "tickfont": axis_font,
            },
            "legend": { "font": { "color": "grey" } },
            "margin": { "t": 50, "b": 50, "l": 50, "r": 50 },
        })
    }

    /// Render the chart as a complete HTML document.
    ///
    /// Empty buckets get no trace. `current` is drawn opaque and wider than the rest.
    ///
    /// # Errors
    /// Returns [`SeasonalityError::Render`] if the chart data cannot be serialized.
    pub fn render(&self, report: &SeasonalityReport, current: BucketKey) -> Result<String> {
        let traces = self.traces(report, current);
        debug!(
            traces = traces.len(),
            current = %current,
            "Rendering seasonality chart"
        );

        let data = to_script_json(&traces)?;
        let layout = to_script_json(&self.layout())?;
        let config = to_script_json(&json!({ "scrollZoom": true, "responsive": true }))?;

        Ok(format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8" />
<title>{title}</title>
<script src="{src}"></script>
</head>
<body style="margin: 0; background-color: black;">
<div id="{CHART_ID}" style="width: 100%; height: 100vh;"></div>
<script>
Plotly.newPlot("{CHART_ID}", {data}, {layout}, {config});
</script>
</body>
</html>
"#,
            title = escape_html(&self.options.title),
            src = escape_html(&self.options.plotly_src),
        ))
    }

    /// Render the chart and write it to `path`.
    ///
    /// # Errors
    /// Returns an error if rendering fails or the file cannot be written.
    #[instrument(skip(self, path, report), fields(path = %path.as_ref().display()))]
    pub fn write(
        &self,
        path: impl AsRef<Path>,
        report: &SeasonalityReport,
        current: BucketKey,
    ) -> Result<()> {
        let html = self.render(report, current)?;
        std::fs::write(path.as_ref(), html)?;
        debug!("Wrote chart");
        Ok(())
    }
}

/// Serialize for embedding inside a `<script>` element.
fn to_script_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let json = serde_json::to_string(value).map_err(|e| SeasonalityError::Render(e.to_string()))?;
    Ok(json.replace("</", "<\\/"))
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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
