//! Equity-curve chart written as a standalone SVG file.

use crate::domain::error::MonitorError;
use crate::domain::portfolio::EquityPoint;
use crate::ports::chart_port::ChartPort;
use log::info;
use std::fs;
use std::path::Path;

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 400.0;
const PADDING: f64 = 60.0;

pub fn format_equity_svg(equity_curve: &[EquityPoint]) -> String {
    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH:.0}" height="{HEIGHT:.0}" viewBox="0 0 {WIDTH:.0} {HEIGHT:.0}">
<rect width="100%" height="100%" fill="white"/>
<text x="{:.0}" y="30" font-family="sans-serif" font-size="18" text-anchor="middle">Portfolio Equity Curve</text>
"#,
        WIDTH / 2.0
    );

    if equity_curve.is_empty() {
        svg.push_str(&format!(
            r#"<text x="{:.0}" y="{:.0}" font-family="sans-serif" font-size="14" text-anchor="middle">No equity data available.</text>
</svg>
"#,
            WIDTH / 2.0,
            HEIGHT / 2.0
        ));
        return svg;
    }

    let min_equity = equity_curve
        .iter()
        .map(|p| p.equity)
        .fold(f64::INFINITY, f64::min);
    let max_equity = equity_curve
        .iter()
        .map(|p| p.equity)
        .fold(f64::NEG_INFINITY, f64::max);

    let plot_width = WIDTH - 2.0 * PADDING;
    let plot_height = HEIGHT - 2.0 * PADDING;
    let bottom = HEIGHT - PADDING;

    let range = max_equity - min_equity;
    let scale_y = if range > 0.0 {
        plot_height / range
    } else {
        1.0
    };
    let scale_x = if equity_curve.len() > 1 {
        plot_width / (equity_curve.len() - 1) as f64
    } else {
        0.0
    };

    let points: Vec<String> = equity_curve
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let x = PADDING + i as f64 * scale_x;
            let y = bottom - (point.equity - min_equity) * scale_y;
            format!("{:.1},{:.1}", x, y)
        })
        .collect();

    // Axes.
    svg.push_str(&format!(
        r#"<line x1="{PADDING:.0}" y1="{PADDING:.0}" x2="{PADDING:.0}" y2="{bottom:.0}" stroke="black"/>
<line x1="{PADDING:.0}" y1="{bottom:.0}" x2="{:.0}" y2="{bottom:.0}" stroke="black"/>
"#,
        WIDTH - PADDING
    ));

    svg.push_str(&format!(
        r#"<polyline fill="none" stroke="blue" stroke-width="2" points="{}"/>
"#,
        points.join(" ")
    ));

    let label = |x: f64, y: f64, anchor: &str, text: String| {
        format!(
            r#"<text x="{x:.0}" y="{y:.0}" font-family="sans-serif" font-size="11" text-anchor="{anchor}">{text}</text>
"#
        )
    };
    svg.push_str(&label(PADDING - 6.0, PADDING + 4.0, "end", format!("{max_equity:.2}")));
    svg.push_str(&label(PADDING - 6.0, bottom + 4.0, "end", format!("{min_equity:.2}")));
    if let (Some(first), Some(last)) = (equity_curve.first(), equity_curve.last()) {
        svg.push_str(&label(PADDING, bottom + 20.0, "start", first.date.to_string()));
        svg.push_str(&label(WIDTH - PADDING, bottom + 20.0, "end", last.date.to_string()));
    }

    svg.push_str("</svg>\n");
    svg
}

/// Writes the equity chart to the given path, creating parent directories.
#[derive(Debug, Default)]
pub struct SvgChartAdapter;

impl SvgChartAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl ChartPort for SvgChartAdapter {
    fn render_equity(&self, points: &[EquityPoint], output_path: &str) -> Result<(), MonitorError> {
        let failure = |reason: String| MonitorError::RenderFailure {
            path: output_path.to_string(),
            reason,
        };

        let path = Path::new(output_path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| failure(e.to_string()))?;
        }
        fs::write(path, format_equity_svg(points)).map_err(|e| failure(e.to_string()))?;

        info!("equity curve written to {output_path} ({} points)", points.len());
        Ok(())
    }
}
