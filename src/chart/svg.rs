// src/chart/svg.rs
use crate::chart::ChartRenderer;
use crate::config::ChartConfig;
use crate::market::CandleSeries;
use anyhow::{anyhow, Context, Result};
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::info;

const WIDTH: f64 = 1200.0;
const HEIGHT: f64 = 600.0;
const MARGIN_LEFT: f64 = 90.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 50.0;
const PRICE_TICKS: usize = 6;
const TIME_LABELS: usize = 6;

const BULLISH_COLOR: &str = "#26a69a";
const BEARISH_COLOR: &str = "#ef5350";
const GRID_COLOR: &str = "#e0e0e0";

/// Writes candlestick charts as SVG files, price axis on the left, no volume.
pub struct SvgChartRenderer {
    output_dir: PathBuf,
    open_viewer: bool,
    viewer_command: String,
}

impl SvgChartRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            open_viewer: false,
            viewer_command: String::new(),
        }
    }

    pub fn from_config(config: &ChartConfig) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            open_viewer: config.open_viewer,
            viewer_command: config.viewer_command.clone(),
        }
    }

    pub fn chart_path(&self, series: &CandleSeries) -> PathBuf {
        self.output_dir.join(format!(
            "{}_{}.svg",
            file_safe(series.symbol()),
            file_safe(series.granularity())
        ))
    }

    /// Render the series into an SVG document.
    pub fn render_svg(series: &CandleSeries) -> Result<String> {
        let candles = series.candles();
        if candles.is_empty() {
            return Err(anyhow!("Cannot chart an empty series"));
        }

        let (low, high) = price_bounds(series);
        let plot_width = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
        let plot_height = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        let y = |price: f64| MARGIN_TOP + (high - price) / (high - low) * plot_height;

        let slot = plot_width / candles.len() as f64;
        let body_width = (slot * 0.6).max(1.0);
        let x = |i: usize| MARGIN_LEFT + slot * (i as f64 + 0.5);

        let mut svg = String::new();
        writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif" font-size="12">"#,
            w = WIDTH,
            h = HEIGHT
        )?;
        writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#)?;
        writeln!(
            svg,
            r#"<text x="{:.1}" y="28" text-anchor="middle" font-size="18">Candlestick patterns for {} ({})</text>"#,
            WIDTH / 2.0,
            xml_escape(series.symbol()),
            xml_escape(series.granularity())
        )?;

        // Price axis
        let decimals = price_decimals(high - low);
        for tick in 0..PRICE_TICKS {
            let price = low + (high - low) * tick as f64 / (PRICE_TICKS - 1) as f64;
            let ty = y(price);
            writeln!(
                svg,
                r#"<line x1="{:.1}" y1="{ty:.1}" x2="{:.1}" y2="{ty:.1}" stroke="{}"/>"#,
                MARGIN_LEFT,
                WIDTH - MARGIN_RIGHT,
                GRID_COLOR
            )?;
            writeln!(
                svg,
                r#"<text x="{:.1}" y="{:.1}" text-anchor="end">{:.*}</text>"#,
                MARGIN_LEFT - 8.0,
                ty + 4.0,
                decimals,
                price
            )?;
        }
        writeln!(
            svg,
            r#"<line x1="{l:.1}" y1="{:.1}" x2="{l:.1}" y2="{:.1}" stroke="black"/>"#,
            MARGIN_TOP,
            HEIGHT - MARGIN_BOTTOM,
            l = MARGIN_LEFT
        )?;
        writeln!(
            svg,
            r#"<text x="18" y="{:.1}" text-anchor="middle" transform="rotate(-90 18 {:.1})">Price</text>"#,
            HEIGHT / 2.0,
            HEIGHT / 2.0
        )?;

        // Time labels
        let step = candles.len().div_ceil(TIME_LABELS).max(1);
        for (i, candle) in candles.iter().enumerate().step_by(step) {
            writeln!(
                svg,
                r#"<text x="{:.1}" y="{:.1}" text-anchor="middle">{}</text>"#,
                x(i),
                HEIGHT - MARGIN_BOTTOM + 20.0,
                candle.open_time().format("%m-%d %H:%M")
            )?;
        }

        // Candles
        for (i, candle) in candles.iter().enumerate() {
            let color = if candle.close() > candle.open() {
                BULLISH_COLOR
            } else {
                BEARISH_COLOR
            };
            let cx = x(i);
            let body_top = y(candle.open().max(candle.close()));
            let body_height = (y(candle.open()) - y(candle.close())).abs().max(1.0);

            writeln!(
                svg,
                r#"<line x1="{cx:.1}" y1="{:.1}" x2="{cx:.1}" y2="{:.1}" stroke="{color}"/>"#,
                y(candle.high()),
                y(candle.low())
            )?;
            writeln!(
                svg,
                r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{color}"/>"#,
                cx - body_width / 2.0,
                body_top,
                body_width,
                body_height
            )?;
        }

        svg.push_str("</svg>\n");
        Ok(svg)
    }

    // Blocks the calling thread until the viewer exits
    fn open_in_viewer(&self, path: &Path) -> Result<()> {
        let status = Command::new(&self.viewer_command)
            .arg(path)
            .status()
            .with_context(|| format!("Failed to start chart viewer '{}'", self.viewer_command))?;

        if !status.success() {
            return Err(anyhow!(
                "Chart viewer '{}' exited with {}",
                self.viewer_command,
                status
            ));
        }

        Ok(())
    }
}

impl ChartRenderer for SvgChartRenderer {
    fn render(&self, series: &CandleSeries) -> Result<()> {
        info!("Plotting candlestick chart...");
        let svg = Self::render_svg(series)?;

        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!("Failed to create chart directory {}", self.output_dir.display())
        })?;

        let path = self.chart_path(series);
        fs::write(&path, svg).with_context(|| format!("Failed to write chart {}", path.display()))?;
        info!("Chart written to {}", path.display());

        if self.open_viewer {
            self.open_in_viewer(&path)?;
        }

        Ok(())
    }
}

// Lowest low and highest high, padded so candles do not touch the frame
fn price_bounds(series: &CandleSeries) -> (f64, f64) {
    let low = series
        .candles()
        .iter()
        .map(|c| c.low())
        .fold(f64::INFINITY, f64::min);
    let high = series
        .candles()
        .iter()
        .map(|c| c.high())
        .fold(f64::NEG_INFINITY, f64::max);

    let span = high - low;
    let pad = if span > 0.0 {
        span * 0.05
    } else {
        (high.abs() * 0.01).max(1.0)
    };

    (low - pad, high + pad)
}

fn price_decimals(span: f64) -> usize {
    if span >= 100.0 {
        0
    } else if span >= 1.0 {
        2
    } else {
        6
    }
}

fn file_safe(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
