// Module exports
pub mod svg;

// Public exports
pub use svg::SvgChartRenderer;

use crate::config::ChartConfig;
use crate::market::CandleSeries;
use anyhow::Result;

/// Draws a candlestick chart for a series. Purely a side effect: nothing
/// downstream consumes the result, and a failure must not stop the run.
///
/// The pipeline calls `render` on tokio's blocking pool, so implementations
/// may do synchronous I/O or wait on a child process.
pub trait ChartRenderer: Send + Sync {
    fn render(&self, series: &CandleSeries) -> Result<()>;
}

/// Renderer for headless deployments.
pub struct NoopChartRenderer;

impl ChartRenderer for NoopChartRenderer {
    fn render(&self, _series: &CandleSeries) -> Result<()> {
        Ok(())
    }
}

/// Pick the renderer for the given chart settings.
pub fn renderer_from_config(config: &ChartConfig) -> Box<dyn ChartRenderer> {
    if config.enabled {
        Box::new(SvgChartRenderer::from_config(config))
    } else {
        Box::new(NoopChartRenderer)
    }
}
