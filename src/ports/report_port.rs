//! Report rendering port trait.

use crate::domain::error::TradebenchError;
use crate::domain::report::BacktestReport;

/// Port for rendering backtest reports.
pub trait ReportPort {
    fn render(&self, report: &BacktestReport) -> Result<String, TradebenchError>;

    /// Several runs side by side.
    fn render_comparison(&self, reports: &[BacktestReport]) -> Result<String, TradebenchError>;
}
