//! JSON report adapter implementing ReportPort.

use crate::domain::error::TradebenchError;
use crate::domain::report::BacktestReport;
use crate::ports::report_port::ReportPort;

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonReport;

impl ReportPort for JsonReport {
    fn render(&self, report: &BacktestReport) -> Result<String, TradebenchError> {
        let mut text = serde_json::to_string_pretty(report)?;
        text.push('\n');
        Ok(text)
    }

    fn render_comparison(&self, reports: &[BacktestReport]) -> Result<String, TradebenchError> {
        let mut text = serde_json::to_string_pretty(reports)?;
        text.push('\n');
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analytics::Period;
    use crate::domain::portfolio::{Action, Ledger, PortfolioState};
    use crate::domain::strategy::{StrategyConfig, StrategyKind};
    use chrono::NaiveDate;

    fn report() -> BacktestReport {
        let mut ledger = Ledger::new();
        ledger.record(PortfolioState {
            date: NaiveDate::from_ymd_opt(2018, 1, 1).unwrap(),
            cash: 900.0,
            coin: 10.0,
            market_price: 10.0,
            action: Action::Buy,
        });
        let config = StrategyConfig::new(StrategyKind::Rsi);
        BacktestReport::build(&config, &ledger, Period::Monthly, true).unwrap()
    }

    #[test]
    fn render_is_valid_json() {
        let text = JsonReport.render(&report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["kind"], "rsi");
        assert_eq!(value["period"], "monthly");
        assert_eq!(value["parameters"]["window_size"], 14);
        assert_eq!(value["summary"]["buys"], 1);
        assert_eq!(value["ledger"][0]["action"], "buy");
        assert_eq!(value["ledger"][0]["date"], "2018-01-01");
    }

    #[test]
    fn comparison_is_an_array() {
        let text = JsonReport.render_comparison(&[report(), report()]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(2));
    }
}
