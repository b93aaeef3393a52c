//! Report model: headline summary plus a periodic table for one run.

use chrono::NaiveDate;
use serde::Serialize;

use super::analytics::{Analyser, Period, Summary};
use super::error::TradebenchError;
use super::portfolio::{Action, Ledger, PortfolioState};
use super::strategy::{StrategyConfig, StrategyKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodRow {
    pub period_end: NaiveDate,
    pub value: f64,
    pub gain: f64,
    pub gain_pct: f64,
    pub buys: usize,
    pub sells: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestReport {
    pub name: String,
    pub kind: StrategyKind,
    pub period: Period,
    pub parameters: serde_json::Value,
    pub summary: Summary,
    pub periods: Vec<PeriodRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ledger: Option<Vec<PortfolioState>>,
}

impl BacktestReport {
    pub fn build(
        config: &StrategyConfig,
        ledger: &Ledger,
        period: Period,
        include_ledger: bool,
    ) -> Result<Self, TradebenchError> {
        let analyser = Analyser::new(ledger)?;
        let values = analyser.period_values(period);
        let gains = analyser.periodic_return(period, false);
        let gains_pct = analyser.periodic_return(period, true);
        let buys = analyser.trade_count(period, Action::Buy);
        let sells = analyser.trade_count(period, Action::Sell);

        let periods = values
            .iter()
            .zip(&gains)
            .zip(&gains_pct)
            .zip(buys.iter().zip(&sells))
            .map(|(((value, gain), pct), (buy, sell))| PeriodRow {
                period_end: value.period_end,
                value: value.value,
                gain: gain.value,
                gain_pct: pct.value,
                buys: buy.value,
                sells: sell.value,
            })
            .collect();

        let mut snapshot = config.to_json();
        let parameters = snapshot
            .get_mut("parameters")
            .map(serde_json::Value::take)
            .unwrap_or_default();

        Ok(BacktestReport {
            name: config.alias().to_string(),
            kind: config.kind(),
            period,
            parameters,
            summary: analyser.summary(),
            periods,
            ledger: include_ledger.then(|| ledger.states().to_vec()),
        })
    }
}
