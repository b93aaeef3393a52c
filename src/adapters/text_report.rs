//! Plain-text report adapter implementing ReportPort.

use crate::domain::analytics::Summary;
use crate::domain::error::TradebenchError;
use crate::domain::report::BacktestReport;
use crate::ports::report_port::ReportPort;

#[derive(Debug, Default, Clone, Copy)]
pub struct TextReport;

fn payback(days: i64) -> String {
    if days < 0 {
        "not reached".to_string()
    } else {
        format!("{days} days")
    }
}

fn summary_lines(summary: &Summary) -> Vec<(&'static str, String)> {
    vec![
        ("Period", format!("{} .. {}", summary.first_date, summary.last_date)),
        ("Initial Value", format!("{:.2}", summary.initial_value)),
        ("Final Value", format!("{:.2}", summary.final_value)),
        (
            "Total Return",
            format!("{:.2} ({:.2}%)", summary.total_return, summary.total_return_pct),
        ),
        ("Max Drawdown", format!("-{:.1}%", summary.max_drawdown * 100.0)),
        ("Payback Period", payback(summary.payback_period_days)),
        (
            "Trades",
            format!(
                "{} (buy {}, sell {}, exit {})",
                summary.total_trades, summary.buys, summary.sells, summary.exits
            ),
        ),
    ]
}

impl ReportPort for TextReport {
    fn render(&self, report: &BacktestReport) -> Result<String, TradebenchError> {
        let mut out = format!("=== {} ({}) ===\n", report.name, report.kind);
        for (label, value) in summary_lines(&report.summary) {
            out.push_str(&format!("{:<16}{}\n", format!("{label}:"), value));
        }

        out.push_str(&format!("\n--- {} ---\n", report.period));
        out.push_str(&format!(
            "{:<12} {:>14} {:>12} {:>9} {:>5} {:>5}\n",
            "Period End", "Value", "Gain", "Gain %", "Buys", "Sells"
        ));
        for row in &report.periods {
            out.push_str(&format!(
                "{:<12} {:>14.2} {:>12.2} {:>8.2}% {:>5} {:>5}\n",
                row.period_end.to_string(),
                row.value,
                row.gain,
                row.gain_pct,
                row.buys,
                row.sells
            ));
        }

        if let Some(ledger) = &report.ledger {
            out.push_str("\n--- Ledger ---\n");
            out.push_str(&format!(
                "{:<12} {:>6} {:>12} {:>14} {:>12} {:>14}\n",
                "Date", "Action", "Price", "Cash", "Coin", "Value"
            ));
            for state in ledger {
                out.push_str(&format!(
                    "{:<12} {:>6} {:>12.2} {:>14.2} {:>12.6} {:>14.2}\n",
                    state.date.to_string(),
                    state.action.to_string(),
                    state.market_price,
                    state.cash,
                    state.coin,
                    state.portfolio_value()
                ));
            }
        }
        Ok(out)
    }

    fn render_comparison(&self, reports: &[BacktestReport]) -> Result<String, TradebenchError> {
        let mut out = format!("{:<16}", "");
        for report in reports {
            out.push_str(&format!("{:>28}", format!("{} ({})", report.name, report.kind)));
        }
        out.push('\n');

        let columns: Vec<_> = reports.iter().map(|r| summary_lines(&r.summary)).collect();
        let rows = columns.first().map(Vec::len).unwrap_or(0);
        for i in 0..rows {
            out.push_str(&format!("{:<16}", format!("{}:", columns[0][i].0)));
            for column in &columns {
                out.push_str(&format!("{:>28}", column[i].1));
            }
            out.push('\n');
        }
        Ok(out)
    }
}
