#![allow(dead_code)]

use chrono::{Days, NaiveDate};
use std::collections::HashMap;
use tradebench::domain::error::TradebenchError;
use tradebench::domain::portfolio::{Action, Ledger, PortfolioState};
use tradebench::domain::price::{PriceRow, PriceSeries};
use tradebench::domain::strategy::{StrategyConfig, StrategyKind};
use tradebench::ports::data_port::PriceDataPort;

pub struct MockPriceData {
    pub data: HashMap<String, PriceSeries>,
    pub errors: HashMap<String, String>,
}

impl MockPriceData {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_series(mut self, symbol: &str, series: PriceSeries) -> Self {
        self.data.insert(symbol.to_string(), series);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl PriceDataPort for MockPriceData {
    fn fetch_series(&self, symbol: &str) -> Result<PriceSeries, TradebenchError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(TradebenchError::PriceData {
                reason: reason.clone(),
            });
        }
        self.data
            .get(symbol)
            .cloned()
            .ok_or_else(|| TradebenchError::PriceData {
                reason: format!("unknown symbol {symbol}"),
            })
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn day(n: usize) -> NaiveDate {
    date(2018, 1, 1) + Days::new(n as u64)
}

pub fn flat_row(date: NaiveDate, close: f64) -> PriceRow {
    PriceRow {
        date,
        open: close,
        high: close,
        low: close,
        close,
    }
}

/// One row per consecutive day from 2018-01-01 with high = low = close. Each
/// day opens at the previous close, so the intraday change is the day's move.
pub fn daily_series(closes: &[f64]) -> PriceSeries {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceRow {
            open: if i == 0 { close } else { closes[i - 1] },
            ..flat_row(day(i), close)
        })
        .collect()
}

/// Like [`daily_series`] but every day opens at its own close.
pub fn gapped_series(closes: &[f64]) -> PriceSeries {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| flat_row(day(i), close))
        .collect()
}

/// Daily rows whose high/low straddle the close, so midpoints differ from it.
/// Each day opens at the previous close.
pub fn wavy_series(days: usize) -> PriceSeries {
    let close = |i: usize| 100.0 + 15.0 * ((i as f64) / 6.0).sin() + (i % 4) as f64;
    (0..days)
        .map(|i| {
            let close_i = close(i);
            PriceRow {
                date: day(i),
                open: if i == 0 { close_i - 1.0 } else { close(i - 1) },
                high: close_i + 2.0,
                low: close_i - 3.0,
                close: close_i,
            }
        })
        .collect()
}

/// Config of `kind` spanning `start..=end`, then `overrides` applied in order.
pub fn config(
    kind: StrategyKind,
    start: NaiveDate,
    end: NaiveDate,
    overrides: &[(&str, &str)],
) -> StrategyConfig {
    let mut config = StrategyConfig::new(kind);
    config
        .set_parameter_str("start_date", &start.to_string())
        .unwrap();
    config.set_parameter_str("end_date", &end.to_string()).unwrap();
    for (name, value) in overrides {
        config.set_parameter_str(name, value).unwrap();
    }
    config
}

/// Ledger of cash-only states, one per consecutive day.
pub fn value_ledger(values: &[f64]) -> Ledger {
    let mut ledger = Ledger::new();
    for (i, &value) in values.iter().enumerate() {
        ledger.record(PortfolioState {
            date: day(i),
            cash: value,
            coin: 0.0,
            market_price: 1.0,
            action: Action::NoAction,
        });
    }
    ledger
}

pub fn actions(ledger: &Ledger) -> Vec<Action> {
    ledger.action_history()
}

pub fn positions_of(ledger: &Ledger, action: Action) -> Vec<usize> {
    ledger
        .iter()
        .enumerate()
        .filter(|(_, s)| s.action == action)
        .map(|(i, _)| i)
        .collect()
}
