//! RSI mean reversion.
//!
//! The RSI is built from each day's intraday change (close - open), so an
//! overnight gap between one close and the next open does not move it.
//! Trades on edges only: a sell on the day the RSI first rises above the upper
//! threshold, a buy on the day it first falls below the lower one. A sell is
//! skipped when the previous entry was already a sell, a buy when it was
//! already a buy. Undefined RSI counts as neither overbought nor oversold.

use crate::domain::backtest::{Order, Session};
use crate::domain::indicator::rsi::rolling_rsi;
use crate::domain::portfolio::{Action, Ledger};
use crate::domain::price::{PriceRow, PriceSeries};
use crate::domain::strategy::RsiParams;

pub fn run(params: &RsiParams, series: &PriceSeries) -> Ledger {
    let common = &params.common;
    let mut session = Session::new(common);

    // history before the start date warms the RSI up
    let rows = series.rows_through(common.end_date);
    let changes: Vec<f64> = rows.iter().map(PriceRow::intraday_change).collect();
    let rsi = rolling_rsi(&changes, params.window_size);

    let mut was_overbought = true;
    let mut was_oversold = true;

    for (row, value) in rows.iter().zip(rsi).filter(|(r, _)| r.date >= common.start_date) {
        if session.stop_loss_triggered(row.date, row.close) {
            break;
        }
        let (overbought, oversold) = match value {
            Some(v) => (v > params.upper_threshold, v < params.lower_threshold),
            None => (false, false),
        };
        let last = session.last_action();

        let order = if overbought && !was_overbought && last != Some(Action::Sell) {
            Order::Sell
        } else if oversold && !was_oversold && last != Some(Action::Buy) {
            Order::Buy
        } else {
            Order::Hold
        };
        was_overbought = overbought;
        was_oversold = oversold;

        session.execute(row.date, row.close, order);
    }
    session.finish()
}
