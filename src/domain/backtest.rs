//! Strategy engine: validates a config, checks data coverage, and drives one
//! strategy over a price series to produce its ledger.
//!
//! Every run owns a fresh [`Session`] (wallet + ledger), so runs share no state
//! and repeating a run yields an identical ledger.

use chrono::NaiveDate;
use tracing::{debug, info};

use super::error::TradebenchError;
use super::execution::Wallet;
use super::portfolio::{Action, Ledger};
use super::price::PriceSeries;
use super::strategies::{crossover, roc, rsi};
use super::strategy::{CommonParams, StrategyConfig, StrategyParams};

/// Validate `config` and run it over `series`.
pub fn run(config: &StrategyConfig, series: &PriceSeries) -> Result<Ledger, TradebenchError> {
    let params = config.validate()?;
    let indicators: Vec<String> = params.indicators().iter().map(ToString::to_string).collect();
    info!(
        strategy = config.alias(),
        kind = %config.kind(),
        indicators = %indicators.join(", "),
        "starting backtest"
    );
    run_params(&params, series)
}

/// Run already-validated parameters over `series`.
pub fn run_params(params: &StrategyParams, series: &PriceSeries) -> Result<Ledger, TradebenchError> {
    let common = params.common();
    check_coverage(series, common.start_date, common.end_date)?;

    let ledger = match params {
        StrategyParams::Roc(p) => roc::run(p, series),
        StrategyParams::Rsi(p) => rsi::run(p, series),
        StrategyParams::Sma(p) => crossover::run(p, crossover::Averaging::Simple, series)?,
        StrategyParams::Tma(p) => crossover::run(p, crossover::Averaging::Simple, series)?,
        StrategyParams::Dema(p) => crossover::run(p, crossover::Averaging::Exponential, series)?,
    };

    info!(
        kind = %params.kind(),
        entries = ledger.len(),
        final_value = ledger.latest().map(|s| s.portfolio_value()).unwrap_or(common.cash_amount),
        "backtest finished"
    );
    Ok(ledger)
}

/// `start..=end` must lie within the series' first and last dates.
pub fn check_coverage(
    series: &PriceSeries,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<(), TradebenchError> {
    if series.covers(start, end) {
        Ok(())
    } else {
        Err(TradebenchError::DateRangeOutOfBounds {
            start,
            end,
            coverage: series.coverage(),
        })
    }
}

/// What a strategy wants to do on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Buy,
    Sell,
    SellAll,
    Hold,
}

/// Per-run trading state shared by all strategies: the wallet, the ledger, and
/// the stop-loss rule.
#[derive(Debug)]
pub struct Session {
    wallet: Wallet,
    ledger: Ledger,
    amount_to_trade: f64,
    stop_loss_pct: f64,
}

impl Session {
    pub fn new(common: &CommonParams) -> Self {
        Session {
            wallet: Wallet::new(common.cash_amount, common.fee_pct),
            ledger: Ledger::new(),
            amount_to_trade: common.amount_to_trade,
            stop_loss_pct: common.stop_loss_pct,
        }
    }

    /// If `price` is below the stop-loss level of the last buy, sell
    /// everything, record an Exit and return `true`. The caller stops the run.
    pub fn stop_loss_triggered(&mut self, date: NaiveDate, price: f64) -> bool {
        let floor = (1.0 - self.stop_loss_pct / 100.0) * self.ledger.last_buy_price();
        if price >= floor {
            return false;
        }
        self.wallet.liquidate(price);
        debug!(%date, price, floor, cash = self.wallet.cash, "stop-loss exit");
        self.ledger
            .record(self.wallet.snapshot(date, price, Action::Exit));
        true
    }

    /// Apply `order` at `price` and record the day. Returns the recorded action;
    /// an infeasible order is recorded as NoAction.
    pub fn execute(&mut self, date: NaiveDate, price: f64, order: Order) -> Action {
        let action = match order {
            Order::Buy if self.wallet.buy(self.amount_to_trade, price) => Action::Buy,
            Order::Sell if self.wallet.sell(self.amount_to_trade, price) => Action::Sell,
            Order::SellAll if self.wallet.liquidate(price) => Action::Sell,
            _ => Action::NoAction,
        };
        if action.is_trade() {
            debug!(
                %date,
                %action,
                price,
                cash = self.wallet.cash,
                coin = self.wallet.coin,
                value = self.wallet.value(price),
                "trade"
            );
        }
        self.ledger.record(self.wallet.snapshot(date, price, action));
        action
    }

    pub fn last_action(&self) -> Option<Action> {
        self.ledger.latest().map(|s| s.action)
    }

    pub fn finish(self) -> Ledger {
        self.ledger
    }
}
