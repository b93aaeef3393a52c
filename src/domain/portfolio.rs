//! Portfolio snapshots and the per-run ledger.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Buy,
    Sell,
    /// Stop-loss liquidation; always the last entry of a run.
    Exit,
    NoAction,
}

impl Action {
    pub fn is_trade(self) -> bool {
        self != Action::NoAction
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Buy => "BUY",
            Action::Sell => "SELL",
            Action::Exit => "EXIT",
            Action::NoAction => "-",
        };
        f.write_str(s)
    }
}

/// Holdings after the day's action was applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioState {
    pub date: NaiveDate,
    pub cash: f64,
    pub coin: f64,
    pub market_price: f64,
    pub action: Action,
}

impl PortfolioState {
    pub fn portfolio_value(&self) -> f64 {
        self.cash + self.coin * self.market_price
    }
}

/// Append-only, chronological record of one backtest run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Ledger {
    states: Vec<PortfolioState>,
    #[serde(skip)]
    last_buy_price: f64,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, state: PortfolioState) {
        debug_assert!(
            self.states.last().is_none_or(|prev| prev.date < state.date),
            "ledger dates must be strictly increasing"
        );
        if state.action == Action::Buy {
            self.last_buy_price = state.market_price;
        }
        self.states.push(state);
    }

    pub fn earliest(&self) -> Option<&PortfolioState> {
        self.states.first()
    }

    pub fn latest(&self) -> Option<&PortfolioState> {
        self.states.last()
    }

    /// Price of the most recent Buy, or 0 before the first one.
    pub fn last_buy_price(&self) -> f64 {
        self.last_buy_price
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PortfolioState> {
        self.states.iter()
    }

    pub fn states(&self) -> &[PortfolioState] {
        &self.states
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.states.iter().map(|s| s.date).collect()
    }

    pub fn cash_history(&self) -> Vec<f64> {
        self.states.iter().map(|s| s.cash).collect()
    }

    pub fn coin_history(&self) -> Vec<f64> {
        self.states.iter().map(|s| s.coin).collect()
    }

    pub fn price_history(&self) -> Vec<f64> {
        self.states.iter().map(|s| s.market_price).collect()
    }

    pub fn value_history(&self) -> Vec<f64> {
        self.states.iter().map(PortfolioState::portfolio_value).collect()
    }

    pub fn action_history(&self) -> Vec<Action> {
        self.states.iter().map(|s| s.action).collect()
    }
}

impl<'a> IntoIterator for &'a Ledger {
    type Item = &'a PortfolioState;
    type IntoIter = std::slice::Iter<'a, PortfolioState>;

    fn into_iter(self) -> Self::IntoIter {
        self.states.iter()
    }
}
