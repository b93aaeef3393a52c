//! Trade execution against a single-asset cash/coin wallet.
//!
//! Every trade pays `fee_pct` percent of its notional value. Trades that would
//! drive cash or coin negative are refused (the method returns `false`) and
//! leave the wallet untouched.

use chrono::NaiveDate;

use super::portfolio::{Action, PortfolioState};

/// Fee on a trade of `notional` value: `fee_pct / 100 * notional`.
pub fn trade_fee(notional: f64, fee_pct: f64) -> f64 {
    notional * fee_pct / 100.0
}

#[derive(Debug, Clone, PartialEq)]
pub struct Wallet {
    pub cash: f64,
    pub coin: f64,
    fee_pct: f64,
}

impl Wallet {
    pub fn new(cash: f64, fee_pct: f64) -> Self {
        Wallet {
            cash,
            coin: 0.0,
            fee_pct,
        }
    }

    /// Spend `amount` (plus fee) on coin at `price`.
    pub fn buy(&mut self, amount: f64, price: f64) -> bool {
        if price <= 0.0 || amount <= 0.0 {
            return false;
        }
        let fee = trade_fee(amount, self.fee_pct);
        if self.cash < amount + fee {
            return false;
        }
        self.cash -= amount + fee;
        self.coin += amount / price;
        true
    }

    /// Sell coin worth `amount` at `price`; the fee comes out of the proceeds.
    pub fn sell(&mut self, amount: f64, price: f64) -> bool {
        if price <= 0.0 || amount <= 0.0 {
            return false;
        }
        let units = amount / price;
        if units > self.coin {
            return false;
        }
        self.cash += amount - trade_fee(amount, self.fee_pct);
        self.coin -= units;
        true
    }

    /// Sell every coin at `price`. Returns `false` when there is nothing to sell.
    pub fn liquidate(&mut self, price: f64) -> bool {
        if self.coin <= 0.0 || price <= 0.0 {
            return false;
        }
        let proceeds = self.coin * price;
        self.cash += proceeds - trade_fee(proceeds, self.fee_pct);
        self.coin = 0.0;
        true
    }

    pub fn value(&self, price: f64) -> f64 {
        self.cash + self.coin * price
    }

    pub fn snapshot(&self, date: NaiveDate, market_price: f64, action: Action) -> PortfolioState {
        PortfolioState {
            date,
            cash: self.cash,
            coin: self.coin,
            market_price,
            action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn fee_is_percentage_of_notional() {
        assert_relative_eq!(trade_fee(100.0, 0.02), 0.02);
        assert_relative_eq!(trade_fee(2500.0, 1.0), 25.0);
        assert_relative_eq!(trade_fee(100.0, 0.0), 0.0);
    }

    #[test]
    fn buy_deducts_amount_and_fee() {
        let mut w = Wallet::new(1000.0, 1.0);
        assert!(w.buy(100.0, 50.0));
        assert_relative_eq!(w.cash, 899.0);
        assert_relative_eq!(w.coin, 2.0);
    }

    #[test]
    fn buy_requires_cash_for_fee() {
        let mut w = Wallet::new(100.0, 1.0);
        assert!(!w.buy(100.0, 10.0));
        assert_relative_eq!(w.cash, 100.0);
        assert_relative_eq!(w.coin, 0.0);
        assert!(w.buy(99.0, 10.0));
        assert_relative_eq!(w.cash, 0.01, epsilon = 1e-9);
    }

    #[test]
    fn sell_credits_amount_less_fee() {
        let mut w = Wallet::new(0.0, 1.0);
        w.coin = 3.0;
        assert!(w.sell(100.0, 50.0));
        assert_relative_eq!(w.cash, 99.0);
        assert_relative_eq!(w.coin, 1.0);
    }

    #[test]
    fn sell_refuses_more_than_held() {
        let mut w = Wallet::new(0.0, 0.0);
        w.coin = 1.0;
        assert!(!w.sell(100.0, 50.0));
        assert_relative_eq!(w.coin, 1.0);
        assert_relative_eq!(w.cash, 0.0);
    }

    #[test]
    fn liquidate_sells_everything() {
        let mut w = Wallet::new(10.0, 0.5);
        w.coin = 4.0;
        assert!(w.liquidate(25.0));
        assert_relative_eq!(w.coin, 0.0);
        assert_relative_eq!(w.cash, 10.0 + 100.0 - 0.5);
        assert!(!w.liquidate(25.0));
    }

    #[test]
    fn zero_price_refused() {
        let mut w = Wallet::new(1000.0, 0.0);
        assert!(!w.buy(100.0, 0.0));
        assert!(!w.sell(100.0, 0.0));
    }

    #[test]
    fn snapshot_copies_holdings() {
        let mut w = Wallet::new(1000.0, 0.0);
        w.buy(500.0, 100.0);
        let date = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
        let s = w.snapshot(date, 100.0, Action::Buy);
        assert_relative_eq!(s.cash, 500.0);
        assert_relative_eq!(s.coin, 5.0);
        assert_relative_eq!(s.portfolio_value(), w.value(100.0));
    }
}
