//! Rate-of-change crossover.
//!
//! Each day with both ROC values: short < long counts a day toward buying
//! (and resets the sell count), short > long counts toward selling. Once a
//! count reaches the required run the strategy trades `amount_to_trade` every
//! day until the relation flips. A day missing either ROC resets both counts.

use crate::domain::backtest::{Order, Session};
use crate::domain::indicator::roc::rate_of_change;
use crate::domain::portfolio::Ledger;
use crate::domain::price::PriceSeries;
use crate::domain::strategy::RocParams;

pub fn run(params: &RocParams, series: &PriceSeries) -> Ledger {
    let common = &params.common;
    let mut session = Session::new(common);
    let run = params.consecutive_day_run;
    let mut days_until_buy = run;
    let mut days_until_sell = run;

    for row in series.rows_between(common.start_date, common.end_date) {
        if session.stop_loss_triggered(row.date, row.close) {
            break;
        }
        let short = rate_of_change(series, row.date, params.short_interval);
        let long = rate_of_change(series, row.date, params.long_interval);

        let order = match (short, long) {
            (Some(short), Some(long)) => {
                if short < long {
                    days_until_buy -= 1;
                    days_until_sell = run;
                } else if short > long {
                    days_until_sell -= 1;
                    days_until_buy = run;
                } else {
                    days_until_buy = run;
                    days_until_sell = run;
                }
                if days_until_buy <= 0 {
                    Order::Buy
                } else if days_until_sell <= 0 {
                    Order::Sell
                } else {
                    Order::Hold
                }
            }
            _ => {
                days_until_buy = run;
                days_until_sell = run;
                Order::Hold
            }
        };
        session.execute(row.date, row.close, order);
    }
    session.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::portfolio::Action;
    use crate::domain::price::PriceRow;
    use crate::domain::strategy::CommonParams;
    use chrono::{Days, NaiveDate};

    fn series(closes: &[f64]) -> PriceSeries {
        let first = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceRow {
                date: first + Days::new(i as u64),
                open: close,
                high: close,
                low: close,
                close,
            })
            .collect()
    }

    fn params(s: &PriceSeries, short: u32, long: u32, run: i64) -> RocParams {
        RocParams {
            common: CommonParams {
                start_date: s.first_date().unwrap(),
                end_date: s.last_date().unwrap(),
                stop_loss_pct: 50.0,
                cash_amount: 10_000.0,
                fee_pct: 0.0,
                amount_to_trade: 100.0,
            },
            short_interval: short,
            long_interval: long,
            consecutive_day_run: run,
        }
    }

    #[test]
    fn one_entry_per_day() {
        let s = series(&[10.0; 15]);
        let ledger = run(&params(&s, 2, 5, 1), &s);
        assert_eq!(ledger.len(), 15);
        assert!(ledger.iter().all(|e| e.action == Action::NoAction));
    }

    #[test]
    fn rising_series_buys_after_run() {
        let closes: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        let s = series(&closes);
        let ledger = run(&params(&s, 1, 3, 2), &s);
        let actions = ledger.action_history();
        // both ROCs exist from day 3; the second day of short < long buys
        assert!(actions[..4].iter().all(|a| *a == Action::NoAction));
        assert!(actions[4..].iter().all(|a| *a == Action::Buy));
    }

    #[test]
    fn reversal_switches_to_selling() {
        let closes = [
            100.0, 101.0, 102.0, 103.0, 104.0, 105.0, 106.0, 107.0, 106.0, 105.0, 104.0, 103.0,
            102.0, 101.0, 100.0,
        ];
        let s = series(&closes);
        let ledger = run(&params(&s, 1, 3, 2), &s);
        use Action::{Buy as B, NoAction as N, Sell as S};
        assert_eq!(
            ledger.action_history(),
            vec![N, N, N, N, B, B, B, B, B, N, N, S, S, S, S]
        );
        assert!(ledger.iter().all(|e| e.coin >= 0.0 && e.cash >= 0.0));
    }

    #[test]
    fn missing_lookback_resets_counts() {
        let mut rows = series(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0, 106.0])
            .rows()
            .to_vec();
        rows.remove(3);
        let s = PriceSeries::new(rows);
        let ledger = run(&params(&s, 1, 2, 1), &s);
        use Action::{Buy as B, NoAction as N};
        // 2018-01-04 is missing: the 5th has no 1-day ROC, the 6th no 2-day ROC
        assert_eq!(ledger.action_history(), vec![N, N, B, N, N, B]);
    }
}
