//! Performance statistics over a completed ledger.
//!
//! Periodic figures share one bucketing scheme. A bucket is anchored at an
//! entry and ends `period` after it; the first later entry dated past that end
//! closes the bucket and anchors the next one. The closing entry's value is
//! the bucket's final value (so dollar returns telescope), while for trade
//! counts it is the first member of the next bucket. The last bucket is
//! always emitted, dated at the last entry.

use chrono::{Days, Months, NaiveDate};
use serde::Serialize;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use super::error::TradebenchError;
use super::portfolio::{Action, Ledger, PortfolioState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Total,
}

impl Period {
    /// End of a bucket anchored at `anchor`; `None` for `Total`.
    pub fn end_from(self, anchor: NaiveDate) -> Option<NaiveDate> {
        match self {
            Period::Daily => anchor.checked_add_days(Days::new(1)),
            Period::Weekly => anchor.checked_add_days(Days::new(7)),
            Period::Monthly => anchor.checked_add_months(Months::new(1)),
            Period::Yearly => anchor.checked_add_months(Months::new(12)),
            Period::Total => None,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Period::Daily => "daily",
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
            Period::Yearly => "yearly",
            Period::Total => "total",
        };
        f.write_str(s)
    }
}

impl FromStr for Period {
    type Err = TradebenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" | "day" => Ok(Period::Daily),
            "weekly" | "week" => Ok(Period::Weekly),
            "monthly" | "month" => Ok(Period::Monthly),
            "yearly" | "year" => Ok(Period::Yearly),
            "total" => Ok(Period::Total),
            other => Err(TradebenchError::invalid_value(
                "period",
                format!("unknown period '{other}' (expected daily, weekly, monthly, yearly or total)"),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodValue<T> {
    pub period_end: NaiveDate,
    pub value: T,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metric {
    Return { as_percentage: bool },
    TradeCount(Action),
    Value,
    PaybackDays,
    FinalValue,
    TotalTrades,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Report {
    Series(Vec<PeriodValue<f64>>),
    Counts(Vec<PeriodValue<usize>>),
    Scalar(f64),
    Days(i64),
    Count(usize),
}

/// Headline figures for one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub initial_value: f64,
    pub final_value: f64,
    pub total_return: f64,
    pub total_return_pct: f64,
    pub max_drawdown: f64,
    pub max_drawdown_duration: i64,
    pub payback_period_days: i64,
    pub buys: usize,
    pub sells: usize,
    pub exits: usize,
    pub total_trades: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Bucket {
    period_end: NaiveDate,
    anchor: usize,
    close: usize,
    complete: bool,
}

impl Bucket {
    /// Entries counted toward this bucket's trades.
    fn members(&self) -> Range<usize> {
        if self.complete {
            self.anchor..self.close
        } else {
            self.anchor..self.close + 1
        }
    }
}

/// Read-only statistics over a non-empty ledger.
#[derive(Debug, Clone, Copy)]
pub struct Analyser<'a> {
    states: &'a [PortfolioState],
    first: &'a PortfolioState,
    last: &'a PortfolioState,
}

impl<'a> Analyser<'a> {
    pub fn new(ledger: &'a Ledger) -> Result<Self, TradebenchError> {
        let states = ledger.states();
        match (states.first(), states.last()) {
            (Some(first), Some(last)) => Ok(Analyser {
                states,
                first,
                last,
            }),
            _ => Err(TradebenchError::EmptyLedger),
        }
    }

    pub fn initial_value(&self) -> f64 {
        self.first.portfolio_value()
    }

    pub fn final_value(&self) -> f64 {
        self.last.portfolio_value()
    }

    pub fn total_return(&self, as_percentage: bool) -> f64 {
        gain(self.initial_value(), self.final_value(), as_percentage)
    }

    pub fn periodic_return(&self, period: Period, as_percentage: bool) -> Vec<PeriodValue<f64>> {
        self.buckets(period)
            .into_iter()
            .map(|b| PeriodValue {
                period_end: b.period_end,
                value: gain(
                    self.states[b.anchor].portfolio_value(),
                    self.states[b.close].portfolio_value(),
                    as_percentage,
                ),
            })
            .collect()
    }

    /// Portfolio value at the close of each bucket.
    pub fn period_values(&self, period: Period) -> Vec<PeriodValue<f64>> {
        self.buckets(period)
            .into_iter()
            .map(|b| PeriodValue {
                period_end: b.period_end,
                value: self.states[b.close].portfolio_value(),
            })
            .collect()
    }

    /// Days until the portfolio first doubles its initial value, or -1.
    pub fn payback_period_days(&self) -> i64 {
        let target = 2.0 * self.initial_value();
        self.states
            .iter()
            .find(|s| s.portfolio_value() >= target)
            .map(|s| (s.date - self.first.date).num_days())
            .unwrap_or(-1)
    }

    /// Entries with `action` per bucket; an Exit also counts as a Sell.
    pub fn trade_count(&self, period: Period, action: Action) -> Vec<PeriodValue<usize>> {
        self.buckets(period)
            .into_iter()
            .map(|b| PeriodValue {
                period_end: b.period_end,
                value: self.states[b.members()]
                    .iter()
                    .filter(|s| counts_as(s.action, action))
                    .count(),
            })
            .collect()
    }

    /// Buy, Sell and Exit entries over the whole ledger.
    pub fn total_trades(&self) -> usize {
        self.states.iter().filter(|s| s.action.is_trade()).count()
    }

    /// Largest peak-to-trough fall in portfolio value, as a fraction of the
    /// peak, and the longest run of entries spent below a peak.
    pub fn max_drawdown(&self) -> (f64, i64) {
        let mut peak = self.initial_value();
        let mut max_dd = 0.0_f64;
        let mut max_duration = 0i64;
        let mut duration = 0i64;

        for value in self.states.iter().map(PortfolioState::portfolio_value) {
            if value > peak {
                peak = value;
                duration = 0;
            } else if peak > 0.0 {
                max_dd = max_dd.max((peak - value) / peak);
                if value < peak {
                    duration += 1;
                    max_duration = max_duration.max(duration);
                }
            }
        }
        (max_dd, max_duration)
    }

    pub fn summary(&self) -> Summary {
        let count = |action: Action| self.states.iter().filter(|s| s.action == action).count();
        let (max_drawdown, max_drawdown_duration) = self.max_drawdown();
        Summary {
            first_date: self.first.date,
            last_date: self.last.date,
            initial_value: self.initial_value(),
            final_value: self.final_value(),
            total_return: self.total_return(false),
            total_return_pct: self.total_return(true),
            max_drawdown,
            max_drawdown_duration,
            payback_period_days: self.payback_period_days(),
            buys: count(Action::Buy),
            sells: count(Action::Sell),
            exits: count(Action::Exit),
            total_trades: self.total_trades(),
        }
    }

    fn buckets(&self, period: Period) -> Vec<Bucket> {
        let mut buckets = Vec::new();
        let mut anchor = 0;
        let mut end = period.end_from(self.first.date);

        for (i, state) in self.states.iter().enumerate().skip(1) {
            let Some(period_end) = end else {
                break;
            };
            if state.date > period_end {
                buckets.push(Bucket {
                    period_end,
                    anchor,
                    close: i,
                    complete: true,
                });
                anchor = i;
                end = period.end_from(state.date);
            }
        }
        buckets.push(Bucket {
            period_end: self.last.date,
            anchor,
            close: self.states.len() - 1,
            complete: false,
        });
        buckets
    }
}

fn gain(initial: f64, last: f64, as_percentage: bool) -> f64 {
    let diff = last - initial;
    if !as_percentage {
        diff
    } else if initial > 0.0 {
        diff / initial * 100.0
    } else {
        0.0
    }
}

fn counts_as(entry: Action, wanted: Action) -> bool {
    entry == wanted || (wanted == Action::Sell && entry == Action::Exit)
}

/// Single entry point: compute `metric` over `ledger`, bucketed by `period`
/// where the metric is periodic.
pub fn analyze(ledger: &Ledger, period: Period, metric: Metric) -> Result<Report, TradebenchError> {
    let analyser = Analyser::new(ledger)?;
    Ok(match metric {
        Metric::Return { as_percentage } => {
            Report::Series(analyser.periodic_return(period, as_percentage))
        }
        Metric::TradeCount(action) => Report::Counts(analyser.trade_count(period, action)),
        Metric::Value => Report::Series(analyser.period_values(period)),
        Metric::PaybackDays => Report::Days(analyser.payback_period_days()),
        Metric::FinalValue => Report::Scalar(analyser.final_value()),
        Metric::TotalTrades => Report::Count(analyser.total_trades()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ledger(entries: &[(NaiveDate, f64, Action)]) -> Ledger {
        let mut ledger = Ledger::new();
        for &(date, value, action) in entries {
            ledger.record(PortfolioState {
                date,
                cash: value,
                coin: 0.0,
                market_price: 1.0,
                action,
            });
        }
        ledger
    }

    fn daily(values: &[f64]) -> Ledger {
        let entries: Vec<_> = values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                (
                    date(2018, 1, 1) + Days::new(i as u64),
                    v,
                    Action::NoAction,
                )
            })
            .collect();
        ledger(&entries)
    }

    #[test]
    fn empty_ledger_is_an_error() {
        let err = Analyser::new(&Ledger::new()).unwrap_err();
        assert!(matches!(err, TradebenchError::EmptyLedger));
        assert!(analyze(&Ledger::new(), Period::Total, Metric::FinalValue).is_err());
    }

    #[test]
    fn total_return_dollars_and_percent() {
        let l = daily(&[1000.0, 1100.0, 1250.0]);
        let a = Analyser::new(&l).unwrap();
        assert_relative_eq!(a.total_return(false), 250.0);
        assert_relative_eq!(a.total_return(true), 25.0);
        assert_relative_eq!(a.final_value(), 1250.0);
    }

    #[test]
    fn percent_return_of_zero_initial_is_zero() {
        let l = daily(&[0.0, 10.0]);
        let a = Analyser::new(&l).unwrap();
        assert_relative_eq!(a.total_return(true), 0.0);
        assert_relative_eq!(a.total_return(false), 10.0);
    }

    #[test]
    fn weekly_buckets_close_on_first_entry_past_end() {
        // 10 daily entries from Jan 1: the first week ends Jan 8, so Jan 9
        // closes it and anchors the next bucket.
        let values: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        let l = daily(&values);
        let a = Analyser::new(&l).unwrap();
        let returns = a.periodic_return(Period::Weekly, false);
        assert_eq!(returns.len(), 2);
        assert_eq!(returns[0].period_end, date(2018, 1, 8));
        assert_relative_eq!(returns[0].value, 8.0);
        assert_eq!(returns[1].period_end, date(2018, 1, 10));
        assert_relative_eq!(returns[1].value, 1.0);
    }

    #[test]
    fn monthly_buckets_use_calendar_months() {
        let l = ledger(&[
            (date(2018, 1, 31), 100.0, Action::NoAction),
            (date(2018, 2, 28), 110.0, Action::NoAction),
            (date(2018, 3, 1), 120.0, Action::NoAction),
            (date(2018, 3, 15), 130.0, Action::NoAction),
        ]);
        let a = Analyser::new(&l).unwrap();
        let values = a.period_values(Period::Monthly);
        // Jan 31 + 1 month clamps to Feb 28
        assert_eq!(values[0].period_end, date(2018, 2, 28));
        assert_relative_eq!(values[0].value, 120.0);
        assert_eq!(values.last().unwrap().period_end, date(2018, 3, 15));
        assert_relative_eq!(values.last().unwrap().value, 130.0);
    }

    #[test]
    fn periodic_returns_telescope() {
        let values: Vec<f64> = (0..60)
            .map(|i| 1000.0 + ((i * 37) % 23) as f64 * 10.0 - i as f64)
            .collect();
        let l = daily(&values);
        let a = Analyser::new(&l).unwrap();
        for period in [Period::Daily, Period::Weekly, Period::Monthly, Period::Yearly] {
            let sum: f64 = a.periodic_return(period, false).iter().map(|p| p.value).sum();
            assert_relative_eq!(sum, a.total_return(false), epsilon = 1e-9);
        }
    }

    #[test]
    fn total_period_is_one_point() {
        let l = daily(&[100.0, 90.0, 150.0]);
        let a = Analyser::new(&l).unwrap();
        let returns = a.periodic_return(Period::Total, true);
        assert_eq!(returns.len(), 1);
        assert_eq!(returns[0].period_end, date(2018, 1, 3));
        assert_relative_eq!(returns[0].value, 50.0);
    }

    #[test]
    fn payback_period() {
        let values: Vec<f64> = (0..61).map(|i| 10_000.0 + 200.0 * i as f64).collect();
        let l = daily(&values);
        assert_eq!(Analyser::new(&l).unwrap().payback_period_days(), 50);

        let l = daily(&[10_000.0, 19_999.0, 15_000.0]);
        assert_eq!(Analyser::new(&l).unwrap().payback_period_days(), -1);
    }

    #[test]
    fn trade_count_counts_exit_as_sell() {
        let l = ledger(&[
            (date(2018, 1, 1), 100.0, Action::Buy),
            (date(2018, 1, 2), 100.0, Action::Sell),
            (date(2018, 1, 3), 100.0, Action::Buy),
            (date(2018, 1, 10), 100.0, Action::Sell),
            (date(2018, 1, 11), 100.0, Action::Exit),
        ]);
        let a = Analyser::new(&l).unwrap();
        let sells = a.trade_count(Period::Weekly, Action::Sell);
        assert_eq!(sells.len(), 2);
        assert_eq!(sells[0].value, 1);
        // Jan 10 closes the first week and counts in the second
        assert_eq!(sells[1].value, 2);
        let buys = a.trade_count(Period::Weekly, Action::Buy);
        assert_eq!(buys[0].value, 2);
        assert_eq!(buys[1].value, 0);
        assert_eq!(a.total_trades(), 5);
        let exits = a.trade_count(Period::Total, Action::Exit);
        assert_eq!(exits, vec![PeriodValue { period_end: date(2018, 1, 11), value: 1 }]);
    }

    #[test]
    fn drawdown() {
        let l = daily(&[100.0, 120.0, 90.0, 60.0, 130.0, 117.0]);
        let (dd, duration) = Analyser::new(&l).unwrap().max_drawdown();
        assert_relative_eq!(dd, 0.5);
        assert_eq!(duration, 2);
    }

    #[test]
    fn summary_and_analyze() {
        let l = ledger(&[
            (date(2018, 1, 1), 1000.0, Action::NoAction),
            (date(2018, 1, 2), 1000.0, Action::Buy),
            (date(2018, 1, 3), 1100.0, Action::Sell),
        ]);
        let s = Analyser::new(&l).unwrap().summary();
        assert_eq!(s.buys, 1);
        assert_eq!(s.sells, 1);
        assert_eq!(s.total_trades, 2);
        assert_relative_eq!(s.total_return_pct, 10.0);
        assert_eq!(s.payback_period_days, -1);

        assert_eq!(
            analyze(&l, Period::Total, Metric::TotalTrades).unwrap(),
            Report::Count(2)
        );
        assert_eq!(
            analyze(&l, Period::Daily, Metric::PaybackDays).unwrap(),
            Report::Days(-1)
        );
        match analyze(&l, Period::Daily, Metric::Return { as_percentage: false }).unwrap() {
            Report::Series(points) => assert_eq!(points.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn period_from_str() {
        assert_eq!("Monthly".parse::<Period>().unwrap(), Period::Monthly);
        assert_eq!("week".parse::<Period>().unwrap(), Period::Weekly);
        assert!("hourly".parse::<Period>().is_err());
    }
}
