//! Moving-average crossovers (SMA, DEMA with two windows; TMA with three).
//!
//! Runs on the gap-filled daily midpoint series. Averages are seeded over the
//! window ending at the start date, so `long_window - 1` days of history must
//! precede it. The strategy starts flat, buys `amount_to_trade` on the entry
//! signal and sells its whole holding on the exit signal. The stop-loss is
//! only checked while holding.

use crate::domain::backtest::{Order, Session};
use crate::domain::error::TradebenchError;
use crate::domain::indicator::moving_average::{ExponentialMean, RollingMean};
use crate::domain::portfolio::Ledger;
use crate::domain::price::PriceSeries;
use crate::domain::strategy::CrossoverParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Averaging {
    Simple,
    /// Seeded from the simple mean, then `avg += 2/(w+1) * (price - avg)`.
    Exponential,
}

#[derive(Debug, Clone)]
enum Average {
    Simple(RollingMean),
    Exponential(RollingMean, ExponentialMean),
}

impl Average {
    fn value(&self) -> f64 {
        match self {
            Average::Simple(m) => m.mean(),
            Average::Exponential(_, e) => e.value(),
        }
    }

    fn advance(&mut self, values: &[f64]) {
        match self {
            Average::Simple(m) => {
                m.advance(values);
            }
            Average::Exponential(m, e) => {
                if m.advance(values).is_some() {
                    e.update(values[m.head()]);
                }
            }
        }
    }
}

/// short > long, or short >= medium >= long.
fn entry_signal(averages: &[f64]) -> bool {
    match *averages {
        [short, long] => short > long,
        [short, medium, long] => short >= medium && medium >= long,
        _ => false,
    }
}

/// short < long, or the triple averages inverted or the medium below the long.
fn exit_signal(averages: &[f64]) -> bool {
    match *averages {
        [short, long] => short < long,
        [short, medium, long] => {
            (short <= medium && medium <= long) || (short >= medium && medium <= long)
        }
        _ => false,
    }
}

pub fn run(
    params: &CrossoverParams,
    averaging: Averaging,
    series: &PriceSeries,
) -> Result<Ledger, TradebenchError> {
    let common = &params.common;
    let points = series.midpoint_series();
    let values: Vec<f64> = points.iter().map(|p| p.value).collect();
    let out_of_bounds = || TradebenchError::DateRangeOutOfBounds {
        start: common.start_date,
        end: common.end_date,
        coverage: series.coverage(),
    };

    let first = series.first_date().ok_or_else(out_of_bounds)?;
    let start = usize::try_from((common.start_date - first).num_days()).map_err(|_| out_of_bounds())?;
    let end = usize::try_from((common.end_date - first).num_days()).map_err(|_| out_of_bounds())?;
    if end >= values.len() {
        return Err(out_of_bounds());
    }

    let mut averages = params
        .windows
        .iter()
        .map(|&window| {
            let mean = RollingMean::seed(&values, start, window)?;
            Some(match averaging {
                Averaging::Simple => Average::Simple(mean),
                Averaging::Exponential => {
                    let ema = ExponentialMean::new(mean.mean(), window);
                    Average::Exponential(mean, ema)
                }
            })
        })
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| {
            let needed = params.windows.last().copied().unwrap_or(1).saturating_sub(1);
            tracing::warn!(needed, available = start, "not enough history before the start date");
            out_of_bounds()
        })?;

    let mut session = Session::new(common);
    let mut holding = false;
    let mut current = Vec::with_capacity(averages.len());

    for idx in start..=end {
        if idx > start {
            for average in &mut averages {
                average.advance(&values);
            }
        }
        let point = points[idx];
        if holding && session.stop_loss_triggered(point.date, point.value) {
            break;
        }

        current.clear();
        current.extend(averages.iter().map(Average::value));

        let order = if !holding && entry_signal(&current) {
            Order::Buy
        } else if holding && exit_signal(&current) {
            Order::SellAll
        } else {
            Order::Hold
        };
        if session.execute(point.date, point.value, order).is_trade() {
            holding = !holding;
        }
    }
    Ok(session.finish())
}
