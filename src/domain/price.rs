//! Daily OHLC price rows and normalized price series.

use chrono::{Days, NaiveDate};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRow {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl PriceRow {
    /// (high + low) / 2
    pub fn midpoint(&self) -> f64 {
        (self.high + self.low) / 2.0
    }

    /// close - open
    pub fn intraday_change(&self) -> f64 {
        self.close - self.open
    }
}

/// A single dated value of a derived daily series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Daily rows sorted ascending by date with no duplicate dates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    rows: Vec<PriceRow>,
}

impl PriceSeries {
    /// Normalize rows: stable sort by date, keep the first row seen for each date.
    pub fn new(mut rows: Vec<PriceRow>) -> Self {
        let before = rows.len();
        rows.sort_by_key(|r| r.date);
        rows.dedup_by(|later, earlier| later.date == earlier.date);
        if rows.len() != before {
            tracing::warn!(
                dropped = before - rows.len(),
                "dropped price rows with duplicate dates"
            );
        }
        PriceSeries { rows }
    }

    pub fn rows(&self) -> &[PriceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|r| r.date)
    }

    /// True when `start..=end` lies inside the series' first..=last dates.
    pub fn covers(&self, start: NaiveDate, end: NaiveDate) -> bool {
        match (self.first_date(), self.last_date()) {
            (Some(first), Some(last)) => first <= start && end <= last,
            _ => false,
        }
    }

    /// Human-readable coverage, used in error messages.
    pub fn coverage(&self) -> String {
        match (self.first_date(), self.last_date()) {
            (Some(first), Some(last)) => format!("{first}..{last}"),
            _ => "no rows".to_string(),
        }
    }

    pub fn position(&self, date: NaiveDate) -> Option<usize> {
        self.rows.binary_search_by_key(&date, |r| r.date).ok()
    }

    /// Close price on exactly `date`; no interpolation.
    pub fn close_on(&self, date: NaiveDate) -> Option<f64> {
        self.position(date).map(|i| self.rows[i].close)
    }

    /// Rows with `date <= end`, in order.
    pub fn rows_through(&self, end: NaiveDate) -> &[PriceRow] {
        let n = self.rows.partition_point(|r| r.date <= end);
        &self.rows[..n]
    }

    /// Rows with `start <= date <= end`, in order.
    pub fn rows_between(&self, start: NaiveDate, end: NaiveDate) -> &[PriceRow] {
        let from = self.rows.partition_point(|r| r.date < start);
        let to = self.rows.partition_point(|r| r.date <= end).max(from);
        &self.rows[from..to]
    }

    /// Daily midpoint series with every missing calendar day filled by linear
    /// interpolation between the two surrounding known points.
    pub fn midpoint_series(&self) -> Vec<PricePoint> {
        let mut points = Vec::with_capacity(self.rows.len());
        for pair in self.rows.windows(2) {
            let (from, to) = (&pair[0], &pair[1]);
            let (v0, v1) = (from.midpoint(), to.midpoint());
            points.push(PricePoint {
                date: from.date,
                value: v0,
            });
            let gap = (to.date - from.date).num_days();
            for k in 1..gap {
                let Some(date) = from.date.checked_add_days(Days::new(k as u64)) else {
                    break;
                };
                points.push(PricePoint {
                    date,
                    value: v0 + (v1 - v0) * k as f64 / gap as f64,
                });
            }
        }
        if let Some(last) = self.rows.last() {
            points.push(PricePoint {
                date: last.date,
                value: last.midpoint(),
            });
        }
        points
    }
}

impl FromIterator<PriceRow> for PriceSeries {
    fn from_iter<I: IntoIterator<Item = PriceRow>>(iter: I) -> Self {
        PriceSeries::new(iter.into_iter().collect())
    }
}
