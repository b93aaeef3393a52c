//! Rate of change with an exact calendar-day lookback.
//!
//! ROC(n) at date d = (C[d] - C[d - n days]) / C[d - n days] * 100
//! No value when either close is missing; 0 when the earlier close is 0.

use chrono::{Days, NaiveDate};

use crate::domain::price::PriceSeries;

pub fn rate_of_change(series: &PriceSeries, date: NaiveDate, days: u32) -> Option<f64> {
    let current = series.close_on(date)?;
    let earlier = date.checked_sub_days(Days::new(u64::from(days)))?;
    let previous = series.close_on(earlier)?;
    if previous == 0.0 {
        return Some(0.0);
    }
    Some((current - previous) / previous * 100.0)
}
