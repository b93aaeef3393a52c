//! RSI (Relative Strength Index) over a rolling window.
//!
//! Each row contributes its intraday change C - O. Average gain and loss are
//! the simple means of the last `window` changes.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss).
//! avg_loss == 0: RSI = 100 when there were gains, undefined on a flat window.
//!
//! Warmup: rows 0..window are undefined.

/// RSI aligned with `changes`; `None` where undefined.
pub fn rolling_rsi(changes: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut values = vec![None; changes.len()];
    if window == 0 || changes.len() <= window {
        return values;
    }

    let gain = |i: usize| changes[i].max(0.0);
    let loss = |i: usize| (-changes[i]).max(0.0);

    let mut gain_sum: f64 = (1..=window).map(gain).sum();
    let mut loss_sum: f64 = (1..=window).map(loss).sum();
    values[window] = rsi(gain_sum, loss_sum);

    for i in window + 1..changes.len() {
        gain_sum += gain(i) - gain(i - window);
        loss_sum += loss(i) - loss(i - window);
        values[i] = rsi(gain_sum.max(0.0), loss_sum.max(0.0));
    }
    values
}

/// Sums stand in for means; the window length cancels out.
fn rsi(gain_sum: f64, loss_sum: f64) -> Option<f64> {
    const EPS: f64 = 1e-12;
    if loss_sum <= EPS {
        return (gain_sum > EPS).then_some(100.0);
    }
    Some(100.0 - 100.0 / (1.0 + gain_sum / loss_sum))
}
