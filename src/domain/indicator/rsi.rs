//! RSI (Relative Strength Index) with Wilder smoothing.
//!
//! - First average: simple mean of the first n gains/losses, emitted at index n
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss)), where a zero
//! avg_loss is replaced by 1 rather than pinning RSI at 100.
//!
//! Undefined before index n, and everywhere when the series has n or fewer
//! points.

use crate::domain::price::PricePoint;

pub fn calculate_rsi(series: &[PricePoint], period: usize) -> Vec<Option<f64>> {
    let mut values = vec![None; series.len()];
    if period == 0 || series.len() <= period {
        return values;
    }

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    for i in 1..series.len() {
        let change = series[i].close - series[i - 1].close;
        let gain = if change > 0.0 { change } else { 0.0 };
        let loss = if change < 0.0 { -change } else { 0.0 };

        if i < period {
            avg_gain += gain;
            avg_loss += loss;
            continue;
        }

        if i == period {
            avg_gain = (avg_gain + gain) / period as f64;
            avg_loss = (avg_loss + loss) / period as f64;
        } else {
            avg_gain = (avg_gain * (period - 1) as f64 + gain) / period as f64;
            avg_loss = (avg_loss * (period - 1) as f64 + loss) / period as f64;
        }

        values[i] = Some(rsi_from_averages(avg_gain, avg_loss));
    }

    values
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    let denominator = if avg_loss == 0.0 { 1.0 } else { avg_loss };
    100.0 - 100.0 / (1.0 + avg_gain / denominator)
}
