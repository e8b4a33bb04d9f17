//! Exponential Moving Average.
//!
//! k = 2/(n+1), seeded with the first close, then
//! EMA[i] = C[i]*k + EMA[i-1]*(1-k). Defined from index 0.

use crate::domain::price::PricePoint;

pub fn calculate_ema(series: &[PricePoint], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; series.len()];
    }

    let closes: Vec<f64> = series.iter().map(|p| p.close).collect();
    ema_of(&closes, period).into_iter().map(Some).collect()
}

/// EMA over a raw value column, seeded with its first element.
pub(crate) fn ema_of(values: &[f64], period: usize) -> Vec<f64> {
    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut ema = 0.0;

    for (i, &value) in values.iter().enumerate() {
        ema = if i == 0 {
            value
        } else {
            value * k + ema * (1.0 - k)
        };
        out.push(ema);
    }

    out
}
