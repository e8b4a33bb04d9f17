//! Simple Moving Average.
//!
//! SMA[i] = mean(C[i-n+1..=i]). Undefined for the first n-1 points.

use crate::domain::price::PricePoint;

pub fn calculate_sma(series: &[PricePoint], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; series.len()];
    }

    series
        .iter()
        .enumerate()
        .map(|(i, _)| {
            if i + 1 < window {
                None
            } else {
                let sum: f64 = series[i + 1 - window..=i].iter().map(|p| p.close).sum();
                Some(sum / window as f64)
            }
        })
        .collect()
}
