//! Volume-Weighted Moving Average.
//!
//! VWMA[i] = sum(C*V) / sum(V) over the trailing n points. Undefined until
//! the window is full, and whenever the window's total volume is zero.

use crate::domain::price::PricePoint;

pub fn calculate_vwma(series: &[PricePoint], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; series.len()];
    }

    series
        .iter()
        .enumerate()
        .map(|(i, _)| {
            if i + 1 < period {
                return None;
            }
            let window = &series[i + 1 - period..=i];
            let pv: f64 = window.iter().map(PricePoint::turnover).sum();
            let v: f64 = window.iter().map(|p| p.volume).sum();
            if v > 0.0 { Some(pv / v) } else { None }
        })
        .collect()
}
