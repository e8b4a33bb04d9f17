//! Stochastic oscillator (KD) on closes only.
//!
//! RSV = (C - min) / (max - min) * 100 over the trailing 9 closes, or 50 when
//! the range is flat. K = 2/3 K[prev] + 1/3 RSV, D = 2/3 D[prev] + 1/3 K,
//! with both seeded at 50. Undefined for the first 8 points.

use crate::domain::indicator::StochasticValue;
use crate::domain::price::PricePoint;

pub const LOOKBACK: usize = 9;
const SEED: f64 = 50.0;

pub fn calculate_stochastic(series: &[PricePoint]) -> Vec<Option<StochasticValue>> {
    let mut values: Vec<Option<StochasticValue>> = Vec::with_capacity(series.len());

    for (i, point) in series.iter().enumerate() {
        if i + 1 < LOOKBACK {
            values.push(None);
            continue;
        }

        let window = &series[i + 1 - LOOKBACK..=i];
        let (low, high) = window.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.close), hi.max(p.close))
        });

        let rsv = if high == low {
            50.0
        } else {
            (point.close - low) / (high - low) * 100.0
        };

        let prev = i
            .checked_sub(1)
            .and_then(|j| values[j])
            .unwrap_or(StochasticValue { k: SEED, d: SEED });

        let k = prev.k * (2.0 / 3.0) + rsv * (1.0 / 3.0);
        let d = prev.d * (2.0 / 3.0) + k * (1.0 / 3.0);
        values.push(Some(StochasticValue { k, d }));
    }

    values
}
