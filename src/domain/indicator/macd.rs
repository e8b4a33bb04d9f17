//! MACD (Moving Average Convergence Divergence).
//!
//! MACD Line = EMA(12) - EMA(26), both seeded with the first close.
//! Signal Line = EMA(9) of the MACD line, seeded with the first MACD value.
//! Histogram = MACD Line - Signal Line
//!
//! Every EMA here is defined from index 0, so MACD has no warm-up gap.

use crate::domain::indicator::ema::ema_of;
use crate::domain::indicator::MacdValue;
use crate::domain::price::PricePoint;

pub const FAST_PERIOD: usize = 12;
pub const SLOW_PERIOD: usize = 26;
pub const SIGNAL_PERIOD: usize = 9;

pub fn calculate_macd(series: &[PricePoint]) -> Vec<Option<MacdValue>> {
    let closes: Vec<f64> = series.iter().map(|p| p.close).collect();
    let fast = ema_of(&closes, FAST_PERIOD);
    let slow = ema_of(&closes, SLOW_PERIOD);

    let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal = ema_of(&line, SIGNAL_PERIOD);

    line.into_iter()
        .zip(signal)
        .map(|(line, signal)| {
            Some(MacdValue {
                line,
                signal,
                histogram: line - signal,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::make_series;

    fn rising(n: usize) -> Vec<PricePoint> {
        let prices: Vec<f64> = (0..n).map(|i| 100.0 + i as f64).collect();
        make_series(&prices)
    }

    #[test]
    fn macd_first_point_is_flat() {
        let macd = calculate_macd(&rising(5));
        let first = macd[0].unwrap();
        assert_eq!(first.line, 0.0);
        assert_eq!(first.signal, 0.0);
        assert_eq!(first.histogram, 0.0);
    }

    #[test]
    fn macd_histogram_equals_line_minus_signal() {
        for value in calculate_macd(&rising(40)).into_iter().flatten() {
            assert!((value.histogram - (value.line - value.signal)).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn macd_positive_histogram_in_uptrend() {
        let macd = calculate_macd(&rising(40));
        assert!(macd[39].unwrap().line > 0.0);
        assert!(macd[39].unwrap().histogram > 0.0);
    }

    #[test]
    fn macd_signal_is_ema_of_line() {
        let macd = calculate_macd(&rising(3));
        let k = 2.0 / (SIGNAL_PERIOD as f64 + 1.0);
        let l0 = macd[0].unwrap().line;
        let l1 = macd[1].unwrap().line;
        let expected = l1 * k + l0 * (1.0 - k);
        assert!((macd[1].unwrap().signal - expected).abs() < 1e-12);
    }

    #[test]
    fn macd_defined_everywhere() {
        assert!(calculate_macd(&rising(10)).iter().all(Option::is_some));
    }

    #[test]
    fn macd_empty() {
        assert!(calculate_macd(&[]).is_empty());
    }
}
