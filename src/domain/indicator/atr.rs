//! Average True Range on close-to-close moves.
//!
//! TR[i] = |C[i] - C[i-1]|; there is no intrabar high/low in a daily close
//! series, so this understates a canonical ATR. Wilder smoothing:
//! ATR[1] = TR[1], ATR[i] = (ATR[i-1] * (n-1) + TR[i]) / n.
//! ATR[0] is undefined.

use crate::domain::price::PricePoint;

pub const ATR_PERIOD: usize = 14;

pub fn calculate_atr(series: &[PricePoint], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; series.len()];
    }

    let mut values: Vec<Option<f64>> = Vec::with_capacity(series.len());
    let mut atr = 0.0;

    for (i, point) in series.iter().enumerate() {
        if i == 0 {
            values.push(None);
            continue;
        }
        let tr = point.close_to_close_range(series[i - 1].close);
        atr = if i == 1 {
            tr
        } else {
            (atr * (period - 1) as f64 + tr) / period as f64
        };
        values.push(Some(atr));
    }

    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::make_series;

    #[test]
    fn atr_seeded_with_first_true_range() {
        let series = make_series(&[100.0, 104.0, 101.0]);
        let atr = calculate_atr(&series, ATR_PERIOD);
        assert_eq!(atr[0], None);
        assert!((atr[1].unwrap() - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn atr_wilder_smoothing() {
        let series = make_series(&[100.0, 104.0, 101.0, 103.0]);
        let atr = calculate_atr(&series, ATR_PERIOD);
        let a2 = (4.0 * 13.0 + 3.0) / 14.0;
        let a3 = (a2 * 13.0 + 2.0) / 14.0;
        assert!((atr[2].unwrap() - a2).abs() < 1e-12);
        assert!((atr[3].unwrap() - a3).abs() < 1e-12);
    }

    #[test]
    fn atr_flat_series_is_zero() {
        let series = make_series(&[50.0; 6]);
        for v in calculate_atr(&series, ATR_PERIOD).into_iter().skip(1) {
            assert_eq!(v, Some(0.0));
        }
    }

    #[test]
    fn atr_single_point() {
        let series = make_series(&[50.0]);
        assert_eq!(calculate_atr(&series, ATR_PERIOD), vec![None]);
    }

    #[test]
    fn atr_period_0() {
        let series = make_series(&[50.0, 51.0]);
        assert_eq!(calculate_atr(&series, 0), vec![None, None]);
    }
}
