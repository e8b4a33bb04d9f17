//! Daily price/volume observations.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
    pub volume: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64, volume: f64) -> Self {
        PricePoint {
            date,
            close,
            volume,
        }
    }

    /// |close - prev_close|. Daily series carry no intrabar high/low, so this
    /// stands in for the canonical true range.
    pub fn close_to_close_range(&self, prev_close: f64) -> f64 {
        (self.close - prev_close).abs()
    }

    /// close * volume
    pub fn turnover(&self) -> f64 {
        self.close * self.volume
    }
}
