//! Price data source port.

use crate::domain::error::ScanError;
use crate::domain::price::PricePoint;
use chrono::NaiveDate;

/// Supplies a daily close/volume series for one symbol.
///
/// Implementations return points in ascending date order with at most one
/// point per day, restricted to `start..=end`.
pub trait PriceSource {
    fn fetch_series(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>, ScanError>;

    fn list_symbols(&self) -> Result<Vec<String>, ScanError>;
}
