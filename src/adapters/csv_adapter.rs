//! CSV price file adapter.
//!
//! Reads `<base_path>/<symbol>.csv`. Columns are located by header name, so
//! both `date,close,volume` files and full OHLCV exports work. `price` is
//! accepted in place of `close`; a missing `volume` column reads as 0.

use crate::domain::error::ScanError;
use crate::domain::price::PricePoint;
use crate::ports::data_port::PriceSource;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

pub struct CsvAdapter {
    base_path: PathBuf,
}

struct Columns {
    date: usize,
    close: usize,
    volume: Option<usize>,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{symbol}.csv"))
    }

    fn locate_columns(headers: &csv::StringRecord) -> Result<Columns, ScanError> {
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
        };

        let date = find(&["date"]).ok_or_else(|| ScanError::DataSource {
            reason: "missing date column".into(),
        })?;
        let close = find(&["close", "price"]).ok_or_else(|| ScanError::DataSource {
            reason: "missing close column".into(),
        })?;

        Ok(Columns {
            date,
            close,
            volume: find(&["volume"]),
        })
    }

    fn parse_date(raw: &str) -> Option<NaiveDate> {
        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(raw.trim(), fmt).ok())
    }

    fn parse_row(record: &csv::StringRecord, columns: &Columns) -> Result<PricePoint, String> {
        let raw_date = record.get(columns.date).unwrap_or_default();
        let date = Self::parse_date(raw_date).ok_or_else(|| format!("invalid date '{raw_date}'"))?;

        let raw_close = record.get(columns.close).unwrap_or_default();
        let close: f64 = raw_close
            .trim()
            .parse()
            .map_err(|_| format!("invalid close '{raw_close}'"))?;
        if !close.is_finite() || close <= 0.0 {
            return Err(format!("non-positive close {close}"));
        }

        let volume = match columns.volume.and_then(|i| record.get(i)) {
            None => 0.0,
            Some(raw) if raw.trim().is_empty() => 0.0,
            Some(raw) => {
                let v: f64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| format!("invalid volume '{raw}'"))?;
                if v < 0.0 {
                    return Err(format!("negative volume {v}"));
                }
                v
            }
        };

        Ok(PricePoint::new(date, close, volume))
    }
}

impl PriceSource for CsvAdapter {
    fn fetch_series(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>, ScanError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| ScanError::DataSource {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(|e| ScanError::DataSource {
            reason: format!("CSV header error in {}: {}", path.display(), e),
        })?;
        let columns = Self::locate_columns(headers)?;

        // keyed by date: ascending order, later duplicates replace earlier ones
        let mut by_date: BTreeMap<NaiveDate, PricePoint> = BTreeMap::new();
        let mut skipped = 0usize;

        for (line, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| ScanError::DataSource {
                reason: format!("CSV parse error: {}", e),
            })?;

            match Self::parse_row(&record, &columns) {
                Ok(point) => {
                    if point.date < start || point.date > end {
                        continue;
                    }
                    if by_date.insert(point.date, point).is_some() {
                        debug!(symbol, row = line + 2, "duplicate date replaced");
                    }
                }
                Err(reason) => {
                    skipped += 1;
                    warn!(symbol, row = line + 2, %reason, "skipping price row");
                }
            }
        }

        if skipped > 0 {
            warn!(symbol, skipped, "skipped unreadable price rows");
        }

        Ok(by_date.into_values().collect())
    }

    fn list_symbols(&self) -> Result<Vec<String>, ScanError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| ScanError::DataSource {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| ScanError::DataSource {
                reason: format!("directory entry error: {}", e),
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "csv") {
                if let Some(stem) = path.file_stem() {
                    symbols.push(stem.to_string_lossy().into_owned());
                }
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
