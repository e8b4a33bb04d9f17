#![allow(dead_code)]

use chrono::NaiveDate;
use presetscan::domain::error::ScanError;
pub use presetscan::domain::price::PricePoint;
use presetscan::domain::strategy::{IndicatorFamily, IndicatorToggles, StrategyConfig};
use presetscan::ports::data_port::PriceSource;
use std::collections::HashMap;

pub struct MockPriceSource {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
}

impl MockPriceSource {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_series(mut self, symbol: &str, series: Vec<PricePoint>) -> Self {
        self.data.insert(symbol.to_string(), series);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl PriceSource for MockPriceSource {
    fn fetch_series(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>, ScanError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(ScanError::DataSource {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(symbol)
            .map(|series| {
                series
                    .iter()
                    .filter(|p| p.date >= start && p.date <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list_symbols(&self) -> Result<Vec<String>, ScanError> {
        let mut symbols: Vec<_> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Consecutive calendar days from 2024-01-01 with constant volume.
pub fn series_from(prices: &[f64]) -> Vec<PricePoint> {
    let start = date(2024, 1, 1);
    prices
        .iter()
        .enumerate()
        .map(|(i, &close)| PricePoint::new(start + chrono::Duration::days(i as i64), close, 1000.0))
        .collect()
}

pub fn rising_series(count: usize, start_price: f64) -> Vec<PricePoint> {
    let prices: Vec<f64> = (0..count).map(|i| start_price + i as f64).collect();
    series_from(&prices)
}

/// Deterministic wave: trends up with a swing, so every family gets signals.
pub fn wave_series(count: usize) -> Vec<PricePoint> {
    let prices: Vec<f64> = (0..count)
        .map(|i| {
            let t = i as f64;
            100.0 + 0.2 * t + 8.0 * (t / 6.0).sin()
        })
        .collect();
    series_from(&prices)
}

/// SMA-only config with costs switched off.
pub fn sma_config(short: usize, long: usize) -> StrategyConfig {
    StrategyConfig {
        indicators: IndicatorToggles::NONE.with(IndicatorFamily::Sma),
        sma_short: short,
        sma_long: long,
        initial_capital: 100_000.0,
        commission_rate: 0.0,
        tax_rate: 0.0,
        ..StrategyConfig::default()
    }
}
