//! Strategy configuration: indicator families, their parameters, and the
//! risk/cost settings the simulation runs with.

use std::fmt;
use std::str::FromStr;

/// Indicator families the pipeline knows how to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum IndicatorFamily {
    Sma,
    Ema,
    Rsi,
    Macd,
    Stochastic,
    Vwma,
    Atr,
}

impl IndicatorFamily {
    pub const ALL: [IndicatorFamily; 7] = [
        IndicatorFamily::Sma,
        IndicatorFamily::Ema,
        IndicatorFamily::Rsi,
        IndicatorFamily::Macd,
        IndicatorFamily::Stochastic,
        IndicatorFamily::Vwma,
        IndicatorFamily::Atr,
    ];

    /// ATR only drives the trailing stop; every other family casts a vote.
    pub fn votes(self) -> bool {
        !matches!(self, IndicatorFamily::Atr)
    }

    /// INI key that toggles this family, e.g. `use_sma`.
    pub fn config_key(self) -> &'static str {
        match self {
            IndicatorFamily::Sma => "use_sma",
            IndicatorFamily::Ema => "use_ema",
            IndicatorFamily::Rsi => "use_rsi",
            IndicatorFamily::Macd => "use_macd",
            IndicatorFamily::Stochastic => "use_stochastic",
            IndicatorFamily::Vwma => "use_vwma",
            IndicatorFamily::Atr => "use_atr",
        }
    }
}

impl fmt::Display for IndicatorFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IndicatorFamily::Sma => "SMA",
            IndicatorFamily::Ema => "EMA",
            IndicatorFamily::Rsi => "RSI",
            IndicatorFamily::Macd => "MACD",
            IndicatorFamily::Stochastic => "KD",
            IndicatorFamily::Vwma => "VWMA",
            IndicatorFamily::Atr => "ATR",
        };
        f.write_str(name)
    }
}

/// Enable flags, one per [`IndicatorFamily`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct IndicatorToggles {
    pub sma: bool,
    pub ema: bool,
    pub rsi: bool,
    pub macd: bool,
    pub stochastic: bool,
    pub vwma: bool,
    pub atr: bool,
}

impl IndicatorToggles {
    pub const NONE: IndicatorToggles = IndicatorToggles {
        sma: false,
        ema: false,
        rsi: false,
        macd: false,
        stochastic: false,
        vwma: false,
        atr: false,
    };

    pub const fn with(mut self, family: IndicatorFamily) -> Self {
        match family {
            IndicatorFamily::Sma => self.sma = true,
            IndicatorFamily::Ema => self.ema = true,
            IndicatorFamily::Rsi => self.rsi = true,
            IndicatorFamily::Macd => self.macd = true,
            IndicatorFamily::Stochastic => self.stochastic = true,
            IndicatorFamily::Vwma => self.vwma = true,
            IndicatorFamily::Atr => self.atr = true,
        }
        self
    }

    pub fn set(&mut self, family: IndicatorFamily, enabled: bool) {
        let slot = match family {
            IndicatorFamily::Sma => &mut self.sma,
            IndicatorFamily::Ema => &mut self.ema,
            IndicatorFamily::Rsi => &mut self.rsi,
            IndicatorFamily::Macd => &mut self.macd,
            IndicatorFamily::Stochastic => &mut self.stochastic,
            IndicatorFamily::Vwma => &mut self.vwma,
            IndicatorFamily::Atr => &mut self.atr,
        };
        *slot = enabled;
    }

    pub fn is_enabled(&self, family: IndicatorFamily) -> bool {
        match family {
            IndicatorFamily::Sma => self.sma,
            IndicatorFamily::Ema => self.ema,
            IndicatorFamily::Rsi => self.rsi,
            IndicatorFamily::Macd => self.macd,
            IndicatorFamily::Stochastic => self.stochastic,
            IndicatorFamily::Vwma => self.vwma,
            IndicatorFamily::Atr => self.atr,
        }
    }

    pub fn enabled(&self) -> impl Iterator<Item = IndicatorFamily> + '_ {
        IndicatorFamily::ALL
            .into_iter()
            .filter(|family| self.is_enabled(*family))
    }
}

/// Declared position direction. Only long positions are ever simulated; the
/// other variants are accepted and carried through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TradingMode {
    #[default]
    LongOnly,
    ShortOnly,
    Both,
}

impl FromStr for TradingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "long_only" | "long" => Ok(TradingMode::LongOnly),
            "short_only" | "short" => Ok(TradingMode::ShortOnly),
            "both" => Ok(TradingMode::Both),
            other => Err(format!(
                "unknown trading mode '{other}' (expected long_only, short_only or both)"
            )),
        }
    }
}

/// Whether `run_backtest` evaluates the given config or scans the presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum BacktestMode {
    #[default]
    Single,
    AutoConfig,
}

impl FromStr for BacktestMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "single" => Ok(BacktestMode::Single),
            "auto" | "auto_config" => Ok(BacktestMode::AutoConfig),
            other => Err(format!("unknown mode '{other}' (expected single or auto)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StrategyConfig {
    pub indicators: IndicatorToggles,
    pub sma_short: usize,
    pub sma_long: usize,
    pub ema_short: usize,
    pub ema_long: usize,
    pub rsi_period: usize,
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
    pub vwma_period: usize,
    /// Percent, e.g. 10.0 for 10%. Zero disables the rule.
    pub stop_loss_pct: f64,
    /// Percent. Zero disables the rule.
    pub take_profit_pct: f64,
    /// Fraction of notional, e.g. 0.001425.
    pub commission_rate: f64,
    /// Fraction of exit notional.
    pub tax_rate: f64,
    pub initial_capital: f64,
    pub trading_mode: TradingMode,
    pub mode: BacktestMode,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig {
            indicators: IndicatorToggles::NONE.with(IndicatorFamily::Sma),
            sma_short: 5,
            sma_long: 20,
            ema_short: 12,
            ema_long: 26,
            rsi_period: 14,
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            vwma_period: 20,
            stop_loss_pct: 10.0,
            take_profit_pct: 30.0,
            commission_rate: 0.001425,
            tax_rate: 0.003,
            initial_capital: 1_000_000.0,
            trading_mode: TradingMode::LongOnly,
            mode: BacktestMode::Single,
        }
    }
}

impl StrategyConfig {
    pub fn uses(&self, family: IndicatorFamily) -> bool {
        self.indicators.is_enabled(family)
    }
}
