//! INI file configuration adapter.

use crate::domain::error::ScanError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScanError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config.load(path).map_err(|reason| ScanError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, ScanError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| ScanError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_deref()
            .and_then(Self::parse_bool)
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    const SAMPLE: &str = r#"
[backtest]
symbol = 2330.TW
data_dir = /var/data/prices
initial_capital = 1000000
commission_rate = 0.001425
mode = auto

[strategy]
use_sma = on
use_rsi = yes
use_macd = off
sma_short = 5
sma_long = 20
stop_loss = 7.5
"#;

    #[test]
    fn from_string_parses_sections() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(
            adapter.get_string("backtest", "symbol"),
            Some("2330.TW".to_string())
        );
        assert_eq!(
            adapter.get_string("backtest", "data_dir"),
            Some("/var/data/prices".to_string())
        );
        assert_eq!(adapter.get_string("backtest", "mode"), Some("auto".to_string()));
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_string("backtest", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
        assert_eq!(adapter.get_string("strategy", "use_vwma"), None);
    }

    #[test]
    fn get_double_reads_windows() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_double("strategy", "sma_long", 0.0), 20.0);
        assert_eq!(adapter.get_double("strategy", "ema_long", 26.0), 26.0);
    }

    #[test]
    fn get_double_reads_rates() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_double("backtest", "commission_rate", 0.0), 0.001425);
        assert_eq!(adapter.get_double("strategy", "stop_loss", 0.0), 7.5);
        assert_eq!(adapter.get_double("strategy", "take_profit", 30.0), 30.0);
    }

    #[test]
    fn get_double_returns_default_for_non_numeric() {
        let adapter =
            FileConfigAdapter::from_string("[backtest]\ninitial_capital = not_a_number\n").unwrap();
        assert_eq!(adapter.get_double("backtest", "initial_capital", 99.9), 99.9);
    }

    #[test]
    fn get_bool_accepts_on_off_yes_no() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert!(adapter.get_bool("strategy", "use_sma", false));
        assert!(adapter.get_bool("strategy", "use_rsi", false));
        assert!(!adapter.get_bool("strategy", "use_macd", true));
    }

    #[test]
    fn get_bool_numeric_and_words() {
        let adapter =
            FileConfigAdapter::from_string("[strategy]\na = 1\nb = FALSE\nc = 0\nd = True\n").unwrap();
        assert!(adapter.get_bool("strategy", "a", false));
        assert!(!adapter.get_bool("strategy", "b", true));
        assert!(!adapter.get_bool("strategy", "c", true));
        assert!(adapter.get_bool("strategy", "d", false));
    }

    #[test]
    fn get_bool_returns_default_for_missing_or_garbage() {
        let adapter = FileConfigAdapter::from_string("[strategy]\nuse_atr = maybe\n").unwrap();
        assert!(adapter.get_bool("strategy", "missing", true));
        assert!(!adapter.get_bool("strategy", "missing", false));
        assert!(adapter.get_bool("strategy", "use_atr", true));
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config(SAMPLE);
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(adapter.get_double("strategy", "sma_short", 0.0), 5.0);
    }

    #[test]
    fn from_file_missing_is_config_parse_error() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/scan.ini");
        assert!(matches!(
            result,
            Err(ScanError::ConfigParse { file, .. }) if file.contains("scan.ini")
        ));
    }
}
