//! Configuration validation.
//!
//! Checks the `[analysis]`, `[data]` and `[yahoo]` sections before a run and
//! turns them into typed settings. Absent keys fall back to the defaults.

use crate::domain::error::TickerscopeError;
use crate::domain::indicator::bollinger::mult_to_x100;
use crate::domain::interpreter::InterpreterConfig;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_TIMEOUT_SECS: i64 = 10;

/// Where price history comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Yahoo,
    Csv,
}

impl DataSource {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "yahoo" => Some(DataSource::Yahoo),
            "csv" => Some(DataSource::Csv),
            _ => None,
        }
    }
}

pub fn validate_analysis_config(config: &dyn ConfigPort) -> Result<(), TickerscopeError> {
    validate_rsi_period(config)?;
    validate_thresholds(config)?;
    validate_bollinger(config)?;
    data_source(config)?;
    validate_timeout(config)?;
    Ok(())
}

/// Validated interpreter settings from `[analysis]`.
pub fn build_interpreter_config(
    config: &dyn ConfigPort,
) -> Result<InterpreterConfig, TickerscopeError> {
    validate_analysis_config(config)?;
    let defaults = InterpreterConfig::default();
    Ok(InterpreterConfig {
        rsi_period: config.get_int("analysis", "rsi_period", defaults.rsi_period as i64) as usize,
        rsi_overbought: config.get_double("analysis", "rsi_overbought", defaults.rsi_overbought),
        rsi_oversold: config.get_double("analysis", "rsi_oversold", defaults.rsi_oversold),
        bollinger_period: config.get_int(
            "analysis",
            "bollinger_period",
            defaults.bollinger_period as i64,
        ) as usize,
        bollinger_stddev_mult_x100: mult_to_x100(config.get_double(
            "analysis",
            "bollinger_stddev",
            defaults.bollinger_stddev_mult_x100 as f64 / 100.0,
        )),
    })
}

/// `[data] source`, defaulting to Yahoo when absent.
pub fn data_source(config: &dyn ConfigPort) -> Result<DataSource, TickerscopeError> {
    match config.get_string("data", "source") {
        None => Ok(DataSource::Yahoo),
        Some(s) => DataSource::parse(&s).ok_or_else(|| invalid(
            "data",
            "source",
            format!("unknown source '{}', expected yahoo or csv", s),
        )),
    }
}

fn invalid(section: &str, key: &str, reason: String) -> TickerscopeError {
    TickerscopeError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason,
    }
}

fn validate_rsi_period(config: &dyn ConfigPort) -> Result<(), TickerscopeError> {
    let value = config.get_int("analysis", "rsi_period", 14);
    if value < 1 {
        return Err(invalid(
            "analysis",
            "rsi_period",
            "rsi_period must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn validate_thresholds(config: &dyn ConfigPort) -> Result<(), TickerscopeError> {
    let overbought = config.get_double("analysis", "rsi_overbought", 70.0);
    let oversold = config.get_double("analysis", "rsi_oversold", 30.0);

    for (key, value) in [("rsi_overbought", overbought), ("rsi_oversold", oversold)] {
        if !(0.0..=100.0).contains(&value) {
            return Err(invalid(
                "analysis",
                key,
                format!("{} must be between 0 and 100", key),
            ));
        }
    }
    if oversold >= overbought {
        return Err(invalid(
            "analysis",
            "rsi_oversold",
            "rsi_oversold must be below rsi_overbought".to_string(),
        ));
    }
    Ok(())
}

fn validate_bollinger(config: &dyn ConfigPort) -> Result<(), TickerscopeError> {
    let period = config.get_int("analysis", "bollinger_period", 20);
    if period < 2 {
        return Err(invalid(
            "analysis",
            "bollinger_period",
            "bollinger_period must be at least 2".to_string(),
        ));
    }
    let mult = config.get_double("analysis", "bollinger_stddev", 2.0);
    if mult <= 0.0 || mult_to_x100(mult) == 0 {
        return Err(invalid(
            "analysis",
            "bollinger_stddev",
            "bollinger_stddev must be positive".to_string(),
        ));
    }
    Ok(())
}

fn validate_timeout(config: &dyn ConfigPort) -> Result<(), TickerscopeError> {
    let value = config.get_int("yahoo", "timeout_secs", DEFAULT_TIMEOUT_SECS);
    if value < 1 {
        return Err(invalid(
            "yahoo",
            "timeout_secs",
            "timeout_secs must be at least 1".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = make_config("");
        assert!(validate_analysis_config(&config).is_ok());
        assert_eq!(
            build_interpreter_config(&config).unwrap(),
            InterpreterConfig::default()
        );
        assert_eq!(data_source(&config).unwrap(), DataSource::Yahoo);
    }

    #[test]
    fn full_config_is_read() {
        let config = make_config(
            r#"
[analysis]
rsi_period = 10
rsi_overbought = 80
rsi_oversold = 20
bollinger_period = 30
bollinger_stddev = 2.5

[data]
source = CSV
csv_dir = ./data

[yahoo]
timeout_secs = 5
"#,
        );
        let interp = build_interpreter_config(&config).unwrap();
        assert_eq!(interp.rsi_period, 10);
        assert_eq!(interp.rsi_overbought, 80.0);
        assert_eq!(interp.rsi_oversold, 20.0);
        assert_eq!(interp.bollinger_period, 30);
        assert_eq!(interp.bollinger_stddev_mult_x100, 250);
        assert_eq!(data_source(&config).unwrap(), DataSource::Csv);
    }

    #[test]
    fn rsi_period_zero_fails() {
        let config = make_config("[analysis]\nrsi_period = 0\n");
        let err = validate_analysis_config(&config).unwrap_err();
        assert!(matches!(err, TickerscopeError::ConfigInvalid { key, .. } if key == "rsi_period"));
    }

    #[test]
    fn threshold_out_of_range_fails() {
        let config = make_config("[analysis]\nrsi_overbought = 120\n");
        let err = validate_analysis_config(&config).unwrap_err();
        assert!(
            matches!(err, TickerscopeError::ConfigInvalid { key, .. } if key == "rsi_overbought")
        );
    }

    #[test]
    fn oversold_above_overbought_fails() {
        let config = make_config("[analysis]\nrsi_overbought = 40\nrsi_oversold = 60\n");
        let err = validate_analysis_config(&config).unwrap_err();
        assert!(
            matches!(err, TickerscopeError::ConfigInvalid { key, .. } if key == "rsi_oversold")
        );
    }

    #[test]
    fn bollinger_period_below_two_fails() {
        let config = make_config("[analysis]\nbollinger_period = 1\n");
        let err = validate_analysis_config(&config).unwrap_err();
        assert!(
            matches!(err, TickerscopeError::ConfigInvalid { key, .. } if key == "bollinger_period")
        );
    }

    #[test]
    fn bollinger_stddev_non_positive_fails() {
        let config = make_config("[analysis]\nbollinger_stddev = -1\n");
        let err = validate_analysis_config(&config).unwrap_err();
        assert!(
            matches!(err, TickerscopeError::ConfigInvalid { key, .. } if key == "bollinger_stddev")
        );
    }

    #[test]
    fn unknown_source_fails() {
        let config = make_config("[data]\nsource = bloomberg\n");
        let err = validate_analysis_config(&config).unwrap_err();
        assert!(matches!(err, TickerscopeError::ConfigInvalid { key, .. } if key == "source"));
    }

    #[test]
    fn timeout_zero_fails() {
        let config = make_config("[yahoo]\ntimeout_secs = 0\n");
        let err = validate_analysis_config(&config).unwrap_err();
        assert!(
            matches!(err, TickerscopeError::ConfigInvalid { key, .. } if key == "timeout_secs")
        );
    }

    #[test]
    fn data_source_parse() {
        assert_eq!(DataSource::parse(" Yahoo "), Some(DataSource::Yahoo));
        assert_eq!(DataSource::parse("csv"), Some(DataSource::Csv));
        assert_eq!(DataSource::parse("sqlite"), None);
    }
}
