use crate::error::ConfigError;
use config::{Environment, File, FileFormat};
use std::collections::HashSet;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{
    Config, DataConfig, LogLevel, LoggingConfig, ProviderConfig, RunConfig, Simulation,
};

/// Built-in defaults: the original universes and the six strategy runs.
const DEFAULT_CONFIG: &str = include_str!("../default.toml");

/// Loads the application configuration.
///
/// Sources are layered in order: the built-in defaults, the TOML file at `path`
/// (optional when it does not exist), then `VERDANT__SECTION__KEY` environment
/// variables. The merged result is validated before it is returned.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
        .add_source(File::from(path).format(FileFormat::Toml).required(false))
        .add_source(Environment::with_prefix("VERDANT").separator("__"))
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    validate(&config)?;

    Ok(config)
}

/// Loads the configuration from an in-memory TOML document layered over the defaults.
pub fn load_config_from_str(toml: &str) -> Result<Config, ConfigError> {
    let config = config::Config::builder()
        .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
        .add_source(File::from_str(toml, FileFormat::Toml))
        .build()?
        .try_deserialize::<Config>()?;
    validate(&config)?;
    Ok(config)
}

/// Cross-field checks that serde cannot express.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if !(config.simulation.initial_capital > 0.0) {
        return Err(ConfigError::ValidationError(format!(
            "simulation.initial_capital must be positive, got {}",
            config.simulation.initial_capital
        )));
    }
    if config.simulation.commission_pct < 0.0 {
        return Err(ConfigError::ValidationError(
            "simulation.commission_pct cannot be negative".to_string(),
        ));
    }
    if config.data.event_window_days == 0 {
        return Err(ConfigError::ValidationError(
            "data.event_window_days must be at least 1".to_string(),
        ));
    }
    if config.universe(&config.data.fetch_universe).is_none() {
        return Err(ConfigError::ValidationError(format!(
            "data.fetch_universe refers to unknown universe '{}'",
            config.data.fetch_universe
        )));
    }
    for (name, tickers) in &config.universes {
        if tickers.is_empty() {
            return Err(ConfigError::ValidationError(format!("universe '{name}' is empty")));
        }
    }

    let mut names = HashSet::new();
    for run in &config.runs {
        if !names.insert(run.name()) {
            return Err(ConfigError::ValidationError(format!(
                "run name '{}' is used more than once",
                run.name()
            )));
        }
        for universe in run.universes() {
            if config.universe(universe).is_none() {
                return Err(ConfigError::ValidationError(format!(
                    "run '{}' refers to unknown universe '{universe}'",
                    run.name()
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn defaults_reproduce_the_original_runs() {
        let config = load_config_from_str("").unwrap();

        assert_eq!(config.data.start_date, NaiveDate::from_ymd_opt(2019, 1, 1).unwrap());
        assert_eq!(config.universe("long").map(|u| u.len()), Some(15));
        assert_eq!(config.universe("short").map(|u| u.len()), Some(15));
        assert_eq!(config.universe("crypto").map(|u| u.len()), Some(4));
        let names: Vec<&str> = config.runs.iter().map(|r| r.name()).collect();
        assert_eq!(
            names,
            vec!["Long only", "Long-Short", "MSCI World", "ESG-ETF", "Crypto", "Nature"]
        );
        assert_eq!(config.provider.timeout_secs, None);
        assert_eq!(config.data.event_window_days, 5);
    }

    #[test]
    fn file_overrides_runs_and_simulation() {
        let config = load_config_from_str(
            r#"
            [simulation]
            initial_capital = 5000.0

            [[runs]]
            kind = "long_short"
            name = "LS"
            long = "long"
            short = "short"
            "#,
        )
        .unwrap();

        assert_eq!(config.simulation.initial_capital, 5000.0);
        assert_eq!(
            config.runs,
            vec![RunConfig::LongShort {
                name: "LS".into(),
                long: "long".into(),
                short: "short".into(),
            }]
        );
    }

    #[test]
    fn unknown_universe_is_rejected() {
        let result = load_config_from_str(
            r#"
            [[runs]]
            kind = "equal_weight"
            name = "Ghost"
            universe = "missing"
            "#,
        );
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn non_positive_capital_is_rejected() {
        let result = load_config_from_str(
            r#"
            [simulation]
            initial_capital = 0.0
            "#,
        );
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }
}
