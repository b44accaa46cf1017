use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub data: DataConfig,
    pub provider: ProviderConfig,
    pub simulation: Simulation,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Named ticker lists, e.g. `long`, `short`, `crypto`.
    pub universes: BTreeMap<String, Vec<String>>,
    /// The backtests to run, in order.
    #[serde(default)]
    pub runs: Vec<RunConfig>,
}

/// Where data comes from and where workbooks go.
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Output directory for every workbook.
    pub dir: PathBuf,
    /// First date of the close-price history.
    pub start_date: NaiveDate,
    /// The universe whose info, statements and closes go into `stock_data.xlsx`.
    pub fetch_universe: String,
    /// Spreadsheet listing nature disasters.
    pub event_file: PathBuf,
    pub event_begin_column: String,
    /// Calendar days an event stays investable, begin date included.
    pub event_window_days: u32,
}

/// Connection settings for the market-data provider.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub query_base_url: String,
    pub chart_base_url: String,
    /// Endpoint that hands out the session cookie needed for the crumb.
    pub cookie_url: String,
    pub user_agent: String,
    /// Per-request timeout. Requests wait indefinitely when unset.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default = "default_true")]
    pub show_progress: bool,
}

/// Contains parameters for the backtesting and simulation engine.
#[derive(Debug, Clone, Deserialize)]
pub struct Simulation {
    /// The starting capital for every strategy.
    pub initial_capital: f64,
    /// Commission charged on traded notional. 0.001 corresponds to 0.1%.
    #[serde(default)]
    pub commission_pct: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: LogLevel,
    /// When set, logs are also written to a daily rolling file in this directory.
    #[serde(default)]
    pub directory: Option<PathBuf>,
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            directory: None,
            file_prefix: default_file_prefix(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// A single configured backtest.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunConfig {
    /// Hold every ticker of the universe with a price, equally weighted, rebalanced daily.
    EqualWeight { name: String, universe: String },
    /// Equal-magnitude long and short legs.
    LongShort {
        name: String,
        long: String,
        short: String,
    },
    /// Equal weight, invested only inside nature-disaster windows.
    Event { name: String, universe: String },
}

impl RunConfig {
    pub fn name(&self) -> &str {
        match self {
            RunConfig::EqualWeight { name, .. }
            | RunConfig::LongShort { name, .. }
            | RunConfig::Event { name, .. } => name,
        }
    }

    /// The universes whose close prices this run needs.
    pub fn universes(&self) -> Vec<&str> {
        match self {
            RunConfig::EqualWeight { universe, .. } | RunConfig::Event { universe, .. } => {
                vec![universe.as_str()]
            }
            RunConfig::LongShort { long, short, .. } => vec![long.as_str(), short.as_str()],
        }
    }
}

impl Config {
    pub fn universe(&self, name: &str) -> Option<&[String]> {
        self.universes.get(name).map(|tickers| tickers.as_slice())
    }

    pub fn run(&self, name: &str) -> Option<&RunConfig> {
        self.runs.iter().find(|run| run.name() == name)
    }
}

fn default_true() -> bool {
    true
}

fn default_file_prefix() -> String {
    "verdant.log".to_string()
}
