use analytics::PerformanceReport;
use anyhow::{Context, anyhow};
use api_client::YahooClient;
use backtester::{BacktestResult, Backtester};
use clap::{Parser, Subcommand};
use comfy_table::{Table, presets::UTF8_FULL};
use configuration::{Config, LogLevel, RunConfig};
use core_types::PriceTable;
use fetcher::{DataFetcher, STOCK_DATA_FILE, save_bundle};
use std::collections::HashMap;
use std::path::PathBuf;
use strategies::{StrategySpec, event_weight, load_event_windows, long_short_weight};

/// The main entry point for the Verdant research pipeline.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; settings fall back to config.toml and defaults.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = configuration::load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    let _log_guard = configuration::init_tracing(&config.logging)?;

    let client = YahooClient::new(&config.provider).context("Failed to build the HTTP client")?;
    let fetcher = DataFetcher::new(Box::new(client)).with_progress(config.provider.show_progress);

    match cli.command {
        Commands::Fetch(args) => {
            let universe = args.universe.unwrap_or_else(|| config.data.fetch_universe.clone());
            handle_fetch(&config, &fetcher, &universe).await?;
        }
        Commands::Backtest(args) => {
            handle_backtest(&config, &fetcher, &args.run).await?;
        }
        Commands::All => {
            handle_fetch(&config, &fetcher, &config.data.fetch_universe).await?;
            handle_backtest(&config, &fetcher, &[]).await?;
        }
    }

    Ok(())
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Fetches climate-stock data from Yahoo Finance and backtests portfolio strategies on it.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Built-in defaults apply when it is absent.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Overrides the configured log level. RUST_LOG still takes precedence.
    #[arg(long, value_enum)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download info, statements and prices for a universe into stock_data.xlsx.
    Fetch(FetchArgs),
    /// Run configured backtests and write one workbook per run.
    Backtest(BacktestArgs),
    /// Fetch the primary universe, then run every configured backtest.
    All,
}

#[derive(Parser)]
struct FetchArgs {
    /// The universe to fetch (e.g., "long"). Defaults to `data.fetch_universe`.
    #[arg(long)]
    universe: Option<String>,
}

#[derive(Parser)]
struct BacktestArgs {
    /// Name of a configured run (e.g., "Long-Short"). Repeat to select several; omit for all.
    #[arg(long = "run")]
    run: Vec<String>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_fetch(config: &Config, fetcher: &DataFetcher, universe: &str) -> anyhow::Result<()> {
    let tickers = config
        .universe(universe)
        .ok_or_else(|| anyhow!("Universe '{universe}' is not configured"))?;
    tracing::info!(universe, tickers = tickers.len(), "Fetching stock data");

    let bundle = fetcher
        .fetch_bundle(tickers, config.data.start_date)
        .await
        .with_context(|| format!("Failed to fetch stock data for universe '{universe}'"))?;

    let path = config.data.dir.join(STOCK_DATA_FILE);
    save_bundle(&bundle, &path).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Stock data written to {}", path.display());
    Ok(())
}

async fn handle_backtest(
    config: &Config,
    fetcher: &DataFetcher,
    selected: &[String],
) -> anyhow::Result<()> {
    let runs: Vec<&RunConfig> = if selected.is_empty() {
        config.runs.iter().collect()
    } else {
        selected
            .iter()
            .map(|name| {
                config
                    .run(name)
                    .ok_or_else(|| anyhow!("Run '{name}' is not configured"))
            })
            .collect::<anyhow::Result<_>>()?
    };

    let backtester =
        Backtester::new(config.simulation.clone()).with_progress(config.provider.show_progress);
    let mut prices = PriceCache::default();

    for run in runs {
        for universe in run.universes() {
            prices.load(config, fetcher, universe).await?;
        }

        let (table, spec) = prepare_run(config, &prices, run)?;
        let result = backtester
            .run_backtest(run.name(), &table, spec)
            .with_context(|| format!("Backtest '{}' failed", run.name()))?;
        let path = result
            .save(&config.data.dir)
            .with_context(|| format!("Failed to write results for '{}'", run.name()))?;

        print_stats(&result);
        println!("Results written to {}", path.display());
    }

    Ok(())
}

/// Builds the price table and strategy for one run from cached universes.
fn prepare_run(
    config: &Config,
    prices: &PriceCache,
    run: &RunConfig,
) -> anyhow::Result<(PriceTable, StrategySpec)> {
    match run {
        RunConfig::EqualWeight { universe, .. } => {
            Ok((prices.get(universe)?.clone(), StrategySpec::EqualWeight))
        }
        RunConfig::LongShort { long, short, .. } => {
            let long = prices.get(long)?;
            let short = prices.get(short)?;
            let weights = long_short_weight(long, short)?;
            Ok((long.outer_join(short)?, StrategySpec::LongShortTarget(weights)))
        }
        RunConfig::Event { universe, .. } => {
            let windows = load_event_windows(
                &config.data.event_file,
                &config.data.event_begin_column,
                config.data.event_window_days,
            )
            .with_context(|| {
                format!("Failed to load events from {}", config.data.event_file.display())
            })?;
            let table = prices.get(universe)?;
            let weights = event_weight(table, &windows);
            Ok((table.clone(), StrategySpec::EventTarget(weights)))
        }
    }
}

/// Close tables fetched during this invocation, keyed by universe name.
#[derive(Default)]
struct PriceCache {
    tables: HashMap<String, PriceTable>,
}

impl PriceCache {
    async fn load(&mut self, config: &Config, fetcher: &DataFetcher, universe: &str) -> anyhow::Result<()> {
        if self.tables.contains_key(universe) {
            return Ok(());
        }
        let tickers = config
            .universe(universe)
            .ok_or_else(|| anyhow!("Universe '{universe}' is not configured"))?;
        let table = fetcher
            .fetch_close(tickers, config.data.start_date)
            .await
            .with_context(|| format!("Failed to fetch prices for universe '{universe}'"))?;
        self.tables.insert(universe.to_string(), table);
        Ok(())
    }

    fn get(&self, universe: &str) -> anyhow::Result<&PriceTable> {
        self.tables
            .get(universe)
            .ok_or_else(|| anyhow!("Prices for universe '{universe}' were not loaded"))
    }
}

fn print_stats(result: &BacktestResult) {
    let stats: &PerformanceReport = &result.stats;
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Stat".to_string(), result.name.clone()]);
    table.add_row(vec!["Start".to_string(), stats.start.to_string()]);
    table.add_row(vec!["End".to_string(), stats.end.to_string()]);
    for (label, value) in stats.metrics() {
        let value = value.map_or_else(|| "-".to_string(), |v| format!("{v:.4}"));
        table.add_row(vec![label.to_string(), value]);
    }
    println!("{table}");
}
