//! # Verdant Backtester
//!
//! A daily target-weight simulator. Each date it marks the book to the latest
//! known prices, asks the strategy for targets and trades to them, then records
//! the portfolio value and the realised weights.

use crate::portfolio::Portfolio;
use analytics::AnalyticsEngine;
use configuration::Simulation;
use core_types::{Frame, PriceTable};
use indicatif::{ProgressBar, ProgressStyle};
use strategies::{Strategy, StrategyError, StrategySpec, create_strategy};

pub mod error;
pub mod portfolio;
pub mod result;

pub use error::BacktestError;
pub use result::BacktestResult;

/// Value of the price series on the first date.
pub const BASE_PRICE: f64 = 100.0;

pub struct Backtester {
    simulation: Simulation,
    analytics_engine: AnalyticsEngine,
    show_progress: bool,
}

impl Backtester {
    pub fn new(simulation: Simulation) -> Self {
        Self {
            simulation,
            analytics_engine: AnalyticsEngine::new(),
            show_progress: true,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Builds the strategy for `spec` and simulates it over `prices`.
    pub fn run_backtest(
        &self,
        name: &str,
        prices: &PriceTable,
        spec: StrategySpec,
    ) -> Result<BacktestResult, BacktestError> {
        self.run(name, prices, create_strategy(spec))
    }

    /// Simulates `strategy` over every date of `prices`.
    pub fn run(
        &self,
        name: &str,
        prices: &PriceTable,
        mut strategy: Box<dyn Strategy>,
    ) -> Result<BacktestResult, BacktestError> {
        if prices.is_empty() || prices.n_cols() == 0 {
            return Err(BacktestError::DataUnavailable);
        }
        let initial_capital = self.simulation.initial_capital;
        if initial_capital.is_nan() || initial_capital <= 0.0 {
            return Err(BacktestError::InvalidParameters(format!(
                "initial capital must be positive, got {initial_capital}"
            )));
        }

        strategy.prepare(prices.columns()).map_err(|e| match e {
            StrategyError::UnknownTicker(ticker) => BacktestError::UnknownTicker(ticker),
            other => other.into(),
        })?;

        tracing::info!(
            run = %name,
            strategy = strategy.kind(),
            tickers = prices.n_cols(),
            dates = prices.n_rows(),
            "Starting backtest"
        );

        let progress_bar = self.progress_bar(prices.n_rows())?;
        let mut portfolio = Portfolio::new(initial_capital, prices.n_cols());
        let mut marks: Vec<Option<f64>> = vec![None; prices.n_cols()];
        let mut series = Vec::with_capacity(prices.n_rows());
        let mut realised = Vec::with_capacity(prices.n_rows());
        let mut rebalances = 0usize;

        for (date, today) in prices.rows() {
            for (mark, price) in marks.iter_mut().zip(today) {
                if price.is_some() {
                    *mark = *price;
                }
            }

            if let Some(targets) = strategy.evaluate(date, today)? {
                if targets.len() != today.len() {
                    return Err(StrategyError::InvalidParameters(format!(
                        "{} targets for {} tickers on {date}",
                        targets.len(),
                        today.len()
                    ))
                    .into());
                }
                let turnover =
                    portfolio.rebalance(&targets, &marks, today, self.simulation.commission_pct);
                rebalances += 1;
                tracing::trace!(%date, turnover, "Rebalanced");
            }

            let equity = portfolio.equity(&marks);
            series.push((date, BASE_PRICE * equity / initial_capital));
            realised.push(
                portfolio
                    .position_values(&marks)
                    .map(|value| (equity != 0.0).then(|| value / equity))
                    .collect(),
            );
            progress_bar.inc(1);
        }

        progress_bar.finish_and_clear();

        let stats = self.analytics_engine.calculate(&series)?;
        let price_series = Frame::from_series(name, series);
        let weights = Frame::new(prices.index().to_vec(), prices.columns().to_vec(), realised)?;

        tracing::info!(
            run = %name,
            rebalances,
            total_return = stats.total_return,
            max_drawdown = stats.max_drawdown,
            "Backtest complete"
        );

        Ok(BacktestResult {
            name: name.to_string(),
            stats,
            prices: price_series,
            weights,
        })
    }

    fn progress_bar(&self, len: usize) -> Result<ProgressBar, BacktestError> {
        if !self.show_progress {
            return Ok(ProgressBar::hidden());
        }
        let progress_bar = ProgressBar::new(len as u64);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
                .progress_chars("=>-"),
        );
        Ok(progress_bar)
    }
}
