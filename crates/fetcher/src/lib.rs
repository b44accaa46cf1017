//! # Verdant Data Fetcher
//!
//! Pulls prices, info snapshots and annual statements for lists of tickers from
//! a `MarketDataProvider` and shapes them into price tables and long-format
//! records.
//!
//! Tickers are fetched one after another. The first provider error aborts the
//! whole fetch; nothing is retried.

use api_client::MarketDataProvider;
use chrono::NaiveDate;
use core_types::{CloseRecord, Frame, InfoRecord, PriceTable, StockBundle};
use indicatif::{ProgressBar, ProgressStyle};

pub mod error;
pub mod export;
pub mod statements;

pub use error::FetchError;
pub use export::{STOCK_DATA_FILE, save_bundle};
pub use statements::{fiscal_year, melt_statement};

pub struct DataFetcher {
    provider: Box<dyn MarketDataProvider>,
    show_progress: bool,
}

impl DataFetcher {
    pub fn new(provider: Box<dyn MarketDataProvider>) -> Self {
        Self {
            provider,
            show_progress: true,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Fetches info, annual financials, annual cash flow and daily closes from
    /// `start` for every ticker, concatenated in ticker order.
    pub async fn fetch_bundle(
        &self,
        tickers: &[String],
        start: NaiveDate,
    ) -> Result<StockBundle, FetchError> {
        let progress_bar = self.progress_bar(tickers.len())?;
        let mut bundle = StockBundle::default();

        for ticker in tickers {
            progress_bar.set_message(ticker.clone());
            tracing::info!(ticker = %ticker, "Fetching info, statements and prices");

            let info = self.provider.fetch_info(ticker).await?;
            bundle.info.extend(info.into_iter().map(|(key, value)| InfoRecord {
                key,
                value,
                stock: ticker.clone(),
            }));

            let financials = self.provider.fetch_financials(ticker).await?;
            bundle
                .financials
                .extend(melt_statement(ticker, &financials));

            let cashflow = self.provider.fetch_cashflow(ticker).await?;
            bundle.cashflow.extend(melt_statement(ticker, &cashflow));

            let history = self.provider.fetch_history(ticker, start).await?;
            bundle.close.extend(history.into_iter().map(|bar| CloseRecord {
                date: bar.date,
                close: bar.close,
                stock: ticker.clone(),
            }));

            progress_bar.inc(1);
        }

        progress_bar.finish_with_message("Fetch complete");
        tracing::info!(
            tickers = tickers.len(),
            closes = bundle.close.len(),
            finance_rows = bundle.financials.len(),
            cash_rows = bundle.cashflow.len(),
            "Stock data fetched"
        );
        Ok(bundle)
    }

    /// Fetches daily closes from `start` into a price table with one column per
    /// ticker, outer-joined on date. Dates on which no ticker traded are dropped.
    pub async fn fetch_close(
        &self,
        tickers: &[String],
        start: NaiveDate,
    ) -> Result<PriceTable, FetchError> {
        let progress_bar = self.progress_bar(tickers.len())?;
        let mut prices = Frame::empty();

        for ticker in tickers {
            progress_bar.set_message(ticker.clone());
            let history = self.provider.fetch_history(ticker, start).await?;
            tracing::debug!(ticker = %ticker, bars = history.len(), "Close history fetched");

            let column = Frame::from_series(ticker.clone(), history.into_iter().map(|b| (b.date, b.close)));
            prices = prices.outer_join(&column)?;
            progress_bar.inc(1);
        }

        progress_bar.finish_and_clear();
        let prices = prices.drop_empty_rows();
        tracing::info!(
            tickers = tickers.len(),
            dates = prices.n_rows(),
            "Price table assembled"
        );
        Ok(prices)
    }

    fn progress_bar(&self, len: usize) -> Result<ProgressBar, FetchError> {
        if !self.show_progress {
            return Ok(ProgressBar::hidden());
        }
        let progress_bar = ProgressBar::new(len as u64);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
                .progress_chars("#>-"),
        );
        Ok(progress_bar)
    }
}
