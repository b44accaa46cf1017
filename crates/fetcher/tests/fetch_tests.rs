//! Fetch loops against an in-memory provider.

use api_client::MarketDataProvider;
use api_client::error::ApiError;
use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::{DailyClose, Statement};
use fetcher::{DataFetcher, FetchError, save_bundle};
use serde_json::{Value, json};
use std::collections::HashMap;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Serves canned histories; any ticker without one fails like an unknown symbol.
struct MockProvider {
    histories: HashMap<String, Vec<DailyClose>>,
}

impl MockProvider {
    fn new(histories: Vec<(&str, Vec<(NaiveDate, f64)>)>) -> Self {
        Self {
            histories: histories
                .into_iter()
                .map(|(ticker, bars)| {
                    let bars = bars
                        .into_iter()
                        .map(|(date, close)| DailyClose { date, close })
                        .collect();
                    (ticker.to_string(), bars)
                })
                .collect(),
        }
    }

    fn known(&self, symbol: &str) -> Result<(), ApiError> {
        if self.histories.contains_key(symbol) {
            Ok(())
        } else {
            Err(ApiError::Provider {
                symbol: symbol.to_string(),
                message: "Not Found: No data found, symbol may be delisted".to_string(),
            })
        }
    }
}

#[async_trait]
impl MarketDataProvider for MockProvider {
    async fn fetch_info(&self, symbol: &str) -> Result<Vec<(String, Value)>, ApiError> {
        self.known(symbol)?;
        Ok(vec![
            ("sector".to_string(), json!("Utilities")),
            ("symbol".to_string(), json!(symbol)),
        ])
    }

    async fn fetch_financials(&self, symbol: &str) -> Result<Statement, ApiError> {
        self.known(symbol)?;
        Ok(Statement {
            line_items: vec!["TotalRevenue".into(), "NetIncome".into()],
            period_ends: vec![date(2021, 1, 10), date(2020, 3, 20)],
            values: vec![vec![Some(10.0), Some(9.0)], vec![Some(1.0), None]],
        })
    }

    async fn fetch_cashflow(&self, symbol: &str) -> Result<Statement, ApiError> {
        self.known(symbol)?;
        Ok(Statement {
            line_items: vec!["FreeCashFlow".into()],
            period_ends: vec![date(2021, 12, 31)],
            values: vec![vec![Some(3.0)]],
        })
    }

    async fn fetch_history(
        &self,
        symbol: &str,
        start: NaiveDate,
    ) -> Result<Vec<DailyClose>, ApiError> {
        self.known(symbol)?;
        Ok(self.histories[symbol]
            .iter()
            .copied()
            .filter(|bar| bar.date >= start)
            .collect())
    }
}

fn tickers(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[tokio::test]
async fn fetch_close_outer_joins_tickers_and_respects_start() {
    let provider = MockProvider::new(vec![
        ("AAA", vec![(date(2020, 12, 31), 9.0), (date(2021, 1, 4), 10.0), (date(2021, 1, 5), 11.0)]),
        ("BBB", vec![(date(2021, 1, 5), 20.0), (date(2021, 1, 6), 21.0)]),
    ]);
    let fetcher = DataFetcher::new(Box::new(provider)).with_progress(false);

    let prices = fetcher
        .fetch_close(&tickers(&["AAA", "BBB"]), date(2021, 1, 1))
        .await
        .unwrap();

    assert_eq!(prices.columns(), &["AAA".to_string(), "BBB".to_string()]);
    assert_eq!(prices.index(), &[date(2021, 1, 4), date(2021, 1, 5), date(2021, 1, 6)]);
    assert_eq!(prices.row(0), &[Some(10.0), None]);
    assert_eq!(prices.row(1), &[Some(11.0), Some(20.0)]);
    assert_eq!(prices.row(2), &[None, Some(21.0)]);
}

#[tokio::test]
async fn fetch_bundle_concatenates_per_ticker() {
    let provider = MockProvider::new(vec![
        ("AAA", vec![(date(2021, 1, 4), 10.0)]),
        ("BBB", vec![(date(2021, 1, 4), 20.0), (date(2021, 1, 5), 21.0)]),
    ]);
    let fetcher = DataFetcher::new(Box::new(provider)).with_progress(false);

    let bundle = fetcher
        .fetch_bundle(&tickers(&["AAA", "BBB"]), date(2021, 1, 1))
        .await
        .unwrap();

    assert_eq!(bundle.info.len(), 4);
    assert_eq!(bundle.info[0].stock, "AAA");
    assert_eq!(bundle.info[3].value, json!("BBB"));
    assert_eq!(bundle.close.len(), 3);
    assert_eq!(bundle.close[2].stock, "BBB");

    // Two periods of two line items per ticker; 2021-01-10 reports 2020.
    assert_eq!(bundle.financials.len(), 8);
    let years: Vec<i32> = bundle.financials[..4].iter().map(|r| r.year).collect();
    assert_eq!(years, vec![2020, 2020, 2020, 2020]);
    assert_eq!(bundle.financials[3].value, None);
    assert_eq!(bundle.cashflow.len(), 2);
    assert_eq!(bundle.cashflow[0].year, 2021);

    let path = std::env::temp_dir()
        .join(format!("verdant-fetch-{}", std::process::id()))
        .join("stock_data.xlsx");
    save_bundle(&bundle, &path).unwrap();
    assert!(path.exists());
}

#[tokio::test]
async fn unknown_ticker_aborts_the_whole_fetch() {
    let provider = MockProvider::new(vec![("AAA", vec![(date(2021, 1, 4), 10.0)])]);
    let fetcher = DataFetcher::new(Box::new(provider)).with_progress(false);

    let result = fetcher
        .fetch_close(&tickers(&["AAA", "ZZZ"]), date(2021, 1, 1))
        .await;

    assert!(matches!(
        result,
        Err(FetchError::Api(ApiError::Provider { ref symbol, .. })) if symbol == "ZZZ"
    ));
}
