use crate::auth::fetch_crumb;
use crate::error::ApiError;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use configuration::ProviderConfig;
use core_types::{DailyClose, Statement};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::OnceCell;

mod auth;
pub mod error;
pub mod responses;

/// Line items requested for the annual income statement.
pub const INCOME_STATEMENT_ITEMS: &[&str] = &[
    "TotalRevenue",
    "CostOfRevenue",
    "GrossProfit",
    "ResearchAndDevelopment",
    "SellingGeneralAndAdministration",
    "OperatingExpense",
    "OperatingIncome",
    "InterestExpense",
    "PretaxIncome",
    "TaxProvision",
    "NetIncome",
    "EBIT",
    "EBITDA",
    "BasicEPS",
    "DilutedEPS",
];

/// Line items requested for the annual cash-flow statement.
pub const CASH_FLOW_ITEMS: &[&str] = &[
    "OperatingCashFlow",
    "InvestingCashFlow",
    "FinancingCashFlow",
    "FreeCashFlow",
    "CapitalExpenditure",
    "DepreciationAndAmortization",
    "StockBasedCompensation",
    "IssuanceOfDebt",
    "RepaymentOfDebt",
    "RepurchaseOfCapitalStock",
    "CashDividendsPaid",
    "ChangesInCash",
    "BeginningCashPosition",
    "EndCashPosition",
];

/// quoteSummary modules merged into a ticker's info snapshot.
const INFO_MODULES: &str = "assetProfile,summaryProfile,summaryDetail,price,defaultKeyStatistics,financialData,esgScores";

/// The interface to a market-data provider.
///
/// The fetcher only talks to this trait, so the live HTTP client can be
/// replaced by an in-memory provider in tests.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// A snapshot of descriptive and valuation fields for a ticker.
    async fn fetch_info(&self, symbol: &str) -> Result<Vec<(String, Value)>, ApiError>;

    /// The annual income statement, columns are fiscal period-end dates.
    async fn fetch_financials(&self, symbol: &str) -> Result<Statement, ApiError>;

    /// The annual cash-flow statement, columns are fiscal period-end dates.
    async fn fetch_cashflow(&self, symbol: &str) -> Result<Statement, ApiError>;

    /// Daily closes from `start` (inclusive) up to today.
    async fn fetch_history(
        &self,
        symbol: &str,
        start: NaiveDate,
    ) -> Result<Vec<DailyClose>, ApiError>;
}

/// A concrete implementation of `MarketDataProvider` for Yahoo Finance.
pub struct YahooClient {
    client: reqwest::Client,
    query_base_url: String,
    chart_base_url: String,
    cookie_url: String,
    crumb: OnceCell<String>,
}

impl YahooClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| ApiError::InvalidData(format!("Invalid user agent: {e}")))?,
        );

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .cookie_store(true);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            query_base_url: config.query_base_url.trim_end_matches('/').to_string(),
            chart_base_url: config.chart_base_url.trim_end_matches('/').to_string(),
            cookie_url: config.cookie_url.clone(),
            crumb: OnceCell::new(),
        })
    }

    /// The crumb is fetched on first use and reused for the client's lifetime.
    async fn crumb(&self) -> Result<&str, ApiError> {
        let crumb = self
            .crumb
            .get_or_try_init(|| fetch_crumb(&self.client, &self.cookie_url, &self.query_base_url))
            .await?;
        Ok(crumb.as_str())
    }

    async fn get_text(&self, url: &str, query: &[(&str, String)]) -> Result<String, ApiError> {
        tracing::debug!(url, "GET");
        let response = self.client.get(url).query(query).send().await?;
        // Error payloads carry a JSON description, so the body is returned either
        // way and the parser turns it into a `Provider` error.
        Ok(response.text().await?)
    }

    async fn fetch_statement(
        &self,
        symbol: &str,
        keys: &[&str],
    ) -> Result<Statement, ApiError> {
        let url = format!(
            "{}/ws/fundamentals-timeseries/v1/finance/timeseries/{}",
            self.query_base_url, symbol
        );
        let types = keys
            .iter()
            .map(|k| format!("annual{k}"))
            .collect::<Vec<_>>()
            .join(",");
        // Annual statements reach back roughly five fiscal years.
        let period1 = (Utc::now() - chrono::Duration::days(6 * 366)).timestamp();
        let period2 = Utc::now().timestamp();

        let body = self
            .get_text(
                &url,
                &[
                    ("symbol", symbol.to_string()),
                    ("type", types),
                    ("period1", period1.to_string()),
                    ("period2", period2.to_string()),
                ],
            )
            .await?;
        responses::parse_timeseries(symbol, &body, keys)
    }
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    async fn fetch_info(&self, symbol: &str) -> Result<Vec<(String, Value)>, ApiError> {
        let crumb = self.crumb().await?.to_string();
        let url = format!("{}/v10/finance/quoteSummary/{}", self.query_base_url, symbol);
        let body = self
            .get_text(
                &url,
                &[("modules", INFO_MODULES.to_string()), ("crumb", crumb)],
            )
            .await?;
        responses::parse_quote_summary(symbol, &body)
    }

    async fn fetch_financials(&self, symbol: &str) -> Result<Statement, ApiError> {
        self.fetch_statement(symbol, INCOME_STATEMENT_ITEMS).await
    }

    async fn fetch_cashflow(&self, symbol: &str) -> Result<Statement, ApiError> {
        self.fetch_statement(symbol, CASH_FLOW_ITEMS).await
    }

    async fn fetch_history(
        &self,
        symbol: &str,
        start: NaiveDate,
    ) -> Result<Vec<DailyClose>, ApiError> {
        let url = format!("{}/v8/finance/chart/{}", self.chart_base_url, symbol);
        let period1 = start
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .ok_or_else(|| ApiError::InvalidData(format!("Invalid start date: {start}")))?;
        let period2 = Utc::now().timestamp();

        let body = self
            .get_text(
                &url,
                &[
                    ("period1", period1.to_string()),
                    ("period2", period2.to_string()),
                    ("interval", "1d".to_string()),
                    ("events", "div,splits".to_string()),
                ],
            )
            .await?;
        responses::parse_chart(symbol, &body)
    }
}
