use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Performance metrics for one price series.
///
/// Returns and drawdowns are fractions (`0.12` is 12%). Ratios are annualised
/// (252 trading days, 12 months) with a zero risk-free rate. Monthly and yearly
/// statistics use the last value of each calendar month or year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub start: NaiveDate,
    pub end: NaiveDate,

    // I. Growth
    pub total_return: f64,
    pub cagr: Option<f64>, // None when start and end share a date
    pub mtd: Option<f64>,
    pub ytd: Option<f64>,
    pub one_year: Option<f64>,
    pub three_year: Option<f64>, // annualised

    // II. Risk and Drawdown
    pub max_drawdown: f64, // <= 0
    pub avg_drawdown: Option<f64>,
    pub calmar: Option<f64>, // None without a drawdown

    // III. Daily return statistics
    pub daily_sharpe: Option<f64>,
    pub daily_sortino: Option<f64>,
    pub daily_mean: Option<f64>,
    pub daily_vol: Option<f64>,
    pub daily_skew: Option<f64>,
    pub daily_kurt: Option<f64>, // excess
    pub best_day: Option<f64>,
    pub worst_day: Option<f64>,

    // IV. Monthly and yearly
    pub monthly_sharpe: Option<f64>,
    pub monthly_sortino: Option<f64>,
    pub yearly_sharpe: Option<f64>,
    pub yearly_sortino: Option<f64>,

    pub periods: usize,
}

impl PerformanceReport {
    /// Metric name and value pairs in display order.
    pub fn metrics(&self) -> Vec<(&'static str, Option<f64>)> {
        vec![
            ("Total Return", Some(self.total_return)),
            ("CAGR", self.cagr),
            ("MTD", self.mtd),
            ("YTD", self.ytd),
            ("1Y", self.one_year),
            ("3Y (ann.)", self.three_year),
            ("Max Drawdown", Some(self.max_drawdown)),
            ("Avg. Drawdown", self.avg_drawdown),
            ("Calmar Ratio", self.calmar),
            ("Daily Sharpe", self.daily_sharpe),
            ("Daily Sortino", self.daily_sortino),
            ("Daily Mean (ann.)", self.daily_mean),
            ("Daily Vol (ann.)", self.daily_vol),
            ("Daily Skew", self.daily_skew),
            ("Daily Kurt", self.daily_kurt),
            ("Best Day", self.best_day),
            ("Worst Day", self.worst_day),
            ("Monthly Sharpe", self.monthly_sharpe),
            ("Monthly Sortino", self.monthly_sortino),
            ("Yearly Sharpe", self.yearly_sharpe),
            ("Yearly Sortino", self.yearly_sortino),
            ("Periods", Some(self.periods as f64)),
        ]
    }
}
