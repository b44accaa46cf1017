use crate::error::AnalyticsError;
use crate::report::PerformanceReport;
use chrono::{Datelike, Months, NaiveDate};

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
const MONTHS_PER_YEAR: f64 = 12.0;
const DAYS_PER_YEAR: f64 = 365.25;

/// A stateless calculator for deriving performance metrics from a price series.
#[derive(Debug, Default)]
pub struct AnalyticsEngine {}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the report for `series`, which must be sorted by date.
    ///
    /// # Errors
    ///
    /// `NotEnoughData` for an empty series and `NonPositiveValue` when any
    /// value is zero or negative.
    pub fn calculate(
        &self,
        series: &[(NaiveDate, f64)],
    ) -> Result<PerformanceReport, AnalyticsError> {
        let (Some(&(start, first)), Some(&(end, last))) = (series.first(), series.last()) else {
            return Err(AnalyticsError::NotEnoughData(
                "price series is empty".to_string(),
            ));
        };
        if let Some(&(date, value)) = series.iter().find(|(_, v)| v.is_nan() || *v <= 0.0) {
            return Err(AnalyticsError::NonPositiveValue { date, value });
        }

        let total_return = last / first - 1.0;
        let cagr = growth_rate(start, first, end, last);
        let max_drawdown = max_drawdown(series);
        let calmar = match cagr {
            Some(cagr) if max_drawdown < 0.0 => Some(cagr / max_drawdown.abs()),
            _ => None,
        };

        let returns = simple_returns(series);
        let (daily_sharpe, daily_sortino) = risk_adjusted(&returns, TRADING_DAYS_PER_YEAR);
        let daily_mean = mean(&returns);
        let daily_std = sample_std(&returns);
        let annualiser = TRADING_DAYS_PER_YEAR.sqrt();

        let monthly = period_ends(series, |d| (d.year(), d.month()));
        let yearly = period_ends(series, |d| d.year());
        let (monthly_sharpe, monthly_sortino) =
            risk_adjusted(&simple_returns(&monthly), MONTHS_PER_YEAR);
        let (yearly_sharpe, yearly_sortino) = risk_adjusted(&simple_returns(&yearly), 1.0);

        let report = PerformanceReport {
            start,
            end,
            total_return,
            cagr,
            mtd: since_previous_period(&monthly, last),
            ytd: since_previous_period(&yearly, last),
            one_year: trailing(series, 1).map(|(_, value)| last / value - 1.0),
            three_year: trailing(series, 3)
                .and_then(|(date, value)| growth_rate(date, value, end, last)),
            max_drawdown,
            avg_drawdown: avg_drawdown(series),
            calmar,
            daily_sharpe,
            daily_sortino,
            daily_mean: daily_mean.map(|m| m * TRADING_DAYS_PER_YEAR),
            daily_vol: daily_std.map(|s| s * annualiser),
            daily_skew: skew(&returns),
            daily_kurt: kurtosis(&returns),
            best_day: returns.iter().copied().reduce(f64::max),
            worst_day: returns.iter().copied().reduce(f64::min),
            monthly_sharpe,
            monthly_sortino,
            yearly_sharpe,
            yearly_sortino,
            periods: series.len(),
        };

        tracing::debug!(
            total_return = report.total_return,
            max_drawdown = report.max_drawdown,
            periods = report.periods,
            "Performance report calculated"
        );
        Ok(report)
    }
}

fn simple_returns(series: &[(NaiveDate, f64)]) -> Vec<f64> {
    series.windows(2).map(|w| w[1].1 / w[0].1 - 1.0).collect()
}

/// Sharpe and Sortino of `returns`, scaled by `sqrt(periods_per_year)`.
///
/// Sortino divides by the sample std of `min(r, 0)`.
fn risk_adjusted(returns: &[f64], periods_per_year: f64) -> (Option<f64>, Option<f64>) {
    let avg = mean(returns);
    let downside: Vec<f64> = returns.iter().map(|r| r.min(0.0)).collect();
    let annualiser = periods_per_year.sqrt();
    (
        ratio(avg, sample_std(returns)).map(|r| r * annualiser),
        ratio(avg, sample_std(&downside)).map(|r| r * annualiser),
    )
}

/// Last observation of each calendar period, in order.
fn period_ends<K: PartialEq>(
    series: &[(NaiveDate, f64)],
    key: impl Fn(NaiveDate) -> K,
) -> Vec<(NaiveDate, f64)> {
    let mut ends: Vec<(NaiveDate, f64)> = Vec::new();
    for &(date, value) in series {
        match ends.last_mut() {
            Some(last) if key(last.0) == key(date) => *last = (date, value),
            _ => ends.push((date, value)),
        }
    }
    ends
}

/// Return from the close of the previous period, None inside the first one.
fn since_previous_period(ends: &[(NaiveDate, f64)], last: f64) -> Option<f64> {
    let &(_, previous) = ends.iter().rev().nth(1)?;
    Some(last / previous - 1.0)
}

/// Latest observation at least `years` before the final date.
fn trailing(series: &[(NaiveDate, f64)], years: u32) -> Option<(NaiveDate, f64)> {
    let &(end, _) = series.last()?;
    let cutoff = end.checked_sub_months(Months::new(12 * years))?;
    series.iter().rev().find(|(date, _)| *date <= cutoff).copied()
}

fn growth_rate(start: NaiveDate, first: f64, end: NaiveDate, last: f64) -> Option<f64> {
    let days = (end - start).num_days();
    if days <= 0 {
        return None;
    }
    let years = days as f64 / DAYS_PER_YEAR;
    Some((last / first).powf(1.0 / years) - 1.0)
}

/// Largest peak-to-trough fall as a negative fraction, `0` without one.
fn max_drawdown(series: &[(NaiveDate, f64)]) -> f64 {
    let mut peak = f64::MIN;
    let mut worst = 0.0_f64;
    for &(_, value) in series {
        peak = peak.max(value);
        worst = worst.min(value / peak - 1.0);
    }
    worst
}

/// Mean of the deepest point of each drawdown episode, None without any.
///
/// An episode opens when the value falls below its running peak and closes
/// when a new peak is reached or the series ends.
fn avg_drawdown(series: &[(NaiveDate, f64)]) -> Option<f64> {
    let mut peak = f64::MIN;
    let mut troughs = Vec::new();
    let mut current: Option<f64> = None;
    for &(_, value) in series {
        if value >= peak {
            peak = value;
            troughs.extend(current.take());
            continue;
        }
        let drawdown = value / peak - 1.0;
        current = Some(current.map_or(drawdown, |d| d.min(drawdown)));
    }
    troughs.extend(current);
    mean(&troughs)
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Standard deviation with one degree of freedom.
fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Adjusted Fisher-Pearson skewness, None below three points or without spread.
fn skew(values: &[f64]) -> Option<f64> {
    let n = values.len() as f64;
    if values.len() < 3 {
        return None;
    }
    let z = standardised(values)?;
    let sum: f64 = z.iter().map(|z| z.powi(3)).sum();
    Some(n / ((n - 1.0) * (n - 2.0)) * sum)
}

/// Unbiased excess kurtosis, None below four points or without spread.
fn kurtosis(values: &[f64]) -> Option<f64> {
    let n = values.len() as f64;
    if values.len() < 4 {
        return None;
    }
    let z = standardised(values)?;
    let sum: f64 = z.iter().map(|z| z.powi(4)).sum();
    let scale = n * (n + 1.0) / ((n - 1.0) * (n - 2.0) * (n - 3.0));
    let correction = 3.0 * (n - 1.0).powi(2) / ((n - 2.0) * (n - 3.0));
    Some(scale * sum - correction)
}

fn standardised(values: &[f64]) -> Option<Vec<f64>> {
    let m = mean(values)?;
    let sd = sample_std(values).filter(|sd| *sd > 0.0)?;
    Some(values.iter().map(|v| (v - m) / sd).collect())
}

fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    match (numerator, denominator) {
        (Some(n), Some(d)) if d > 0.0 => Some(n / d),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn empty_series_is_rejected() {
        let result = AnalyticsEngine::new().calculate(&[]);
        assert!(matches!(result, Err(AnalyticsError::NotEnoughData(_))));
    }

    #[test]
    fn single_point_leaves_rates_undefined() {
        let report = AnalyticsEngine::new()
            .calculate(&[(date(2021, 1, 4), 100.0)])
            .unwrap();

        assert_eq!(report.total_return, 0.0);
        assert_eq!(report.cagr, None);
        assert_eq!(report.max_drawdown, 0.0);
        assert_eq!(report.daily_sharpe, None);
        assert_eq!(report.best_day, None);
        assert_eq!(report.mtd, None);
        assert_eq!(report.daily_skew, None);
        assert_eq!(report.periods, 1);
    }

    #[test]
    fn drawdown_is_measured_from_the_running_peak() {
        let series = [
            (date(2021, 1, 4), 100.0),
            (date(2021, 1, 5), 120.0),
            (date(2021, 1, 6), 90.0),
            (date(2021, 1, 7), 110.0),
        ];

        let report = AnalyticsEngine::new().calculate(&series).unwrap();

        assert!(close(report.total_return, 0.10));
        assert!(close(report.max_drawdown, -0.25));
        assert!(close(report.best_day.unwrap(), 110.0 / 90.0 - 1.0));
        assert!(close(report.worst_day.unwrap(), -0.25));
        assert!(report.calmar.is_some());
    }

    #[test]
    fn cagr_uses_calendar_days() {
        let series = [(date(2020, 1, 1), 100.0), (date(2021, 12, 31), 121.0)];

        let report = AnalyticsEngine::new().calculate(&series).unwrap();

        let years = 730.0 / 365.25;
        assert!(close(report.cagr.unwrap(), 1.21_f64.powf(1.0 / years) - 1.0));
    }

    #[test]
    fn flat_series_has_no_sharpe() {
        let series: Vec<_> = (4..9).map(|d| (date(2021, 1, d), 100.0)).collect();

        let report = AnalyticsEngine::new().calculate(&series).unwrap();

        assert_eq!(report.daily_vol, Some(0.0));
        assert_eq!(report.daily_sharpe, None);
        assert_eq!(report.calmar, None);
    }

    #[test]
    fn sharpe_is_annualised_mean_over_sample_std() {
        let series = [
            (date(2021, 1, 4), 100.0),
            (date(2021, 1, 5), 101.0),
            (date(2021, 1, 6), 100.0),
            (date(2021, 1, 7), 102.0),
        ];

        let report = AnalyticsEngine::new().calculate(&series).unwrap();

        let returns = [0.01, 100.0 / 101.0 - 1.0, 0.02];
        let m = returns.iter().sum::<f64>() / 3.0;
        let sd = (returns.iter().map(|r| (r - m).powi(2)).sum::<f64>() / 2.0).sqrt();
        assert!(close(report.daily_sharpe.unwrap(), m / sd * 252f64.sqrt()));
        assert!(close(report.daily_mean.unwrap(), m * 252.0));
    }

    fn sample_sd(values: &[f64]) -> f64 {
        let m = values.iter().sum::<f64>() / values.len() as f64;
        let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
        var.sqrt()
    }

    #[test]
    fn period_returns_start_from_previous_closes() {
        let series = [
            (date(2020, 12, 31), 100.0),
            (date(2021, 1, 29), 110.0),
            (date(2021, 2, 26), 121.0),
        ];

        let report = AnalyticsEngine::new().calculate(&series).unwrap();

        assert!(close(report.mtd.unwrap(), 0.10));
        assert!(close(report.ytd.unwrap(), 0.21));
        assert_eq!(report.one_year, None);
        assert_eq!(report.three_year, None);
        // One year-on-year return has no spread.
        assert_eq!(report.yearly_sharpe, None);
    }

    #[test]
    fn trailing_returns_use_the_last_close_before_the_cutoff() {
        let series = [
            (date(2018, 1, 2), 100.0),
            (date(2020, 6, 30), 150.0),
            (date(2021, 1, 4), 180.0),
            (date(2021, 1, 5), 200.0),
        ];

        let report = AnalyticsEngine::new().calculate(&series).unwrap();

        // The 2020-01-05 cutoff falls before the June close.
        assert!(close(report.one_year.unwrap(), 1.0));
        let years = (date(2021, 1, 5) - date(2018, 1, 2)).num_days() as f64 / 365.25;
        assert!(close(report.three_year.unwrap(), 2f64.powf(1.0 / years) - 1.0));
        assert!(close(report.mtd.unwrap(), 200.0 / 150.0 - 1.0));
    }

    #[test]
    fn monthly_ratios_use_month_end_values() {
        let series = [
            (date(2021, 1, 29), 100.0),
            (date(2021, 2, 10), 130.0),
            (date(2021, 2, 26), 110.0),
            (date(2021, 3, 31), 99.0),
            (date(2021, 4, 15), 80.0),
            (date(2021, 4, 30), 108.9),
        ];

        let report = AnalyticsEngine::new().calculate(&series).unwrap();

        let returns = [0.1, -0.1, 0.1];
        let m = returns.iter().sum::<f64>() / 3.0;
        let downside = [0.0, -0.1, 0.0];
        assert!(close(report.monthly_sharpe.unwrap(), m / sample_sd(&returns) * 12f64.sqrt()));
        assert!(close(report.monthly_sortino.unwrap(), m / sample_sd(&downside) * 12f64.sqrt()));
        // A single calendar year has no yearly return.
        assert_eq!(report.yearly_sortino, None);
        assert_eq!(report.ytd, None);
    }

    #[test]
    fn symmetric_returns_have_no_skew() {
        let series = [
            (date(2021, 1, 4), 100.0),
            (date(2021, 1, 5), 110.0),
            (date(2021, 1, 6), 99.0),
            (date(2021, 1, 7), 108.9),
            (date(2021, 1, 8), 98.01),
        ];

        let report = AnalyticsEngine::new().calculate(&series).unwrap();

        assert!(close(report.daily_skew.unwrap(), 0.0));
        assert!(close(report.daily_kurt.unwrap(), -6.0));

        let short = AnalyticsEngine::new().calculate(&series[..4]).unwrap();
        assert!(short.daily_skew.is_some());
        assert_eq!(short.daily_kurt, None);
    }

    #[test]
    fn average_drawdown_takes_each_episode_trough() {
        let series = [
            (date(2021, 1, 4), 100.0),
            (date(2021, 1, 5), 90.0),
            (date(2021, 1, 6), 95.0),
            (date(2021, 1, 7), 100.0),
            (date(2021, 1, 8), 80.0),
            (date(2021, 1, 11), 85.0),
        ];

        let report = AnalyticsEngine::new().calculate(&series).unwrap();

        assert!(close(report.avg_drawdown.unwrap(), -0.15));
        assert!(close(report.max_drawdown, -0.20));

        let rising = [(date(2021, 1, 4), 100.0), (date(2021, 1, 5), 101.0)];
        let report = AnalyticsEngine::new().calculate(&rising).unwrap();
        assert_eq!(report.avg_drawdown, None);
    }

    #[test]
    fn non_positive_values_are_rejected() {
        let series = [(date(2021, 1, 4), 100.0), (date(2021, 1, 5), 0.0)];
        let result = AnalyticsEngine::new().calculate(&series);
        assert_eq!(
            result,
            Err(AnalyticsError::NonPositiveValue {
                date: date(2021, 1, 5),
                value: 0.0
            })
        );
    }
}
