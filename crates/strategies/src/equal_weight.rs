use crate::error::StrategyError;
use crate::Strategy;
use chrono::NaiveDate;

/// Holds every ticker with a price at `1 / count`, rebalanced every date.
#[derive(Debug, Default)]
pub struct EqualWeight;

impl EqualWeight {
    pub fn new() -> Self {
        Self
    }
}

impl Strategy for EqualWeight {
    fn kind(&self) -> &'static str {
        "equal_weight"
    }

    fn prepare(&mut self, _columns: &[String]) -> Result<(), StrategyError> {
        Ok(())
    }

    fn evaluate(
        &mut self,
        _date: NaiveDate,
        prices: &[Option<f64>],
    ) -> Result<Option<Vec<f64>>, StrategyError> {
        let count = prices.iter().filter(|p| p.is_some()).count();
        let targets = prices
            .iter()
            .map(|p| match p {
                Some(_) => 1.0 / count as f64,
                None => 0.0,
            })
            .collect();
        Ok(Some(targets))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_across_priced_tickers_every_date() {
        let mut strategy = EqualWeight::new();
        let date = NaiveDate::from_ymd_opt(2021, 1, 4).unwrap();

        let targets = strategy
            .evaluate(date, &[Some(1.0), None, Some(3.0), Some(4.0)])
            .unwrap()
            .unwrap();

        let third = 1.0 / 3.0;
        assert_eq!(targets, vec![third, 0.0, third, third]);
    }

    #[test]
    fn no_prices_means_flat_book() {
        let mut strategy = EqualWeight::new();
        let date = NaiveDate::from_ymd_opt(2021, 1, 4).unwrap();

        let targets = strategy.evaluate(date, &[None, None]).unwrap();

        assert_eq!(targets, Some(vec![0.0, 0.0]));
    }
}
