use crate::error::StrategyError;
use crate::Strategy;
use chrono::NaiveDate;
use core_types::WeightTable;

/// Rebalances to a precomputed weight table.
///
/// Targets are applied verbatim on every date the table contains and nothing
/// happens on other dates. Tickers the table does not list are closed out at
/// each rebalance.
#[derive(Debug)]
pub struct TargetWeights {
    kind: &'static str,
    weights: WeightTable,
    // Weight-table column for each price column, resolved by `prepare`.
    column_map: Vec<Option<usize>>,
}

impl TargetWeights {
    pub fn new(kind: &'static str, weights: WeightTable) -> Self {
        Self {
            kind,
            weights,
            column_map: Vec::new(),
        }
    }
}

impl Strategy for TargetWeights {
    fn kind(&self) -> &'static str {
        self.kind
    }

    fn prepare(&mut self, columns: &[String]) -> Result<(), StrategyError> {
        if let Some(missing) = self
            .weights
            .columns()
            .iter()
            .find(|w| !columns.contains(*w))
        {
            return Err(StrategyError::UnknownTicker(missing.clone()));
        }

        self.column_map = columns
            .iter()
            .map(|c| self.weights.column_position(c))
            .collect();
        Ok(())
    }

    fn evaluate(
        &mut self,
        date: NaiveDate,
        prices: &[Option<f64>],
    ) -> Result<Option<Vec<f64>>, StrategyError> {
        let Some(row) = self.weights.row_position(date) else {
            return Ok(None);
        };
        if self.column_map.len() != prices.len() {
            return Err(StrategyError::InvalidParameters(format!(
                "strategy prepared for {} columns but evaluated with {}",
                self.column_map.len(),
                prices.len()
            )));
        }

        let targets = self
            .column_map
            .iter()
            .map(|col| col.and_then(|c| self.weights.get(row, c)).unwrap_or(0.0))
            .collect();
        Ok(Some(targets))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::Frame;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 1, d).unwrap()
    }

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn table() -> WeightTable {
        Frame::new(
            vec![date(4), date(6)],
            columns(&["B", "A"]),
            vec![vec![Some(0.5), Some(-0.5)], vec![Some(1.0), None]],
        )
        .unwrap()
    }

    #[test]
    fn targets_follow_price_column_order() {
        let mut strategy = TargetWeights::new("long_short", table());
        strategy.prepare(&columns(&["A", "B", "C"])).unwrap();

        let targets = strategy.evaluate(date(4), &[Some(1.0), Some(1.0), Some(1.0)]).unwrap();
        assert_eq!(targets, Some(vec![-0.5, 0.5, 0.0]));

        let targets = strategy.evaluate(date(6), &[Some(1.0), Some(1.0), Some(1.0)]).unwrap();
        assert_eq!(targets, Some(vec![0.0, 1.0, 0.0]));
    }

    #[test]
    fn dates_outside_the_table_do_not_rebalance() {
        let mut strategy = TargetWeights::new("event", table());
        strategy.prepare(&columns(&["A", "B"])).unwrap();

        assert_eq!(strategy.evaluate(date(5), &[Some(1.0), Some(1.0)]).unwrap(), None);
    }

    #[test]
    fn weight_column_without_prices_is_rejected() {
        let mut strategy = TargetWeights::new("event", table());

        let result = strategy.prepare(&columns(&["A"]));

        assert!(matches!(result, Err(StrategyError::UnknownTicker(t)) if t == "B"));
    }
}
