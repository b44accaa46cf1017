use crate::equal_weight::EqualWeight;
use crate::target_weights::TargetWeights;
use crate::Strategy;
use core_types::WeightTable;

/// The algorithms a backtest can run.
#[derive(Debug, Clone)]
pub enum StrategySpec {
    /// Select every ticker with a price, weigh equally, rebalance daily.
    EqualWeight,
    /// Rebalance to a long/short weight table on the dates it contains.
    LongShortTarget(WeightTable),
    /// Rebalance to an event weight table on the dates it contains.
    EventTarget(WeightTable),
}

/// Creates the strategy that implements `spec`.
pub fn create_strategy(spec: StrategySpec) -> Box<dyn Strategy> {
    match spec {
        StrategySpec::EqualWeight => Box::new(EqualWeight::new()),
        StrategySpec::LongShortTarget(weights) => {
            Box::new(TargetWeights::new("long_short", weights))
        }
        StrategySpec::EventTarget(weights) => Box::new(TargetWeights::new("event", weights)),
    }
}
