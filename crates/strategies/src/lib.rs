//! # Verdant Strategy Library
//!
//! Weight construction and the rebalancing strategies the backtester runs.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** no network, no simulation state. Inputs are price tables
//!   and event calendars; outputs are weight tables and per-date targets.
//! - **Strategy agnostic simulator:** the `backtester` drives any `Strategy`
//!   without knowing how its targets are produced.
//!
//! ## Public API
//!
//! - `equal_weight`, `long_short_weight`, `event_weight`, `presence`: weight
//!   table builders.
//! - `EventWindows` and `load_event_windows`: the investable-date calendar.
//! - `Strategy`, `StrategySpec` and `create_strategy`.

pub mod equal_weight;
pub mod error;
pub mod events;
pub mod factory;
pub mod target_weights;
pub mod weights;

pub use equal_weight::EqualWeight;
pub use error::StrategyError;
pub use events::{DEFAULT_WINDOW_DAYS, EventWindows, load_event_windows};
pub use factory::{StrategySpec, create_strategy};
pub use target_weights::TargetWeights;
pub use weights::{equal_weight, event_weight, long_short_weight, presence};

use chrono::NaiveDate;

/// The interface the backtester drives once per date.
///
/// `&mut self` lets a strategy cache work between dates. The `Send + Sync`
/// bounds allow strategies to move across tasks.
pub trait Strategy: Send + Sync {
    /// Short label used in logs.
    fn kind(&self) -> &'static str;

    /// Called once with the price-table columns before the first date.
    fn prepare(&mut self, columns: &[String]) -> Result<(), StrategyError>;

    /// Target weights for one date, aligned to the prepared columns.
    ///
    /// * `Ok(Some(targets))` - rebalance to `targets`.
    /// * `Ok(None)` - keep the current book.
    fn evaluate(
        &mut self,
        date: NaiveDate,
        prices: &[Option<f64>],
    ) -> Result<Option<Vec<f64>>, StrategyError>;
}
