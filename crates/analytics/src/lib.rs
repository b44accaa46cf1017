//! # Verdant Analytics Engine
//!
//! Performance statistics for a backtest's price series.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** no knowledge of strategies or the simulator. The input is a
//!   dated series of portfolio values.
//! - **Stateless Calculation:** `AnalyticsEngine` takes the series and returns
//!   a `PerformanceReport`. Metrics that cannot be computed are `None`.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: the calculator.
//! - `PerformanceReport`: the standardized set of metrics.
//! - `AnalyticsError`: the errors this crate returns.

pub mod engine;
pub mod error;
pub mod report;

pub use engine::{AnalyticsEngine, TRADING_DAYS_PER_YEAR};
pub use error::AnalyticsError;
pub use report::PerformanceReport;
