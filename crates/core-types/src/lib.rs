pub mod error;
pub mod frame;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use error::CoreError;
pub use frame::{Frame, PriceTable, WeightTable};
pub use structs::{
    CloseRecord, DailyClose, InfoRecord, Statement, StatementRecord, StockBundle,
};
