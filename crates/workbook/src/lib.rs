//! # Verdant Workbook I/O
//!
//! All spreadsheet traffic of the system goes through this crate: result sheets
//! are assembled as [`Sheet`]s of [`Cell`]s and saved with [`WorkbookWriter`];
//! frames and event dates are read back with [`read_frame`] and
//! [`read_date_column`].

pub mod error;
pub mod reader;
pub mod writer;

pub use error::WorkbookError;
pub use reader::{read_date_column, read_frame};
pub use writer::{Cell, Sheet, WorkbookWriter};
