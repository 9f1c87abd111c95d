//! # sheetllm-csv
//!
//! Reads CSV files into [`SheetMatrix`](sheetllm_core::SheetMatrix) grids.

mod error;
mod options;
mod reader;

pub use error::{CsvError, CsvResult};
pub use options::CsvReadOptions;
pub use reader::CsvReader;
