//! CSV error types

use thiserror::Error;

/// Result type for CSV operations
pub type CsvResult<T> = std::result::Result<T, CsvError>;

/// Errors that can occur while reading CSV input
#[derive(Debug, Error)]
pub enum CsvError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV library error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The input does not fit in a sheet
    #[error("CSV input too large: {rows} rows x {cols} columns")]
    TooLarge { rows: usize, cols: usize },

    /// Core error
    #[error("Grid error: {0}")]
    Core(#[from] sheetllm_core::Error),
}
