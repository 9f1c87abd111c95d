//! Error types for the compression pipeline

use crate::strategy::Strategy;
use thiserror::Error;

/// Result type for compression operations
pub type CompressResult<T> = std::result::Result<T, CompressError>;

/// Errors that can occur while compressing or encoding a sheet
#[derive(Debug, Error)]
pub enum CompressError {
    /// An encoding's estimated size is over the token budget
    #[error("Encoded sheet exceeds token limit: {tokens} > {budget}")]
    BudgetExceeded { tokens: usize, budget: usize },

    /// Every attempted strategy failed
    #[error("No viable compression strategy ({} attempted)", failures.len())]
    NoViableStrategy {
        /// Each attempted strategy with its failure message
        failures: Vec<(Strategy, String)>,
    },

    /// Grid or address contract violation (e.g. a malformed address)
    #[error("Grid error: {0}")]
    Core(#[from] sheetllm_core::Error),

    /// IO error while persisting metadata or output
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding/decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV input error
    #[cfg(feature = "csv")]
    #[error("CSV error: {0}")]
    Csv(#[from] sheetllm_csv::CsvError),
}

impl CompressError {
    /// Whether a cheaper strategy or chunking can recover from this error
    pub fn is_budget_exceeded(&self) -> bool {
        matches!(self, CompressError::BudgetExceeded { .. })
    }
}
