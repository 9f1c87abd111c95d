//! Sheet encoder
//!
//! Every encoding starts with a two-line header:
//!
//! ```text
//! # Sheet: <name>
//! Dimensions: <rows>x<cols>
//! ```
//!
//! followed by a blank line and a body whose layout depends on which
//! encoders are enabled in the [`CompressionConfig`]:
//!
//! - neither: a plain `Text Input:` block (one line per non-empty row,
//!   `ADDR,value` pairs joined by `|`) and, if any cell is formatted, a
//!   `Format Input:` block in the same shape
//! - inverted index only: the inverted-index JSON
//! - format aggregation only: the format-aggregation JSON
//! - both: `{"values":<inverted index>,"formats":<format aggregation>}`
//!
//! A `Merged:` line listing merged ranges closes the body when the grid has
//! any.

use crate::chunking::encode_chunked;
use crate::config::{CompressionConfig, EncodingMode};
use crate::error::{CompressError, CompressResult};
use crate::format_aggregation::{encode_format_aggregation, FormatGroups};
use crate::inverted_index::{encode_inverted_index, InvertedIndex};
use crate::tokens::{TokenEstimator, DEFAULT_ESTIMATOR};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sheetllm_core::SheetMatrix;
use tracing::{debug, warn};

/// Encoded text together with its estimated size
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedSheet {
    /// The encoded document
    pub text: String,
    /// Estimated token count of `text`
    pub tokens: usize,
    /// Number of chunks when the chunking fallback produced the text
    pub chunks: Option<usize>,
}

impl EncodedSheet {
    /// Whether the text came from the chunking fallback
    pub fn is_chunked(&self) -> bool {
        self.chunks.is_some()
    }
}

/// The `# Sheet:` / `Dimensions:` header of a grid
pub fn sheet_header(grid: &SheetMatrix) -> String {
    format!(
        "# Sheet: {}\nDimensions: {}x{}",
        grid.name(),
        grid.max_row(),
        grid.max_col()
    )
}

/// Encodes grids under a token budget
#[derive(Clone, Copy)]
pub struct SheetEncoder<'a> {
    config: &'a CompressionConfig,
    estimator: &'a dyn TokenEstimator,
}

impl<'a> SheetEncoder<'a> {
    /// Create an encoder using the default token estimator
    pub fn new(config: &'a CompressionConfig) -> Self {
        Self {
            config,
            estimator: &DEFAULT_ESTIMATOR,
        }
    }

    /// Use a different token estimator
    pub fn with_estimator(mut self, estimator: &'a dyn TokenEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &'a CompressionConfig {
        self.config
    }

    /// Estimate the token count of `text`
    pub fn estimate(&self, text: &str) -> usize {
        self.estimator.estimate(text)
    }

    /// Encode the body of a grid (no header), including the merged line
    pub fn encode_body(&self, grid: &SheetMatrix) -> CompressResult<String> {
        let mut body = match self.config.encoding_mode() {
            EncodingMode::Plain => plain_body(grid),
            EncodingMode::InvertedIndex => encode_inverted_index(grid)?,
            EncodingMode::FormatAggregation => encode_format_aggregation(grid)?,
            EncodingMode::Combined => {
                let mut combined = Map::new();
                combined.insert(
                    "values".to_string(),
                    Value::Object(InvertedIndex::build(grid).to_json()),
                );
                combined.insert(
                    "formats".to_string(),
                    Value::Object(FormatGroups::build(grid).to_json()),
                );
                serde_json::to_string(&combined)?
            }
        };

        if !grid.merged_ranges().is_empty() {
            let merged: Vec<String> = grid
                .merged_ranges()
                .iter()
                .map(|range| range.to_a1_string())
                .collect();
            body.push_str("\nMerged: ");
            body.push_str(&merged.join(","));
        }

        Ok(body)
    }

    /// Header plus body, without a budget check
    pub fn render(&self, grid: &SheetMatrix) -> CompressResult<String> {
        Ok(format!("{}\n\n{}", sheet_header(grid), self.encode_body(grid)?))
    }

    /// Encode a grid directly, failing if it does not fit the budget
    ///
    /// Never truncates: an over-budget encoding is reported as
    /// [`CompressError::BudgetExceeded`].
    pub fn encode(&self, grid: &SheetMatrix) -> CompressResult<EncodedSheet> {
        let text = self.render(grid)?;
        let tokens = self.estimate(&text);
        let budget = self.config.max_tokens;

        debug!(sheet = grid.name(), tokens, budget, "encoded sheet");
        if tokens > budget {
            return Err(CompressError::BudgetExceeded { tokens, budget });
        }

        Ok(EncodedSheet {
            text,
            tokens,
            chunks: None,
        })
    }

    /// Encode directly, falling back to header-preserving chunks when the
    /// direct encoding is over budget
    pub fn encode_with_fallback(&self, grid: &SheetMatrix) -> CompressResult<EncodedSheet> {
        match self.encode(grid) {
            Err(CompressError::BudgetExceeded { tokens, budget }) => {
                warn!(
                    sheet = grid.name(),
                    tokens, budget, "direct encoding over budget, chunking"
                );
                encode_chunked(grid, self)
            }
            other => other,
        }
    }
}

impl std::fmt::Debug for SheetEncoder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetEncoder")
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}

fn plain_body(grid: &SheetMatrix) -> String {
    let row_line = |cells: Vec<String>| (!cells.is_empty()).then(|| cells.join("|"));

    let text_lines: Vec<String> = (1..=grid.max_row())
        .filter_map(|row| {
            row_line(
                grid.row_cells(row)
                    .map(|cell| format!("{},{}", cell.address, cell.value))
                    .collect(),
            )
        })
        .collect();

    let format_lines: Vec<String> = (1..=grid.max_row())
        .filter_map(|row| {
            row_line(
                grid.row_slots(row)
                    .filter(|cell| !cell.format.is_default())
                    .map(|cell| format!("{},{}", cell.address, cell.format))
                    .collect(),
            )
        })
        .collect();

    let mut body = String::from("Text Input:");
    for line in &text_lines {
        body.push('\n');
        body.push_str(line);
    }
    if !format_lines.is_empty() {
        body.push_str("\n\nFormat Input:");
        for line in &format_lines {
            body.push('\n');
            body.push_str(line);
        }
    }
    body
}
