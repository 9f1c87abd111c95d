//! Compression configuration
//!
//! Every knob of the pipeline lives in an immutable [`CompressionConfig`]
//! value that is passed into each encoder and compressor call. The heuristic
//! weights and thresholds are empirically tuned; the defaults below are the
//! tuned values and should not be changed casually.

use crate::error::CompressResult;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Weights and thresholds for structural-anchor scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorWeights {
    /// Weight per distinct value in a row
    pub row_diversity: f64,
    /// Weight per distinct value in a column
    pub col_diversity: f64,
    /// Weight of the non-numeric ratio of a column
    pub non_numeric: f64,
    /// Added when any cell is bordered
    pub border: f64,
    /// Added when any cell has a fill or font color
    pub color: f64,
    /// Added when any cell is bold or italic
    pub emphasis: f64,
    /// Score at which a row/column becomes an anchor
    pub threshold: f64,
    /// Fallback threshold used when too few anchors were found
    pub secondary_threshold: f64,
    /// Fewer anchors than this triggers the secondary scan
    pub min_anchors: usize,
    /// The secondary scan only runs on axes longer than this
    pub secondary_scan_min_len: u32,
}

impl Default for AnchorWeights {
    fn default() -> Self {
        Self {
            row_diversity: 2.0,
            col_diversity: 1.5,
            non_numeric: 3.0,
            border: 1.5,
            color: 1.0,
            emphasis: 1.0,
            threshold: 3.0,
            secondary_threshold: 2.0,
            min_anchors: 3,
            secondary_scan_min_len: 5,
        }
    }
}

/// Options for splitting an over-budget grid into row chunks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingOptions {
    /// Token budget divided by this gives the rows per chunk
    pub tokens_per_row: usize,
    /// Lower clamp for rows per chunk
    pub min_rows_per_chunk: usize,
    /// Upper clamp for rows per chunk
    pub max_rows_per_chunk: usize,
    /// Header detection looks at most at this many leading rows
    pub header_scan_rows: u32,
    /// Text placed between chunks
    pub separator: String,
}

impl Default for ChunkingOptions {
    fn default() -> Self {
        Self {
            tokens_per_row: 100,
            min_rows_per_chunk: 20,
            max_rows_per_chunk: 200,
            header_scan_rows: 10,
            separator: "\n\n---\n\n".to_string(),
        }
    }
}

/// Options for multi-strategy selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyOptions {
    /// Sheets with `rows * cols * 2` above this skip the trial search
    pub large_sheet_threshold: u64,
    /// A strategy whose ratio is below this is accepted immediately
    pub early_exit_ratio: f64,
}

impl Default for StrategyOptions {
    fn default() -> Self {
        Self {
            large_sheet_threshold: 100_000,
            early_exit_ratio: 0.3,
        }
    }
}

/// Which encoders run and under what budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    /// Prune the grid to structural anchors before encoding
    pub use_structural_anchors: bool,
    /// Encode values as an inverted index
    pub use_inverted_index: bool,
    /// Encode formats and number formats as aggregated ranges
    pub use_format_aggregation: bool,
    /// Rows/columns kept on each side of an anchor
    pub anchor_proximity: u32,
    /// Token budget for a direct encoding
    pub max_tokens: usize,
    /// Anchor scoring constants
    pub anchors: AnchorWeights,
    /// Chunking constants
    pub chunking: ChunkingOptions,
    /// Strategy selection constants
    pub strategy: StrategyOptions,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            use_structural_anchors: true,
            use_inverted_index: true,
            use_format_aggregation: true,
            anchor_proximity: 4,
            max_tokens: 4000,
            anchors: AnchorWeights::default(),
            chunking: ChunkingOptions::default(),
            strategy: StrategyOptions::default(),
        }
    }
}

impl CompressionConfig {
    /// Create the default configuration (all modules on, 4000 tokens)
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a JSON file; missing fields take defaults
    pub fn load<P: AsRef<Path>>(path: P) -> CompressResult<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Select the modules to run
    pub fn with_modules(mut self, anchors: bool, inverted_index: bool, format_aggregation: bool) -> Self {
        self.use_structural_anchors = anchors;
        self.use_inverted_index = inverted_index;
        self.use_format_aggregation = format_aggregation;
        self
    }

    /// Set the token budget
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the anchor proximity
    pub fn with_anchor_proximity(mut self, k: u32) -> Self {
        self.anchor_proximity = k;
        self
    }

    /// The body layout implied by the encoder toggles
    pub fn encoding_mode(&self) -> EncodingMode {
        match (self.use_inverted_index, self.use_format_aggregation) {
            (true, true) => EncodingMode::Combined,
            (true, false) => EncodingMode::InvertedIndex,
            (false, true) => EncodingMode::FormatAggregation,
            (false, false) => EncodingMode::Plain,
        }
    }
}

/// Layout of an encoded sheet body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingMode {
    /// `Text Input:` / `Format Input:` plain-text block
    Plain,
    /// Inverted-index JSON
    InvertedIndex,
    /// Format-aggregation JSON
    FormatAggregation,
    /// Both JSON encodings in one object
    Combined,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_tuned_constants() {
        let config = CompressionConfig::default();
        assert_eq!(config.anchor_proximity, 4);
        assert_eq!(config.max_tokens, 4000);
        assert_eq!(config.anchors.threshold, 3.0);
        assert_eq!(config.anchors.secondary_threshold, 2.0);
        assert_eq!(config.chunking.tokens_per_row, 100);
        assert_eq!(config.strategy.large_sheet_threshold, 100_000);
        assert_eq!(config.encoding_mode(), EncodingMode::Combined);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: CompressionConfig =
            serde_json::from_str(r#"{"use_inverted_index": false, "anchors": {"threshold": 4.0}}"#)
                .unwrap();
        assert!(!config.use_inverted_index);
        assert_eq!(config.encoding_mode(), EncodingMode::FormatAggregation);
        assert_eq!(config.anchors.threshold, 4.0);
        assert_eq!(config.anchors.row_diversity, 2.0);
        assert_eq!(config.max_tokens, 4000);
    }

    #[test]
    fn test_builder_methods() {
        let config = CompressionConfig::new()
            .with_modules(false, false, false)
            .with_max_tokens(100)
            .with_anchor_proximity(1);
        assert_eq!(config.encoding_mode(), EncodingMode::Plain);
        assert_eq!(config.max_tokens, 100);
        assert_eq!(config.anchor_proximity, 1);
    }
}
