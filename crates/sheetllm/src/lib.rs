//! # sheetllm
//!
//! Token-budgeted, lossy compression of spreadsheet grids into compact text
//! for language models.
//!
//! ## Pipeline
//!
//! - **Anchor extraction** keeps only rows/columns near structurally
//!   significant ones (headers, boundaries, formatting changes)
//! - **Inverted index** maps each value to the address ranges holding it
//! - **Format aggregation** maps each format and number-format signature to
//!   rectangles and ranges of cells
//! - **Chunking** splits an over-budget grid into header-preserving row
//!   chunks
//! - **Strategy selection** tries several module combinations and keeps the
//!   one with the lowest token ratio
//!
//! ## Example
//!
//! ```rust
//! use sheetllm::prelude::*;
//!
//! let grid = SheetMatrix::from_rows(
//!     "Nums",
//!     vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]],
//! );
//!
//! let config = CompressionConfig::new();
//! let encoded = SheetEncoder::new(&config).encode(&grid).unwrap();
//! assert!(encoded.text.starts_with("# Sheet: Nums\nDimensions: 3x3"));
//!
//! let outcome =
//!     compress_with_best_method(&grid, &config, &CharRatioEstimator::default()).unwrap();
//! println!("{} ({:?})", outcome.method, outcome.ratio);
//! ```

pub mod anchors;
pub mod chunking;
pub mod compressor;
pub mod config;
pub mod encoder;
pub mod error;
pub mod format_aggregation;
pub mod inverted_index;
pub mod metadata;
pub mod number_format;
pub mod output;
pub mod prelude;
pub mod ranges;
pub mod rectangles;
pub mod strategy;
pub mod tokens;

pub use anchors::{extract_anchors, AnchorSelection};
pub use chunking::{detect_header_rows, encode_chunked, ChunkPlan};
pub use compressor::SheetCompressor;
pub use config::{AnchorWeights, ChunkingOptions, CompressionConfig, EncodingMode, StrategyOptions};
pub use encoder::{sheet_header, EncodedSheet, SheetEncoder};
pub use error::{CompressError, CompressResult};
pub use format_aggregation::encode_format_aggregation;
pub use inverted_index::encode_inverted_index;
pub use metadata::{MetadataStore, SheetMetadata, StoreEntry};
pub use number_format::detect_number_format;
pub use output::{compress_to_file, write_outcome, CompressedFile, CompressionStats};
pub use ranges::compress_addresses;
pub use rectangles::detect_rectangles;
pub use strategy::{compress_with_best_method, compress_workbook, CompressionOutcome, Strategy};
pub use tokens::{CharRatioEstimator, PieceEstimator, TokenEstimator};

// Re-export core types
pub use sheetllm_core::{
    format_address, parse_address, BorderSide, Cell, CellAddress, CellFormat, CellRange,
    CellValue, DataType, FormatFlag, SheetMatrix, SheetMatrixBuilder,
};

// Re-export CSV input
#[cfg(feature = "csv")]
pub use sheetllm_csv::{CsvError, CsvReadOptions, CsvReader};

/// Read a CSV file into a grid named after the file stem
#[cfg(feature = "csv")]
pub fn open_csv<P: AsRef<std::path::Path>>(path: P, options: &CsvReadOptions) -> CompressResult<SheetMatrix> {
    Ok(CsvReader::read_file(path, options)?)
}
