//! Prelude module - common imports for sheetllm users
//!
//! ```rust
//! use sheetllm::prelude::*;
//! ```

pub use crate::{
    // Grid types
    CellAddress,
    CellFormat,
    CellRange,
    CellValue,
    DataType,
    SheetMatrix,
    // Configuration
    CompressionConfig,
    // Pipeline
    compress_with_best_method,
    CompressionOutcome,
    EncodedSheet,
    SheetCompressor,
    SheetEncoder,
    Strategy,
    // Tokens
    CharRatioEstimator,
    TokenEstimator,
    // Metadata
    MetadataStore,
    SheetMetadata,
    // Errors
    CompressError,
    CompressResult,
};
