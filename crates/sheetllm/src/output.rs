//! Compressed output files and statistics

use crate::compressor::SheetCompressor;
use crate::config::CompressionConfig;
use crate::error::CompressResult;
use crate::metadata::SheetMetadata;
use crate::strategy::CompressionOutcome;
use crate::tokens::TokenEstimator;
use serde::{Deserialize, Serialize};
use sheetllm_core::SheetMatrix;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Contents of a `<prefix>_compressed.json` file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressedFile {
    pub metadata: SheetMetadata,
    /// How the text was produced, e.g. `anchors+inverted_index` or `combined`
    pub method: String,
    pub encoded: String,
}

/// Statistics of one compressed sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressionStats {
    pub sheet: String,
    pub original_rows: u32,
    pub original_cols: u32,
    pub original_cell_count: usize,
    pub compressed_cell_count: usize,
    /// Compressed over original populated cells
    pub cell_ratio: f64,
    pub token_count: usize,
    pub chunks: Option<usize>,
    pub output_file: PathBuf,
}

/// Path of the compressed file for a prefix
pub fn compressed_path<P: AsRef<Path>>(output_dir: P, prefix: &str) -> PathBuf {
    output_dir.as_ref().join(format!("{}_compressed.json", prefix))
}

/// Module list of a configuration, `+`-joined
pub fn method_label(config: &CompressionConfig) -> String {
    let modules: Vec<&str> = [
        (config.use_structural_anchors, "anchors"),
        (config.use_inverted_index, "inverted_index"),
        (config.use_format_aggregation, "format_aggregation"),
    ]
    .into_iter()
    .filter_map(|(on, name)| on.then_some(name))
    .collect();

    if modules.is_empty() {
        "plain".to_string()
    } else {
        modules.join("+")
    }
}

/// Write a compressed file, creating the directory if needed
pub fn write_compressed_file<P: AsRef<Path>>(
    output_dir: P,
    prefix: &str,
    file: &CompressedFile,
) -> CompressResult<PathBuf> {
    fs::create_dir_all(output_dir.as_ref())?;
    let path = compressed_path(output_dir, prefix);
    fs::write(&path, serde_json::to_string_pretty(file)?)?;
    Ok(path)
}

/// Compress one sheet with a fixed configuration and write it to disk
///
/// The grid is reduced, encoded with chunk fallback and saved as
/// `<output_dir>/<prefix>_compressed.json`.
pub fn compress_to_file<P: AsRef<Path>>(
    grid: &SheetMatrix,
    output_dir: P,
    prefix: &str,
    config: &CompressionConfig,
    estimator: &dyn TokenEstimator,
) -> CompressResult<CompressionStats> {
    let compressor = SheetCompressor::new(config.clone());
    let reduced = compressor.compress(grid);
    let encoded = compressor
        .encoder()
        .with_estimator(estimator)
        .encode_with_fallback(&reduced)?;

    let file = CompressedFile {
        metadata: SheetMetadata::compute(grid),
        method: method_label(config),
        encoded: encoded.text,
    };
    let output_file = write_compressed_file(output_dir, prefix, &file)?;

    let original_cell_count = grid.populated_count();
    let compressed_cell_count = reduced.populated_count();
    let cell_ratio = if original_cell_count == 0 {
        1.0
    } else {
        compressed_cell_count as f64 / original_cell_count as f64
    };

    info!(
        sheet = grid.name(),
        tokens = encoded.tokens,
        path = %output_file.display(),
        "wrote compressed sheet"
    );

    Ok(CompressionStats {
        sheet: grid.name().to_string(),
        original_rows: grid.max_row(),
        original_cols: grid.max_col(),
        original_cell_count,
        compressed_cell_count,
        cell_ratio,
        token_count: encoded.tokens,
        chunks: encoded.chunks,
        output_file,
    })
}

/// Write the outcome of a strategy search
pub fn write_outcome<P: AsRef<Path>>(
    output_dir: P,
    prefix: &str,
    outcome: &CompressionOutcome,
) -> CompressResult<PathBuf> {
    let file = CompressedFile {
        metadata: outcome.metadata.clone(),
        method: outcome.method.to_string(),
        encoded: outcome.encoded.text.clone(),
    };
    write_compressed_file(output_dir, prefix, &file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::CharRatioEstimator;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_method_label() {
        assert_eq!(method_label(&CompressionConfig::new()), "anchors+inverted_index+format_aggregation");
        assert_eq!(
            method_label(&CompressionConfig::new().with_modules(false, false, true)),
            "format_aggregation"
        );
        assert_eq!(
            method_label(&CompressionConfig::new().with_modules(false, false, false)),
            "plain"
        );
    }

    #[test]
    fn test_compress_to_file() {
        let dir = TempDir::new().unwrap();
        let grid = SheetMatrix::from_rows("Nums", vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]]);
        let stats = compress_to_file(
            &grid,
            dir.path().join("out"),
            "book_Nums",
            &CompressionConfig::new(),
            &CharRatioEstimator::default(),
        )
        .unwrap();

        assert_eq!((stats.original_rows, stats.original_cols), (3, 3));
        assert_eq!(stats.original_cell_count, 9);
        assert_eq!(stats.compressed_cell_count, 9);
        assert_eq!(stats.cell_ratio, 1.0);
        assert_eq!(stats.chunks, None);
        assert_eq!(stats.output_file, dir.path().join("out/book_Nums_compressed.json"));

        let written: CompressedFile =
            serde_json::from_str(&fs::read_to_string(&stats.output_file).unwrap()).unwrap();
        assert_eq!(written.method, "anchors+inverted_index+format_aggregation");
        assert!(written.encoded.starts_with("# Sheet: Nums\nDimensions: 3x3\n\n"));
        assert_eq!(written.metadata.headers, vec!["1", "2", "3"]);
    }
}
