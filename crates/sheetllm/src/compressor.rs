//! Grid compression facade

use crate::anchors::extract_anchors;
use crate::config::CompressionConfig;
use crate::encoder::SheetEncoder;
use sheetllm_core::SheetMatrix;
use tracing::debug;

/// Applies the grid-reducing steps of a configuration
///
/// Only anchor extraction changes the grid; the value and format encoders
/// act at encoding time through [`SheetCompressor::encoder`].
#[derive(Debug, Clone, Default)]
pub struct SheetCompressor {
    config: CompressionConfig,
}

impl SheetCompressor {
    pub fn new(config: CompressionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompressionConfig {
        &self.config
    }

    /// Reduce a grid; returns an unchanged copy when anchors are disabled
    pub fn compress(&self, grid: &SheetMatrix) -> SheetMatrix {
        if !self.config.use_structural_anchors {
            return grid.clone();
        }
        let reduced = extract_anchors(grid, self.config.anchor_proximity, &self.config.anchors);
        debug!(
            sheet = grid.name(),
            before = grid.populated_count(),
            after = reduced.populated_count(),
            "anchor extraction"
        );
        reduced
    }

    /// An encoder for this configuration with the default estimator
    pub fn encoder(&self) -> SheetEncoder<'_> {
        SheetEncoder::new(&self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetllm_core::CellValue;

    fn striped(rows: u32) -> SheetMatrix {
        let data: Vec<Vec<CellValue>> = (1..=rows)
            .map(|r| match r {
                1..=3 => vec![CellValue::text(format!("H{r}")), CellValue::text(format!("K{r}"))],
                _ => vec![CellValue::text("-"), CellValue::text("-")],
            })
            .collect();
        SheetMatrix::from_rows("Striped", data)
    }

    #[test]
    fn test_anchors_toggle() {
        let grid = striped(40);

        let off = SheetCompressor::new(CompressionConfig::new().with_modules(false, true, true));
        assert_eq!(off.compress(&grid), grid);

        let on = SheetCompressor::new(CompressionConfig::new().with_anchor_proximity(1));
        let reduced = on.compress(&grid);
        assert!(reduced.populated_count() < grid.populated_count());
        assert!(reduced.get(40, 1).unwrap().is_some());
        assert!(reduced.get(20, 1).unwrap().is_none());
    }
}
