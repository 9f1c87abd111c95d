//! Structural-anchor extraction
//!
//! Rows and columns are scored for heterogeneity (value diversity plus
//! border, color and emphasis bonuses; columns also reward non-numeric
//! content). High scorers are anchors; the first and last row/column always
//! are. Anchors are widened by `k` neighbours on each side and every other
//! row/column is blanked.

use crate::config::AnchorWeights;
use ahash::AHashSet;
use sheetllm_core::{Cell, SheetMatrix};
use std::collections::BTreeSet;
use tracing::debug;

/// Retained rows and columns after anchor selection and expansion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnchorSelection {
    pub rows: BTreeSet<u32>,
    pub cols: BTreeSet<u32>,
}

/// Per-row or per-column observations feeding the score
#[derive(Debug, Default)]
struct LineProfile {
    distinct_values: usize,
    populated: usize,
    non_numeric: usize,
    bordered: bool,
    colored: bool,
    emphasized: bool,
}

impl LineProfile {
    fn collect<'a, I: Iterator<Item = &'a Cell>>(cells: I) -> Self {
        let mut profile = LineProfile::default();
        let mut seen = AHashSet::new();
        for cell in cells {
            profile.populated += 1;
            seen.insert(cell.value.to_string());
            if !cell.data_type.is_numeric() {
                profile.non_numeric += 1;
            }
            profile.bordered |= cell.format.is_bordered();
            profile.colored |= cell.format.has_color();
            profile.emphasized |= cell.format.has_emphasis();
        }
        profile.distinct_values = seen.len();
        profile
    }

    fn format_bonus(&self, weights: &AnchorWeights) -> f64 {
        let mut bonus = 0.0;
        if self.bordered {
            bonus += weights.border;
        }
        if self.colored {
            bonus += weights.color;
        }
        if self.emphasized {
            bonus += weights.emphasis;
        }
        bonus
    }

    fn non_numeric_ratio(&self) -> f64 {
        if self.populated == 0 {
            0.0
        } else {
            self.non_numeric as f64 / self.populated as f64
        }
    }
}

/// Heterogeneity score of one row
pub fn row_score(grid: &SheetMatrix, row: u32, weights: &AnchorWeights) -> f64 {
    let profile = LineProfile::collect(grid.row_cells(row));
    profile.distinct_values as f64 * weights.row_diversity + profile.format_bonus(weights)
}

/// Heterogeneity score of one column
pub fn col_score(grid: &SheetMatrix, col: u32, weights: &AnchorWeights) -> f64 {
    let profile = LineProfile::collect(grid.col_cells(col));
    profile.distinct_values as f64 * weights.col_diversity
        + profile.non_numeric_ratio() * weights.non_numeric
        + profile.format_bonus(weights)
}

/// Anchor rows of a grid (before proximity expansion)
pub fn find_anchor_rows(grid: &SheetMatrix, weights: &AnchorWeights) -> BTreeSet<u32> {
    let scores: Vec<f64> = (1..=grid.max_row())
        .map(|row| row_score(grid, row, weights))
        .collect();
    select_axis(&scores, weights)
}

/// Anchor columns of a grid (before proximity expansion)
pub fn find_anchor_cols(grid: &SheetMatrix, weights: &AnchorWeights) -> BTreeSet<u32> {
    let scores: Vec<f64> = (1..=grid.max_col())
        .map(|col| col_score(grid, col, weights))
        .collect();
    select_axis(&scores, weights)
}

/// Pick anchors from 1-based scores (`scores[0]` is index 1)
fn select_axis(scores: &[f64], weights: &AnchorWeights) -> BTreeSet<u32> {
    let len = scores.len() as u32;
    let indexed = || (1..=len).zip(scores.iter().copied());

    let mut anchors: BTreeSet<u32> = indexed()
        .filter(|&(_, score)| score >= weights.threshold)
        .map(|(idx, _)| idx)
        .collect();

    if len > 0 {
        anchors.insert(1);
        anchors.insert(len);
    }

    if anchors.len() < weights.min_anchors && len > weights.secondary_scan_min_len {
        anchors.extend(
            indexed()
                .filter(|&(_, score)| score >= weights.secondary_threshold)
                .map(|(idx, _)| idx),
        );
    }

    anchors
}

/// Widen anchors by up to `k` indices on each side, clipped to `1..=max_index`
pub fn expand_anchors(anchors: &BTreeSet<u32>, max_index: u32, k: u32) -> BTreeSet<u32> {
    let mut expanded = BTreeSet::new();
    for &anchor in anchors {
        let lo = anchor.saturating_sub(k).max(1);
        let hi = anchor.saturating_add(k).min(max_index);
        expanded.extend(lo..=hi);
    }
    expanded
}

/// Select and expand anchors on both axes
pub fn select_anchors(grid: &SheetMatrix, proximity: u32, weights: &AnchorWeights) -> AnchorSelection {
    let anchor_rows = find_anchor_rows(grid, weights);
    let anchor_cols = find_anchor_cols(grid, weights);
    let rows = expand_anchors(&anchor_rows, grid.max_row(), proximity);
    let cols = expand_anchors(&anchor_cols, grid.max_col(), proximity);

    debug!(
        sheet = grid.name(),
        anchor_rows = anchor_rows.len(),
        anchor_cols = anchor_cols.len(),
        kept_rows = rows.len(),
        kept_cols = cols.len(),
        "selected structural anchors"
    );

    AnchorSelection { rows, cols }
}

/// Prune a grid to its structural anchors
///
/// The result has the same dimensions; positions outside the retained rows
/// and columns are absent. A merged range survives only if one of its row
/// endpoints and one of its column endpoints are retained; others are
/// dropped, not clipped.
pub fn extract_anchors(grid: &SheetMatrix, proximity: u32, weights: &AnchorWeights) -> SheetMatrix {
    let selection = select_anchors(grid, proximity, weights);
    apply_selection(grid, &selection)
}

/// Build the reduced grid for a selection
pub fn apply_selection(grid: &SheetMatrix, selection: &AnchorSelection) -> SheetMatrix {
    let AnchorSelection { rows, cols } = selection;

    let merged = grid
        .merged_ranges()
        .iter()
        .filter(|range| {
            let (min_row, min_col, max_row, max_col) = range.bounds();
            (rows.contains(&min_row) || rows.contains(&max_row))
                && (cols.contains(&min_col) || cols.contains(&max_col))
        })
        .copied()
        .collect();

    grid.retain(|row, col| rows.contains(&row) && cols.contains(&col), merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sheetllm_core::{CellFormat, CellRange, CellValue};

    fn numbers_3x3() -> SheetMatrix {
        SheetMatrix::from_rows("Nums", vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]])
    }

    /// Three distinct header rows, then rows repeating one value
    fn tall_uniform(rows: u32) -> SheetMatrix {
        let data: Vec<Vec<CellValue>> = (1..=rows)
            .map(|r| {
                if r <= 3 {
                    vec![
                        CellValue::text(format!("Item{r}")),
                        CellValue::text(format!("Qty{r}")),
                    ]
                } else {
                    vec![CellValue::text("x"), CellValue::text("x")]
                }
            })
            .collect();
        SheetMatrix::from_rows("Tall", data)
    }

    #[test]
    fn test_row_score_weights() {
        let weights = AnchorWeights::default();
        let mut builder = SheetMatrix::builder("S", 1, 3);
        builder
            .set_cell(1, 1, "A".into(), CellFormat::new().bold().all_borders())
            .unwrap();
        builder
            .set_cell(1, 2, "B".into(), CellFormat::new().fill_color("FFFFFF00"))
            .unwrap();
        builder.set_value(1, 3, "A").unwrap();
        let grid = builder.build();

        // 2 distinct * 2.0 + border 1.5 + color 1.0 + emphasis 1.0
        assert_eq!(row_score(&grid, 1, &weights), 7.5);
    }

    #[test]
    fn test_col_score_includes_non_numeric_ratio() {
        let weights = AnchorWeights::default();
        let grid = SheetMatrix::from_rows(
            "S",
            vec![
                vec![CellValue::text("Qty")],
                vec![CellValue::Integer(1)],
                vec![CellValue::Integer(1)],
                vec![CellValue::Integer(2)],
            ],
        );
        // 3 distinct * 1.5 + 1/4 * 3.0
        assert_eq!(col_score(&grid, 1, &weights), 5.25);
    }

    #[test]
    fn test_boundaries_always_anchor() {
        let weights = AnchorWeights::default();
        let grid = tall_uniform(30);
        let rows = find_anchor_rows(&grid, &weights);
        assert!(rows.contains(&1));
        assert!(rows.contains(&30));

        let reduced = extract_anchors(&grid, 0, &weights);
        assert!(reduced.get(1, 1).unwrap().is_some());
        assert!(reduced.get(30, 2).unwrap().is_some());
        assert!(reduced.get(15, 1).unwrap().is_none());
        assert_eq!((reduced.max_row(), reduced.max_col()), (30, 2));
    }

    #[test]
    fn test_secondary_threshold_scan() {
        // Middle rows score 2.0 (one distinct value): below the primary
        // threshold but enough for the secondary scan on a long axis
        let weights = AnchorWeights::default();
        let grid = SheetMatrix::from_rows(
            "S",
            (0..8).map(|_| vec![CellValue::text("same")]).collect::<Vec<_>>(),
        );
        let rows = find_anchor_rows(&grid, &weights);
        assert_eq!(rows.len(), 8);

        // Short axes skip the secondary scan
        let short = SheetMatrix::from_rows(
            "S",
            (0..5).map(|_| vec![CellValue::text("same")]).collect::<Vec<_>>(),
        );
        assert_eq!(
            find_anchor_rows(&short, &weights),
            BTreeSet::from([1, 5])
        );
    }

    #[test]
    fn test_expand_clips_to_bounds() {
        let anchors = BTreeSet::from([1, 10]);
        assert_eq!(
            expand_anchors(&anchors, 10, 2),
            BTreeSet::from([1, 2, 3, 8, 9, 10])
        );
        assert_eq!(expand_anchors(&anchors, 10, 0), anchors);
    }

    #[test]
    fn test_small_grid_is_fully_retained() {
        let weights = AnchorWeights::default();
        let grid = numbers_3x3();
        let reduced = extract_anchors(&grid, 1, &weights);
        assert_eq!(reduced, grid);
    }

    #[test]
    fn test_merged_ranges_need_retained_endpoints() {
        let weights = AnchorWeights::default();
        let base = tall_uniform(30);
        let mut builder = SheetMatrix::builder("Tall", 30, 2);
        for cell in base.populated() {
            builder
                .set_value(cell.address.row, cell.address.col, cell.value.clone())
                .unwrap();
        }
        builder.merge(CellRange::from_bounds(1, 1, 1, 2)).unwrap();
        builder.merge(CellRange::from_bounds(14, 1, 16, 2)).unwrap();
        let grid = builder.build();

        let reduced = extract_anchors(&grid, 0, &weights);
        assert_eq!(
            reduced.merged_ranges(),
            &[CellRange::from_bounds(1, 1, 1, 2)]
        );
    }
}
