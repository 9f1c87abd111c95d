//! Greedy rectangle detection over a set of addresses
//!
//! Coordinates are visited in row-major order; each unclaimed one is tried
//! as a top-left corner. The corner's row is extended right while cells are
//! present and unclaimed, then whole rows of that width are added below.
//! Rectangles narrower or shorter than two cells are rejected and their
//! cells left for range compression. The cover is single-pass and not
//! minimal.

use crate::ranges::compress_addresses;
use ahash::AHashSet;
use sheetllm_core::{CellAddress, CellRange};

/// Groups with more members than this try rectangle detection first
pub const RECTANGLE_MIN_GROUP: usize = 5;

/// Result of a rectangle pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RectangleCover {
    /// Rectangles found, in discovery order
    pub rectangles: Vec<CellRange>,
    /// Addresses not covered by any rectangle, row-major
    pub leftovers: Vec<CellAddress>,
}

/// Find rectangles of at least 2x2 cells
pub fn detect_rectangles(addresses: &[CellAddress]) -> RectangleCover {
    let present: AHashSet<CellAddress> = addresses.iter().copied().collect();
    let mut sorted: Vec<CellAddress> = present.iter().copied().collect();
    sorted.sort();

    let mut claimed: AHashSet<CellAddress> = AHashSet::with_capacity(sorted.len());
    let mut rectangles = Vec::new();
    let free = |addr: &CellAddress, claimed: &AHashSet<CellAddress>| {
        present.contains(addr) && !claimed.contains(addr)
    };

    for &corner in &sorted {
        if claimed.contains(&corner) {
            continue;
        }

        let mut width = 1;
        while free(&CellAddress::new(corner.row, corner.col + width), &claimed) {
            width += 1;
        }
        if width < 2 {
            continue;
        }

        let mut height = 1;
        while (0..width).all(|dc| {
            free(
                &CellAddress::new(corner.row + height, corner.col + dc),
                &claimed,
            )
        }) {
            height += 1;
        }
        if height < 2 {
            continue;
        }

        let rect = CellRange::from_bounds(
            corner.row,
            corner.col,
            corner.row + height - 1,
            corner.col + width - 1,
        );
        claimed.extend(rect.cells());
        rectangles.push(rect);
    }

    let leftovers = sorted
        .into_iter()
        .filter(|addr| !claimed.contains(addr))
        .collect();

    RectangleCover {
        rectangles,
        leftovers,
    }
}

/// Compress a group of addresses into rectangle and run ranges
///
/// Groups larger than [`RECTANGLE_MIN_GROUP`] use rectangles when any are
/// found, with the remaining cells range-compressed and appended. Smaller
/// groups, and groups without rectangles, are range-compressed directly.
pub fn compress_group(addresses: &[CellAddress]) -> Vec<String> {
    if addresses.len() > RECTANGLE_MIN_GROUP {
        let cover = detect_rectangles(addresses);
        if !cover.rectangles.is_empty() {
            let mut out: Vec<String> = cover.rectangles.iter().map(|r| r.to_a1_string()).collect();
            out.extend(compress_addresses(&cover.leftovers));
            return out;
        }
    }
    compress_addresses(addresses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn block(rows: std::ops::RangeInclusive<u32>, cols: std::ops::RangeInclusive<u32>) -> Vec<CellAddress> {
        rows.flat_map(|r| cols.clone().map(move |c| CellAddress::new(r, c)))
            .collect()
    }

    #[test]
    fn test_full_block_is_one_rectangle() {
        let cover = detect_rectangles(&block(2..=5, 2..=5));
        assert_eq!(cover.rectangles, vec![CellRange::from_bounds(2, 2, 5, 5)]);
        assert!(cover.leftovers.is_empty());
        assert_eq!(compress_group(&block(2..=5, 2..=5)), vec!["B2:E5"]);
    }

    #[test]
    fn test_single_row_has_no_rectangle() {
        let cover = detect_rectangles(&block(1..=1, 1..=8));
        assert!(cover.rectangles.is_empty());
        assert_eq!(cover.leftovers.len(), 8);
        assert_eq!(compress_group(&block(1..=1, 1..=8)), vec!["A1:H1"]);
    }

    #[test]
    fn test_leftovers_are_appended() {
        // 3x3 block plus a stray cell and a short tail
        let mut cells = block(1..=3, 1..=3);
        cells.push(CellAddress::new(5, 1));
        cells.push(CellAddress::new(1, 5));
        assert_eq!(compress_group(&cells), vec!["A1:C3", "A5", "E1"]);
    }

    #[test]
    fn test_greedy_width_then_height() {
        // Row 1 is wider than rows 2-3: the corner takes the full row width,
        // fails the height check, and the block below is found from A2
        let mut cells = block(1..=1, 1..=4);
        cells.extend(block(2..=3, 1..=2));
        let cover = detect_rectangles(&cells);
        assert_eq!(cover.rectangles, vec![CellRange::from_bounds(2, 1, 3, 2)]);
        assert_eq!(cover.leftovers.len(), 4);
    }

    #[test]
    fn test_small_group_skips_rectangles() {
        let cells = block(1..=2, 1..=2);
        assert_eq!(compress_group(&cells), vec!["A1", "A2", "B1", "B2"]);
    }

    proptest! {
        #[test]
        fn prop_rectangles_are_valid_and_disjoint(
            raw in proptest::collection::vec((1u32..12, 1u32..12), 0..80)
        ) {
            let cells: Vec<CellAddress> = raw.iter().map(|&(r, c)| CellAddress::new(r, c)).collect();
            let input: AHashSet<CellAddress> = cells.iter().copied().collect();
            let cover = detect_rectangles(&cells);

            let mut seen: AHashSet<CellAddress> = AHashSet::new();
            for rect in &cover.rectangles {
                prop_assert!(rect.row_count() >= 2);
                prop_assert!(rect.col_count() >= 2);
                for addr in rect.cells() {
                    prop_assert!(input.contains(&addr));
                    prop_assert!(seen.insert(addr));
                }
            }
            for addr in &cover.leftovers {
                prop_assert!(input.contains(addr));
                prop_assert!(seen.insert(*addr));
            }
            prop_assert_eq!(seen.len(), input.len());
        }
    }
}
