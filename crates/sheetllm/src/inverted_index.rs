//! Inverted-index value encoding
//!
//! Inverts the cell-to-value mapping into value-to-addresses. Values are
//! grouped under their type prefix so that, say, the number `1` and the text
//! `"1"` never share a group; the prefix is dropped on output.

use crate::error::CompressResult;
use crate::ranges::{compress_addresses, AddressGroups};
use serde_json::{Map, Value};
use sheetllm_core::{CellAddress, SheetMatrix};
use tracing::debug;

/// Key under which the count of absent positions is emitted
pub const EMPTY_CELLS_KEY: &str = "__empty_cells";

/// Grouping key: type prefix plus rendered value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValueKey {
    pub prefix: &'static str,
    pub value: String,
}

/// Value groups of a grid, before range compression
#[derive(Debug, Clone, Default)]
pub struct InvertedIndex {
    pub groups: AddressGroups<ValueKey>,
    pub empty_cells: usize,
}

impl InvertedIndex {
    /// Group every populated position of `grid` by typed value
    pub fn build(grid: &SheetMatrix) -> Self {
        let mut index = InvertedIndex::default();
        for row in 1..=grid.max_row() {
            for col in 1..=grid.max_col() {
                match grid.populated_at(row, col) {
                    Some(cell) => index.groups.push(
                        ValueKey {
                            prefix: cell.data_type.prefix(),
                            value: cell.value.to_string(),
                        },
                        CellAddress::new(row, col),
                    ),
                    None => index.empty_cells += 1,
                }
            }
        }
        index
    }

    /// Render as a JSON object of value to compressed ranges
    ///
    /// Groups whose values render identically once the prefix is stripped
    /// share one key, their addresses pooled before range compression. The
    /// empty-cell count is left out when a cell value already uses its key.
    pub fn to_json(&self) -> Map<String, Value> {
        let mut by_value: AddressGroups<&str> = AddressGroups::new();
        for (key, addresses) in self.groups.iter() {
            for &addr in addresses {
                by_value.push(key.value.as_str(), addr);
            }
        }

        let mut out = Map::new();
        for (value, addresses) in by_value.iter() {
            let ranges = compress_addresses(addresses)
                .into_iter()
                .map(Value::String)
                .collect();
            out.insert(value.to_string(), Value::Array(ranges));
        }
        if self.empty_cells > 0 && !out.contains_key(EMPTY_CELLS_KEY) {
            out.insert(EMPTY_CELLS_KEY.to_string(), Value::from(self.empty_cells));
        }
        out
    }
}

/// Encode a grid as minimal-whitespace inverted-index JSON
pub fn encode_inverted_index(grid: &SheetMatrix) -> CompressResult<String> {
    let index = InvertedIndex::build(grid);
    debug!(
        sheet = grid.name(),
        groups = index.groups.len(),
        empty_cells = index.empty_cells,
        "built inverted index"
    );
    Ok(serde_json::to_string(&index.to_json())?)
}
