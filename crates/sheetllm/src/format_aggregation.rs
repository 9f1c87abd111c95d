//! Format-aggregation encoding
//!
//! Populated cells are grouped twice: by canonical [`CellFormat`] string and
//! by number-format signature. Each group is compressed into rectangles and
//! ranges and emitted under a `FMT:` or `NFS:` key.
//!
//! [`CellFormat`]: sheetllm_core::CellFormat

use crate::error::CompressResult;
use crate::number_format::detect_number_format;
use crate::ranges::AddressGroups;
use crate::rectangles::compress_group;
use serde_json::{Map, Value};
use sheetllm_core::SheetMatrix;
use tracing::debug;

/// Key prefix of format groups
pub const FORMAT_KEY_PREFIX: &str = "FMT:";
/// Key prefix of number-format groups
pub const NUMBER_FORMAT_KEY_PREFIX: &str = "NFS:";

/// Format and number-format groups of a grid
#[derive(Debug, Clone, Default)]
pub struct FormatGroups {
    pub formats: AddressGroups<String>,
    pub number_formats: AddressGroups<String>,
}

impl FormatGroups {
    /// Group the populated cells of `grid`
    ///
    /// Unformatted cells join no format group; cells without a recognizable
    /// numeric shape join no number-format group.
    pub fn build(grid: &SheetMatrix) -> Self {
        let mut groups = FormatGroups::default();
        for cell in grid.populated() {
            let canonical = cell.format.canonical();
            if !canonical.is_empty() {
                groups.formats.push(canonical, cell.address);
            }
            if let Some(signature) = detect_number_format(&cell.value) {
                groups.number_formats.push(signature, cell.address);
            }
        }
        groups
    }

    /// Render as a JSON object, format groups first
    pub fn to_json(&self) -> Map<String, Value> {
        let mut out = Map::new();
        let tagged = self
            .formats
            .iter()
            .map(|(key, addrs)| (FORMAT_KEY_PREFIX, key, addrs))
            .chain(
                self.number_formats
                    .iter()
                    .map(|(key, addrs)| (NUMBER_FORMAT_KEY_PREFIX, key, addrs)),
            );
        for (prefix, key, addresses) in tagged {
            let ranges = compress_group(addresses)
                .into_iter()
                .map(Value::String)
                .collect();
            out.insert(format!("{}{}", prefix, key), Value::Array(ranges));
        }
        out
    }
}

/// Encode a grid as minimal-whitespace format-aggregation JSON
pub fn encode_format_aggregation(grid: &SheetMatrix) -> CompressResult<String> {
    let groups = FormatGroups::build(grid);
    debug!(
        sheet = grid.name(),
        format_groups = groups.formats.len(),
        number_format_groups = groups.number_formats.len(),
        "built format aggregation"
    );
    Ok(serde_json::to_string(&groups.to_json())?)
}
