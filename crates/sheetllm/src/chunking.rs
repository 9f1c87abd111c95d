//! Header-preserving row chunking
//!
//! Used when a direct encoding is over budget. Header rows are detected in
//! the first rows of the sheet; the remaining rows are split sequentially
//! into chunks, and every chunk is encoded as a sub-grid holding the header
//! rows plus its own rows. Merged ranges are carried into every chunk
//! unmodified, even when they reference rows the chunk does not hold.
//!
//! Each chunk is encoded without its own budget check, so a single chunk
//! may still be larger than its share of the budget.

use crate::config::ChunkingOptions;
use crate::encoder::{sheet_header, EncodedSheet, SheetEncoder};
use crate::error::CompressResult;
use sheetllm_core::{FormatFlag, SheetMatrix};
use std::collections::BTreeSet;
use tracing::debug;

/// Detect header rows
///
/// Row 1 is always a header. Other rows within the scan depth are headers
/// when they hold a bold or bordered cell and at least half of their
/// populated cells are text.
pub fn detect_header_rows(grid: &SheetMatrix, options: &ChunkingOptions) -> BTreeSet<u32> {
    let mut headers = BTreeSet::new();
    if grid.max_row() == 0 {
        return headers;
    }
    headers.insert(1);

    for row in 1..=options.header_scan_rows.min(grid.max_row()) {
        let mut populated = 0usize;
        let mut text = 0usize;
        let mut marked = false;
        for cell in grid.row_cells(row) {
            populated += 1;
            if cell.data_type.is_text() {
                text += 1;
            }
            marked |= cell.format.has_flag(FormatFlag::Bold)
                || cell.format.is_bordered();
        }
        if marked && text * 2 >= populated {
            headers.insert(row);
        }
    }

    headers
}

/// Rows per chunk for a token budget
pub fn rows_per_chunk(budget: usize, options: &ChunkingOptions) -> usize {
    let per_row = options.tokens_per_row.max(1);
    let min = options.min_rows_per_chunk.max(1);
    (budget / per_row).clamp(min, options.max_rows_per_chunk.max(min))
}

/// How a grid is split into chunks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkPlan {
    /// Rows repeated in every chunk
    pub header_rows: BTreeSet<u32>,
    /// Non-header rows of each chunk, ascending
    pub chunks: Vec<Vec<u32>>,
}

impl ChunkPlan {
    /// Plan the chunks of `grid` for a token budget
    ///
    /// There is always at least one chunk; a grid made only of header rows
    /// yields a single chunk without data rows.
    pub fn new(grid: &SheetMatrix, budget: usize, options: &ChunkingOptions) -> Self {
        let header_rows = detect_header_rows(grid, options);
        let data_rows: Vec<u32> = (1..=grid.max_row())
            .filter(|row| !header_rows.contains(row))
            .collect();

        let size = rows_per_chunk(budget, options);
        let mut chunks: Vec<Vec<u32>> = data_rows.chunks(size).map(<[u32]>::to_vec).collect();
        if chunks.is_empty() {
            chunks.push(Vec::new());
        }

        Self {
            header_rows,
            chunks,
        }
    }

    /// Number of chunks
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Always false; a plan has at least one chunk
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// First and last row covered by chunk `index`
    ///
    /// A chunk without data rows reports the span of the header rows.
    pub fn row_span(&self, index: usize) -> (u32, u32) {
        let rows = self.chunks.get(index).filter(|rows| !rows.is_empty());
        match rows {
            Some(rows) => (rows[0], rows[rows.len() - 1]),
            None => (
                self.header_rows.first().copied().unwrap_or(0),
                self.header_rows.last().copied().unwrap_or(0),
            ),
        }
    }

    /// Sub-grid for chunk `index`: header rows plus the chunk's rows
    pub fn sub_grid(&self, grid: &SheetMatrix, index: usize) -> SheetMatrix {
        let rows: BTreeSet<u32> = self
            .header_rows
            .iter()
            .copied()
            .chain(self.chunks.get(index).into_iter().flatten().copied())
            .collect();
        grid.retain(
            |row, _| rows.contains(&row),
            grid.merged_ranges().to_vec(),
        )
    }
}

/// Encode a grid as labelled, header-preserving chunks
///
/// The document keeps the sheet header of the whole grid; each chunk is
/// introduced by `Chunk i/n (rows a-b)` and chunks are joined by the
/// configured separator. An encoding failure in any chunk fails the call.
pub fn encode_chunked(grid: &SheetMatrix, encoder: &SheetEncoder<'_>) -> CompressResult<EncodedSheet> {
    let config = encoder.config();
    let plan = ChunkPlan::new(grid, config.max_tokens, &config.chunking);
    let total = plan.len();

    debug!(
        sheet = grid.name(),
        header_rows = plan.header_rows.len(),
        chunks = total,
        "planned chunks"
    );

    let mut parts = Vec::with_capacity(total);
    for index in 0..total {
        let sub = plan.sub_grid(grid, index);
        let (first, last) = plan.row_span(index);
        let body = encoder.encode_body(&sub)?;
        parts.push(format!(
            "Chunk {}/{} (rows {}-{})\n{}",
            index + 1,
            total,
            first,
            last,
            body
        ));
    }

    let text = format!(
        "{}\n\n{}",
        sheet_header(grid),
        parts.join(&config.chunking.separator)
    );
    let tokens = encoder.estimate(&text);

    Ok(EncodedSheet {
        text,
        tokens,
        chunks: Some(total),
    })
}
