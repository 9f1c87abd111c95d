//! The sheet grid
//!
//! [`SheetMatrix`] is a dense, 1-indexed grid of optional [`Cell`]s plus the
//! sheet's merged ranges. It is immutable once built: transformations such
//! as anchor extraction or chunking produce a new grid with the same
//! dimensions, blanking positions instead of renumbering them, so addresses
//! stay stable across every compression step.

use crate::cell::{Cell, CellAddress, CellRange, CellValue};
use crate::error::{Error, Result};
use crate::format::CellFormat;

/// An immutable grid of cells
#[derive(Debug, Clone, PartialEq)]
pub struct SheetMatrix {
    name: String,
    max_row: u32,
    max_col: u32,
    /// Row-major storage, `max_row * max_col` slots
    cells: Vec<Option<Cell>>,
    merged: Vec<CellRange>,
}

impl SheetMatrix {
    /// Start building a grid with the given dimensions
    pub fn builder<S: Into<String>>(name: S, max_row: u32, max_col: u32) -> SheetMatrixBuilder {
        SheetMatrixBuilder::new(name, max_row, max_col)
    }

    /// Build an unformatted grid from rows of values
    ///
    /// The column count is the length of the longest row; [`CellValue::Empty`]
    /// entries leave their position absent.
    pub fn from_rows<S, R, V>(name: S, rows: Vec<R>) -> Self
    where
        S: Into<String>,
        R: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        let rows: Vec<Vec<CellValue>> = rows
            .into_iter()
            .map(|r| r.into_iter().map(Into::into).collect())
            .collect();
        let max_row = rows.len() as u32;
        let max_col = rows.iter().map(Vec::len).max().unwrap_or(0) as u32;

        let mut builder = SheetMatrixBuilder::new(name, max_row, max_col);
        for (r, row) in rows.into_iter().enumerate() {
            for (c, value) in row.into_iter().enumerate() {
                if !value.is_empty() {
                    builder.put(r as u32 + 1, c as u32 + 1, value, CellFormat::default());
                }
            }
        }
        builder.build()
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of rows (the last 1-based row index)
    pub fn max_row(&self) -> u32 {
        self.max_row
    }

    /// Number of columns (the last 1-based column index)
    pub fn max_col(&self) -> u32 {
        self.max_col
    }

    /// Check if the grid has no positions at all
    pub fn is_empty(&self) -> bool {
        self.max_row == 0 || self.max_col == 0
    }

    /// Get the cell at a 1-based position
    ///
    /// Returns `Ok(None)` for an absent in-bounds position and an error for
    /// an out-of-bounds one.
    pub fn get(&self, row: u32, col: u32) -> Result<Option<&Cell>> {
        let idx = self.index(row, col)?;
        Ok(self.cells[idx].as_ref())
    }

    /// Get the cell at a 1-based position, treating out-of-bounds as absent
    pub fn cell_at(&self, row: u32, col: u32) -> Option<&Cell> {
        self.index(row, col)
            .ok()
            .and_then(|idx| self.cells[idx].as_ref())
    }

    /// Get the populated cell (non-empty value) at a position
    pub fn populated_at(&self, row: u32, col: u32) -> Option<&Cell> {
        self.cell_at(row, col).filter(|c| c.is_populated())
    }

    /// Iterate over every populated cell in row-major order
    pub fn populated(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.cells.iter().flatten().filter(|c| c.is_populated())
    }

    /// Iterate over populated cells of one row, left to right
    pub fn row_cells(&self, row: u32) -> impl Iterator<Item = &Cell> + '_ {
        (1..=self.max_col).filter_map(move |col| self.populated_at(row, col))
    }

    /// Iterate over populated cells of one column, top to bottom
    pub fn col_cells(&self, col: u32) -> impl Iterator<Item = &Cell> + '_ {
        (1..=self.max_row).filter_map(move |row| self.populated_at(row, col))
    }

    /// Iterate over stored cells of one row (populated or format-only)
    pub fn row_slots(&self, row: u32) -> impl Iterator<Item = &Cell> + '_ {
        (1..=self.max_col).filter_map(move |col| self.cell_at(row, col))
    }

    /// Count populated cells
    pub fn populated_count(&self) -> usize {
        self.populated().count()
    }

    /// Get merged regions
    pub fn merged_ranges(&self) -> &[CellRange] {
        &self.merged
    }

    /// Produce a new grid of the same dimensions keeping only positions for
    /// which `keep(row, col)` holds, with the given merged ranges
    pub fn retain<F>(&self, keep: F, merged: Vec<CellRange>) -> SheetMatrix
    where
        F: Fn(u32, u32) -> bool,
    {
        let mut cells = Vec::with_capacity(self.cells.len());
        for row in 1..=self.max_row {
            for col in 1..=self.max_col {
                let slot = if keep(row, col) {
                    self.cell_at(row, col).cloned()
                } else {
                    None
                };
                cells.push(slot);
            }
        }

        SheetMatrix {
            name: self.name.clone(),
            max_row: self.max_row,
            max_col: self.max_col,
            cells,
            merged,
        }
    }

    fn index(&self, row: u32, col: u32) -> Result<usize> {
        if row == 0 || row > self.max_row {
            return Err(Error::RowOutOfBounds(row, self.max_row));
        }
        if col == 0 || col > self.max_col {
            return Err(Error::ColumnOutOfBounds(col, self.max_col));
        }
        Ok((row as usize - 1) * self.max_col as usize + (col as usize - 1))
    }
}

/// Builder for [`SheetMatrix`]
#[derive(Debug)]
pub struct SheetMatrixBuilder {
    grid: SheetMatrix,
}

impl SheetMatrixBuilder {
    /// Create a builder for an all-absent grid
    pub fn new<S: Into<String>>(name: S, max_row: u32, max_col: u32) -> Self {
        let slots = max_row as usize * max_col as usize;
        Self {
            grid: SheetMatrix {
                name: name.into(),
                max_row,
                max_col,
                cells: vec![None; slots],
                merged: Vec::new(),
            },
        }
    }

    /// Set an unformatted value
    pub fn set_value<V: Into<CellValue>>(&mut self, row: u32, col: u32, value: V) -> Result<()> {
        self.set_cell(row, col, value.into(), CellFormat::default())
    }

    /// Set a value together with its format
    pub fn set_cell(
        &mut self,
        row: u32,
        col: u32,
        value: CellValue,
        format: CellFormat,
    ) -> Result<()> {
        self.grid.index(row, col)?;
        self.put(row, col, value, format);
        Ok(())
    }

    /// Replace the format of a position, keeping its value
    pub fn set_format(&mut self, row: u32, col: u32, format: CellFormat) -> Result<()> {
        let idx = self.grid.index(row, col)?;
        let value = self.grid.cells[idx]
            .take()
            .map(|c| c.value)
            .unwrap_or_default();
        self.put(row, col, value, format);
        Ok(())
    }

    /// Record a merged range
    pub fn merge(&mut self, range: CellRange) -> Result<()> {
        self.grid.index(range.start.row, range.start.col)?;
        self.grid.index(range.end.row, range.end.col)?;
        self.grid.merged.push(range);
        Ok(())
    }

    /// Finish building
    pub fn build(self) -> SheetMatrix {
        self.grid
    }

    fn put(&mut self, row: u32, col: u32, value: CellValue, format: CellFormat) {
        let idx = (row as usize - 1) * self.grid.max_col as usize + (col as usize - 1);
        self.grid.cells[idx] = Some(Cell::new(CellAddress::new(row, col), value, format));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DataType;

    fn sample() -> SheetMatrix {
        SheetMatrix::from_rows(
            "Data",
            vec![
                vec![CellValue::text("Name"), CellValue::text("Score")],
                vec![CellValue::text("Ann"), CellValue::Integer(90)],
                vec![CellValue::text("Bob"), CellValue::Empty],
            ],
        )
    }

    #[test]
    fn test_from_rows_dimensions() {
        let grid = sample();
        assert_eq!(grid.name(), "Data");
        assert_eq!((grid.max_row(), grid.max_col()), (3, 2));
        assert_eq!(grid.populated_count(), 5);
    }

    #[test]
    fn test_get_bounds() {
        let grid = sample();
        let cell = grid.get(2, 2).unwrap().unwrap();
        assert_eq!(cell.value, CellValue::Integer(90));
        assert_eq!(cell.data_type, DataType::IntNum);
        assert_eq!(cell.address.to_string(), "B2");

        assert!(grid.get(3, 2).unwrap().is_none());
        assert!(matches!(grid.get(4, 1), Err(Error::RowOutOfBounds(4, 3))));
        assert!(matches!(grid.get(1, 3), Err(Error::ColumnOutOfBounds(3, 2))));
        assert!(grid.get(0, 1).is_err());
    }

    #[test]
    fn test_builder_format_and_merge() {
        let mut builder = SheetMatrix::builder("S", 2, 3);
        builder
            .set_cell(1, 1, "Title".into(), CellFormat::new().bold())
            .unwrap();
        builder.set_format(2, 3, CellFormat::new().italic()).unwrap();
        builder.merge(CellRange::from_bounds(1, 1, 1, 3)).unwrap();
        assert!(builder.merge(CellRange::from_bounds(1, 1, 3, 3)).is_err());
        assert!(builder.set_value(3, 1, 1).is_err());

        let grid = builder.build();
        assert!(grid.cell_at(1, 1).unwrap().format.has_emphasis());
        // Format-only positions are stored but not populated
        assert!(grid.cell_at(2, 3).is_some());
        assert!(grid.populated_at(2, 3).is_none());
        assert_eq!(grid.merged_ranges().len(), 1);
    }

    #[test]
    fn test_retain_keeps_dimensions() {
        let grid = sample();
        let reduced = grid.retain(|row, _| row != 2, Vec::new());
        assert_eq!((reduced.max_row(), reduced.max_col()), (3, 2));
        assert!(reduced.get(2, 1).unwrap().is_none());
        assert_eq!(
            reduced.get(3, 1).unwrap().unwrap().value,
            CellValue::text("Bob")
        );
        // The source grid is untouched
        assert!(grid.get(2, 1).unwrap().is_some());
    }

    #[test]
    fn test_row_and_col_iteration() {
        let grid = sample();
        let row: Vec<String> = grid.row_cells(2).map(|c| c.value.to_string()).collect();
        assert_eq!(row, vec!["Ann", "90"]);
        let col: Vec<String> = grid.col_cells(2).map(|c| c.value.to_string()).collect();
        assert_eq!(col, vec!["Score", "90"]);
    }
}
