//! Cell-related types and utilities
//!
//! This module contains:
//! - [`CellValue`] - The value stored in a cell
//! - [`DataType`] - The type inferred from a value
//! - [`CellAddress`] - A cell's 1-based location (e.g., "A1")
//! - [`CellRange`] - A rectangular block of cells (e.g., "A1:C3")
//! - [`Cell`] - Complete cell data including value, type, format and address

mod address;
mod data_type;
mod value;

pub use address::{format_address, parse_address, CellAddress, CellRange};
pub use data_type::DataType;
pub use value::CellValue;

use crate::format::CellFormat;
use std::fmt;

/// A populated grid position
///
/// Cells are immutable once placed in a [`SheetMatrix`](crate::SheetMatrix);
/// the data type is inferred from the value at construction time.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    /// The cell value
    pub value: CellValue,
    /// Type inferred from `value`
    pub data_type: DataType,
    /// Formatting applied to the cell
    pub format: CellFormat,
    /// Where the cell lives
    pub address: CellAddress,
}

impl Cell {
    /// Create a cell, inferring its data type from the value
    pub fn new(address: CellAddress, value: CellValue, format: CellFormat) -> Self {
        let data_type = DataType::infer(&value);
        Self {
            value,
            data_type,
            format,
            address,
        }
    }

    /// Check whether the cell holds a value
    pub fn is_populated(&self) -> bool {
        !self.value.is_empty()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}({})", self.address, self.value, self.data_type.name())
    }
}
