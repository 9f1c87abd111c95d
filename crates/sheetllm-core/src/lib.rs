//! # sheetllm-core
//!
//! Grid model for the sheetllm compression pipeline.
//!
//! This crate provides the fundamental types used throughout sheetllm:
//! - [`CellValue`] and [`DataType`] - Cell values and their inferred types
//! - [`CellAddress`] and [`CellRange`] - 1-based A1-style addressing
//! - [`CellFormat`] - Formatting flags, colors and border sides
//! - [`SheetMatrix`] - An immutable, dense, 1-indexed grid of cells
//!
//! ## Example
//!
//! ```rust
//! use sheetllm_core::{CellFormat, CellValue, SheetMatrix};
//!
//! let mut builder = SheetMatrix::builder("Summary", 2, 2);
//! builder.set_value(1, 1, "Revenue").unwrap();
//! builder.set_value(1, 2, 1200_i64).unwrap();
//! builder
//!     .set_cell(2, 1, CellValue::from("Cost"), CellFormat::new().bold())
//!     .unwrap();
//! let grid = builder.build();
//!
//! assert_eq!(grid.get(1, 2).unwrap().unwrap().value, CellValue::Integer(1200));
//! assert!(grid.get(2, 2).unwrap().is_none());
//! assert!(grid.get(3, 1).is_err());
//! ```

pub mod cell;
pub mod error;
pub mod format;
pub mod grid;

pub use cell::{format_address, parse_address, Cell, CellAddress, CellRange, CellValue, DataType};
pub use error::{Error, Result};
pub use format::{BorderSide, CellFormat, FormatFlag};
pub use grid::{SheetMatrix, SheetMatrixBuilder};

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u32 = 16_384;
