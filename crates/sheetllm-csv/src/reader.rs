//! CSV reader

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::options::CsvReadOptions;
use chrono::{NaiveDate, NaiveDateTime};
use sheetllm_core::{CellFormat, CellValue, SheetMatrix, MAX_COLS, MAX_ROWS};

const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// CSV file reader
pub struct CsvReader;

impl CsvReader {
    /// Read a CSV file into a grid
    pub fn read_file<P: AsRef<Path>>(path: P, options: &CsvReadOptions) -> CsvResult<SheetMatrix> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut options = options.clone();
        if options.sheet_name.is_none() {
            options.sheet_name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string);
        }
        Self::read(file, &options)
    }

    /// Read CSV from a reader into a grid
    ///
    /// Ragged records are accepted; the grid is as wide as the longest one.
    pub fn read<R: Read>(reader: R, options: &CsvReadOptions) -> CsvResult<SheetMatrix> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut rows: Vec<Vec<String>> = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        let max_col = rows.iter().map(Vec::len).max().unwrap_or(0);
        if rows.len() > MAX_ROWS as usize || max_col > MAX_COLS as usize {
            return Err(CsvError::TooLarge {
                rows: rows.len(),
                cols: max_col,
            });
        }

        let name = options
            .sheet_name
            .clone()
            .unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string());
        let mut builder = SheetMatrix::builder(name, rows.len() as u32, max_col as u32);

        for (r, record) in rows.iter().enumerate() {
            let is_header = options.has_header && r == 0;
            for (c, field) in record.iter().enumerate() {
                let value = if is_header {
                    text_or_empty(field)
                } else if options.auto_detect_types {
                    Self::detect_type(field)
                } else {
                    text_or_empty(field)
                };
                if value.is_empty() {
                    continue;
                }

                let format = if is_header && options.bold_header {
                    CellFormat::new().bold()
                } else {
                    CellFormat::default()
                };
                builder.set_cell(r as u32 + 1, c as u32 + 1, value, format)?;
            }
        }

        Ok(builder.build())
    }

    /// Detect the type of a field value
    ///
    /// Integers, floats, booleans and ISO or US-style dates become typed
    /// values; everything else, including `15%` or `$1,200`, stays text.
    pub fn detect_type(field: &str) -> CellValue {
        let field = field.trim();

        if field.is_empty() {
            return CellValue::Empty;
        }

        // Try boolean
        match field.to_lowercase().as_str() {
            "true" => return CellValue::Boolean(true),
            "false" => return CellValue::Boolean(false),
            _ => {}
        }

        // Try number
        if let Ok(n) = field.parse::<i64>() {
            return CellValue::Integer(n);
        }
        if let Ok(n) = field.parse::<f64>() {
            if n.is_finite() {
                return CellValue::Float(n);
            }
        }

        // Try date
        for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(field, fmt) {
                return CellValue::DateTime(dt);
            }
        }
        for fmt in ["%Y-%m-%d", "%m/%d/%Y"] {
            if let Ok(date) = NaiveDate::parse_from_str(field, fmt) {
                return date.into();
            }
        }

        // Default to text
        CellValue::text(field)
    }
}

fn text_or_empty(field: &str) -> CellValue {
    let field = field.trim();
    if field.is_empty() {
        CellValue::Empty
    } else {
        CellValue::text(field)
    }
}
