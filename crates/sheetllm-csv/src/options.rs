//! CSV options

/// Options for reading CSV files
#[derive(Debug, Clone)]
pub struct CsvReadOptions {
    /// Field delimiter (default: comma)
    pub delimiter: u8,
    /// Quote character (default: double quote)
    pub quote: u8,
    /// Whether the first record is a header row
    pub has_header: bool,
    /// Mark header cells bold so they read as headers downstream
    pub bold_header: bool,
    /// Automatic type detection
    pub auto_detect_types: bool,
    /// Sheet name; defaults to the file stem, or `Sheet1` for streams
    pub sheet_name: Option<String>,
}

impl Default for CsvReadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            has_header: true,
            bold_header: true,
            auto_detect_types: true,
            sheet_name: None,
        }
    }
}

impl CsvReadOptions {
    /// Use a tab delimiter
    pub fn tsv() -> Self {
        Self {
            delimiter: b'\t',
            ..Self::default()
        }
    }
}
