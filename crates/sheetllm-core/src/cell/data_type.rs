//! Data type inference for cell values

use super::CellValue;
use chrono::{Datelike, Timelike};
use lazy_regex::regex_is_match;
use std::fmt;

/// The semantic type of a cell value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "SCREAMING_SNAKE_CASE")
)]
pub enum DataType {
    Empty,
    IntNum,
    FloatNum,
    Percentage,
    Date,
    Time,
    DateTime,
    Email,
    Phone,
    Url,
    Text,
    Formula,
    Currency,
    Boolean,
    Error,
}

impl DataType {
    /// Infer the data type of a value
    ///
    /// Text is classified by shape, first match wins: date-like, e-mail,
    /// URL, percentage, formula, currency, phone number, plain text.
    pub fn infer(value: &CellValue) -> Self {
        match value {
            CellValue::Empty => DataType::Empty,
            CellValue::Boolean(_) => DataType::Boolean,
            CellValue::Integer(_) => DataType::IntNum,
            CellValue::Float(_) => DataType::FloatNum,
            CellValue::Error(_) => DataType::Error,
            CellValue::Text(s) => Self::infer_text(s),
            CellValue::DateTime(dt) => {
                if dt.hour() == 0 && dt.minute() == 0 && dt.second() == 0 {
                    DataType::Date
                } else if dt.year() == 1900 && dt.month() == 1 && dt.day() == 1 {
                    DataType::Time
                } else {
                    DataType::DateTime
                }
            }
        }
    }

    fn infer_text(s: &str) -> Self {
        if regex_is_match!(r"^\d{1,2}[/-]\d{1,2}[/-]\d{2,4}", s) {
            DataType::Date
        } else if regex_is_match!(r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+$", s) {
            DataType::Email
        } else if regex_is_match!(r"^(https?://|www\.)", s) {
            DataType::Url
        } else if regex_is_match!(r"^-?\d+(\.\d+)?%$", s) {
            DataType::Percentage
        } else if s.starts_with('=') {
            DataType::Formula
        } else if regex_is_match!(r"^-?\$[\d,]+(\.\d+)?$", s) {
            DataType::Currency
        } else if regex_is_match!(r"^\+?[\d\s-]{10,15}$", s) {
            DataType::Phone
        } else {
            DataType::Text
        }
    }

    /// Upper-case name used in encodings and metadata
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Empty => "EMPTY",
            DataType::IntNum => "INT_NUM",
            DataType::FloatNum => "FLOAT_NUM",
            DataType::Percentage => "PERCENTAGE",
            DataType::Date => "DATE",
            DataType::Time => "TIME",
            DataType::DateTime => "DATETIME",
            DataType::Email => "EMAIL",
            DataType::Phone => "PHONE",
            DataType::Url => "URL",
            DataType::Text => "TEXT",
            DataType::Formula => "FORMULA",
            DataType::Currency => "CURRENCY",
            DataType::Boolean => "BOOLEAN",
            DataType::Error => "ERROR",
        }
    }

    /// Short key prefix: `N` for numeric types, otherwise the first letter of the name
    pub fn prefix(&self) -> &'static str {
        if self.is_numeric() {
            "N"
        } else {
            &self.name()[..1]
        }
    }

    /// Integer or float
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::IntNum | DataType::FloatNum)
    }

    /// Plain text
    pub fn is_text(&self) -> bool {
        matches!(self, DataType::Text)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
