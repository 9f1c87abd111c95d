//! Number-format signature detection
//!
//! The signature is read off the literal shape of a value, not from any
//! stored number format: integers are `0`, floats `0.00`-style with one zero
//! per observed decimal, and numeric-looking text maps to the percentage,
//! currency or thousands-separated pattern it resembles.

use lazy_regex::{regex_captures, regex_is_match};
use sheetllm_core::CellValue;

/// Detect the number-format signature of a value, if it has one
pub fn detect_number_format(value: &CellValue) -> Option<String> {
    match value {
        CellValue::Integer(_) => Some("0".to_string()),
        CellValue::Float(_) => {
            let rendered = value.to_string();
            let decimals = rendered.split_once('.').map_or(0, |(_, frac)| frac.len());
            Some(with_decimals("0", decimals))
        }
        CellValue::Text(s) => detect_text_format(s.trim()),
        _ => None,
    }
}

fn detect_text_format(s: &str) -> Option<String> {
    if regex_is_match!(r"^-?\d+(?:\.\d+)?%$", s) {
        return Some("0%".to_string());
    }

    if let Some((_, amount)) = regex_captures!(r"^-?\$\s?(\d[\d,]*(?:\.\d+)?)$", s) {
        let grouped = amount.contains(',');
        let decimal = amount.contains('.');
        let pattern = match (grouped, decimal) {
            (true, true) => "$#,##0.00",
            (true, false) => "$#,##0",
            (false, true) => "$0.00",
            (false, false) => "$0",
        };
        return Some(pattern.to_string());
    }

    if let Some((_, frac)) = regex_captures!(r"^-?\d{1,3}(?:,\d{3})+(?:\.(\d+))?$", s) {
        return Some(with_decimals("#,##0", frac.len()));
    }

    None
}

fn with_decimals(base: &str, decimals: usize) -> String {
    if decimals == 0 {
        base.to_string()
    } else {
        format!("{}.{}", base, "0".repeat(decimals))
    }
}
