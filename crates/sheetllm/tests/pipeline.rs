//! End-to-end tests of encoding, chunking and strategy selection

use pretty_assertions::assert_eq;
use sheetllm::prelude::*;
use sheetllm::{encode_inverted_index, CellFormat, CellRange};

const HEADERS: [&str; 5] = ["Region", "Product", "Units", "Price", "Note"];

/// Two header rows (bold, then bordered) over `data_rows` rows of distinct text
fn inventory(data_rows: u32) -> SheetMatrix {
    let max_row = data_rows + 2;
    let mut builder = SheetMatrix::builder("Inventory", max_row, 5);
    for (i, header) in HEADERS.iter().enumerate() {
        let col = i as u32 + 1;
        builder
            .set_cell(1, col, CellValue::text(*header), CellFormat::new().bold())
            .unwrap();
        builder
            .set_cell(
                2,
                col,
                CellValue::text(format!("({})", header.to_lowercase())),
                CellFormat::new().all_borders(),
            )
            .unwrap();
    }
    for row in 3..=max_row {
        for col in 1..=5 {
            builder
                .set_value(row, col, CellValue::text(format!("r{row}c{col}")))
                .unwrap();
        }
    }
    builder.merge(CellRange::from_bounds(1, 1, 1, 2)).unwrap();
    builder.build()
}

/// The chunking fallback keeps the header rows identical in every chunk
#[test]
fn test_over_budget_sheet_is_chunked_with_headers() {
    let grid = inventory(400);
    let config = CompressionConfig::new().with_max_tokens(4000);
    let encoder = SheetEncoder::new(&config);

    let err = encoder.encode(&grid).unwrap_err();
    assert!(err.is_budget_exceeded());

    let encoded = encoder.encode_with_fallback(&grid).unwrap();
    // 4000 / 100 = 40 rows per chunk over 400 data rows
    assert_eq!(encoded.chunks, Some(10));
    assert!(encoded.text.starts_with("# Sheet: Inventory\nDimensions: 402x5\n\n"));

    let parts: Vec<&str> = encoded.text.split(&config.chunking.separator).collect();
    assert_eq!(parts.len(), 10);

    let header_values = r#"{"values":{"Region":["A1"],"Product":["B1"],"Units":["C1"],"Price":["D1"],"Note":["E1"],"(region)":["A2"],"(product)":["B2"],"(units)":["C2"],"(price)":["D2"],"(note)":["E2"],"#;
    let header_formats = r#""formats":{"FMT:bold":["A1:E1"],"FMT:bordered borders:left,right,top,bottom":["A2:E2"]}}"#;
    for (i, part) in parts.iter().enumerate() {
        let first = 3 + 40 * i as u32;
        let label = format!("Chunk {}/10 (rows {}-{})\n", i + 1, first, first + 39);
        assert!(part.contains(&label), "missing label {label:?}");
        assert!(part.contains(header_values));
        assert!(part.contains(header_formats));
        // Merged ranges are carried into every chunk
        assert!(part.ends_with("\nMerged: A1:B1"));
    }
}

/// The direct path either fits the budget or fails, never truncates
#[test]
fn test_direct_encoding_respects_budget() {
    let grid = inventory(30);
    let estimator = CharRatioEstimator::default();
    let full = SheetEncoder::new(&CompressionConfig::new())
        .render(&grid)
        .unwrap();
    let needed = estimator.estimate(&full);

    let exact = CompressionConfig::new().with_max_tokens(needed);
    let encoded = SheetEncoder::new(&exact).encode(&grid).unwrap();
    assert_eq!(encoded.text, full);
    assert_eq!(encoded.tokens, needed);

    let short = CompressionConfig::new().with_max_tokens(needed - 1);
    match SheetEncoder::new(&short).encode(&grid) {
        Err(CompressError::BudgetExceeded { tokens, budget }) => {
            assert_eq!(tokens, needed);
            assert_eq!(budget, needed - 1);
        }
        other => panic!("expected BudgetExceeded, got {other:?}"),
    }
}

/// A plain 3x3 grid keeps every cell and maps each value to one address
#[test]
fn test_small_numeric_grid() {
    let grid = SheetMatrix::from_rows("Nums", vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]]);
    let compressor = SheetCompressor::new(CompressionConfig::new().with_anchor_proximity(1));
    let reduced = compressor.compress(&grid);
    assert_eq!(reduced, grid);

    let json = encode_inverted_index(&reduced).unwrap();
    let parsed: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.len(), 9);
    for (value, ranges) in &parsed {
        let ranges = ranges.as_array().unwrap();
        assert_eq!(ranges.len(), 1, "value {value} should be a singleton");
        assert!(!ranges[0].as_str().unwrap().contains(':'));
    }
}

/// Strategy selection records metadata and picks a working strategy
#[test]
fn test_best_method_outcome() {
    let grid = inventory(30);
    let outcome = compress_with_best_method(
        &grid,
        &CompressionConfig::new(),
        &CharRatioEstimator::default(),
    )
    .unwrap();

    assert!(!outcome.is_large_sheet());
    let ratio = outcome.ratio.unwrap();
    assert!(ratio > 0.0);
    assert_eq!(outcome.metadata.headers, HEADERS.to_vec());
    assert!(outcome.encoded.tokens <= 4000);
    assert!(!outcome.encoded.is_chunked());
}
