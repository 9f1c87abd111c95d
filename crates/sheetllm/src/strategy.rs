//! Multi-strategy selection
//!
//! [`compress_with_best_method`] tries several module combinations against
//! a sheet and keeps the one with the lowest token ratio (compressed tokens
//! over the tokens of the plain, uncompressed encoding). Every attempt
//! yields its own `Result`; a failed attempt is logged and skipped.

use crate::compressor::SheetCompressor;
use crate::config::CompressionConfig;
use crate::encoder::{EncodedSheet, SheetEncoder};
use crate::error::{CompressError, CompressResult};
use crate::metadata::SheetMetadata;
use crate::tokens::TokenEstimator;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sheetllm_core::SheetMatrix;
use std::fmt;
use tracing::{debug, info, warn};

/// A module combination tried by the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Anchors, inverted index and format aggregation
    Combined,
    /// Format aggregation only
    FormatAggregation,
    /// Inverted index only
    InvertedIndex,
    /// Anchors with the plain encoding
    Anchors,
}

impl Strategy {
    /// Order in which strategies are tried
    pub const TRIAL_ORDER: [Strategy; 4] = [
        Strategy::Combined,
        Strategy::FormatAggregation,
        Strategy::InvertedIndex,
        Strategy::Anchors,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Combined => "combined",
            Strategy::FormatAggregation => "format_aggregation",
            Strategy::InvertedIndex => "inverted_index",
            Strategy::Anchors => "anchors",
        }
    }

    /// `base` with this strategy's module toggles
    pub fn config(&self, base: &CompressionConfig) -> CompressionConfig {
        let (anchors, inverted_index, format_aggregation) = match self {
            Strategy::Combined => (true, true, true),
            Strategy::FormatAggregation => (false, false, true),
            Strategy::InvertedIndex => (false, true, false),
            Strategy::Anchors => (true, false, false),
        };
        base.clone()
            .with_modules(anchors, inverted_index, format_aggregation)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One strategy attempt
#[derive(Debug)]
pub struct Attempt {
    pub strategy: Strategy,
    pub result: CompressResult<Trial>,
}

/// A successful attempt
#[derive(Debug, Clone)]
pub struct Trial {
    pub encoded: EncodedSheet,
    /// Compressed tokens over baseline tokens
    pub ratio: f64,
}

/// The selected encoding of a sheet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionOutcome {
    pub method: Strategy,
    /// Token ratio; `None` when the large-sheet shortcut skipped the trials
    pub ratio: Option<f64>,
    pub encoded: EncodedSheet,
    pub metadata: SheetMetadata,
    /// Tokens of the plain encoding, when it was computed
    pub baseline_tokens: Option<usize>,
}

impl CompressionOutcome {
    /// Whether the large-sheet shortcut produced this outcome
    pub fn is_large_sheet(&self) -> bool {
        self.ratio.is_none()
    }
}

/// Whether `grid` takes the large-sheet shortcut
pub fn is_large_sheet(grid: &SheetMatrix, config: &CompressionConfig) -> bool {
    let weight = u64::from(grid.max_row()) * u64::from(grid.max_col()) * 2;
    weight > config.strategy.large_sheet_threshold
}

/// Token count of the plain, uncompressed encoding
pub fn baseline_tokens(
    grid: &SheetMatrix,
    base: &CompressionConfig,
    estimator: &dyn TokenEstimator,
) -> CompressResult<usize> {
    let plain = base.clone().with_modules(false, false, false);
    let text = SheetEncoder::new(&plain)
        .with_estimator(estimator)
        .render(grid)?;
    Ok(estimator.estimate(&text))
}

/// Run one strategy with a budget-enforced direct encoding
pub fn run_trial(
    grid: &SheetMatrix,
    strategy: Strategy,
    base: &CompressionConfig,
    estimator: &dyn TokenEstimator,
    baseline: usize,
) -> CompressResult<Trial> {
    let compressor = SheetCompressor::new(strategy.config(base));
    let reduced = compressor.compress(grid);
    let encoded = compressor
        .encoder()
        .with_estimator(estimator)
        .encode(&reduced)?;
    let ratio = encoded.tokens as f64 / baseline.max(1) as f64;
    Ok(Trial { encoded, ratio })
}

/// Try strategies in order, stopping early on a ratio under the early-exit
/// threshold
pub fn run_trials(
    grid: &SheetMatrix,
    base: &CompressionConfig,
    estimator: &dyn TokenEstimator,
    baseline: usize,
) -> Vec<Attempt> {
    let mut attempts = Vec::with_capacity(Strategy::TRIAL_ORDER.len());
    for strategy in Strategy::TRIAL_ORDER {
        let result = run_trial(grid, strategy, base, estimator, baseline);
        let early_exit = match &result {
            Ok(trial) => {
                debug!(sheet = grid.name(), %strategy, tokens = trial.encoded.tokens, ratio = trial.ratio, "strategy succeeded");
                trial.ratio < base.strategy.early_exit_ratio
            }
            Err(e) => {
                warn!(sheet = grid.name(), %strategy, error = %e, "strategy failed");
                false
            }
        };
        attempts.push(Attempt { strategy, result });
        if early_exit {
            break;
        }
    }
    attempts
}

/// Pick the successful attempt with the lowest ratio (first one on ties)
pub fn select_best(attempts: Vec<Attempt>) -> CompressResult<(Strategy, Trial)> {
    let mut best: Option<(Strategy, Trial)> = None;
    let mut failures = Vec::new();

    for Attempt { strategy, result } in attempts {
        match result {
            Ok(trial) => {
                if best.as_ref().map_or(true, |(_, b)| trial.ratio < b.ratio) {
                    best = Some((strategy, trial));
                }
            }
            Err(e) => failures.push((strategy, e.to_string())),
        }
    }

    best.ok_or(CompressError::NoViableStrategy { failures })
}

/// Compress a sheet with the best-performing strategy
///
/// Sheets over the large-sheet threshold skip the trials and are encoded
/// with format aggregation alone, falling back to chunks if needed.
pub fn compress_with_best_method(
    grid: &SheetMatrix,
    base: &CompressionConfig,
    estimator: &dyn TokenEstimator,
) -> CompressResult<CompressionOutcome> {
    let metadata = SheetMetadata::compute(grid);

    if is_large_sheet(grid, base) {
        let config = Strategy::FormatAggregation.config(base);
        let encoded = SheetEncoder::new(&config)
            .with_estimator(estimator)
            .encode_with_fallback(grid)?;
        info!(sheet = grid.name(), tokens = encoded.tokens, "large sheet, used format aggregation");
        return Ok(CompressionOutcome {
            method: Strategy::FormatAggregation,
            ratio: None,
            encoded,
            metadata,
            baseline_tokens: None,
        });
    }

    let baseline = baseline_tokens(grid, base, estimator)?;
    let attempts = run_trials(grid, base, estimator, baseline);
    let (method, trial) = select_best(attempts)?;

    info!(sheet = grid.name(), %method, ratio = trial.ratio, tokens = trial.encoded.tokens, "selected strategy");
    Ok(CompressionOutcome {
        method,
        ratio: Some(trial.ratio),
        encoded: trial.encoded,
        metadata,
        baseline_tokens: Some(baseline),
    })
}

/// Run [`compress_with_best_method`] over many sheets in parallel
///
/// Results are returned in input order, each paired with its sheet name.
pub fn compress_workbook(
    sheets: &[SheetMatrix],
    base: &CompressionConfig,
    estimator: &dyn TokenEstimator,
) -> Vec<(String, CompressResult<CompressionOutcome>)> {
    sheets
        .par_iter()
        .map(|grid| {
            (
                grid.name().to_string(),
                compress_with_best_method(grid, base, estimator),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::CharRatioEstimator;
    use pretty_assertions::assert_eq;
    use sheetllm_core::CellValue;

    /// Twenty-six named columns (A to Z); every data row repeats one value
    /// of its own across the whole row
    fn repetitive(rows: u32) -> SheetMatrix {
        let data: Vec<Vec<CellValue>> = (1..=rows)
            .map(|r| {
                (1..=26)
                    .map(|c| {
                        if r == 1 {
                            CellValue::text(format!("Field{c}"))
                        } else {
                            CellValue::text(format!("v{r}"))
                        }
                    })
                    .collect()
            })
            .collect();
        SheetMatrix::from_rows("Tickets", data)
    }

    #[test]
    fn test_strategy_configs() {
        let base = CompressionConfig::new().with_max_tokens(123);
        let fa = Strategy::FormatAggregation.config(&base);
        assert!(!fa.use_structural_anchors && !fa.use_inverted_index && fa.use_format_aggregation);
        assert_eq!(fa.max_tokens, 123);
        let anchors = Strategy::Anchors.config(&base);
        assert!(anchors.use_structural_anchors && !anchors.use_inverted_index);
        assert_eq!(Strategy::InvertedIndex.to_string(), "inverted_index");
    }

    #[test]
    fn test_early_exit_on_good_ratio() {
        let grid = repetitive(60);
        let estimator = CharRatioEstimator::default();
        let base = CompressionConfig::new();
        let baseline = baseline_tokens(&grid, &base, &estimator).unwrap();
        let attempts = run_trials(&grid, &base, &estimator, baseline);

        // Each data row holds one value and collapses to a single A:Z range,
        // so combined exits at once
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].strategy, Strategy::Combined);

        let outcome = compress_with_best_method(&grid, &base, &estimator).unwrap();
        assert_eq!(outcome.method, Strategy::Combined);
        assert!(outcome.ratio.unwrap() < 0.3);
        assert_eq!(outcome.baseline_tokens, Some(baseline));
        assert_eq!(outcome.metadata.headers.len(), 26);
        assert_eq!(outcome.metadata.headers[0], "Field1");
    }

    #[test]
    fn test_lowest_ratio_wins_without_early_exit() {
        let grid = repetitive(60);
        let estimator = CharRatioEstimator::default();
        let mut base = CompressionConfig::new();
        base.strategy.early_exit_ratio = 0.0;

        let baseline = baseline_tokens(&grid, &base, &estimator).unwrap();
        let attempts = run_trials(&grid, &base, &estimator, baseline);
        assert_eq!(attempts.len(), 4);

        let best_ratio = attempts
            .iter()
            .filter_map(|a| a.result.as_ref().ok().map(|t| t.ratio))
            .fold(f64::INFINITY, f64::min);
        let (_, trial) = select_best(attempts).unwrap();
        assert_eq!(trial.ratio, best_ratio);
    }

    #[test]
    fn test_all_strategies_over_budget() {
        let grid = repetitive(10);
        let estimator = CharRatioEstimator::default();
        let base = CompressionConfig::new().with_max_tokens(3);

        match compress_with_best_method(&grid, &base, &estimator) {
            Err(CompressError::NoViableStrategy { failures }) => {
                let tried: Vec<Strategy> = failures.iter().map(|(s, _)| *s).collect();
                assert_eq!(tried, Strategy::TRIAL_ORDER.to_vec());
                assert!(failures[0].1.contains("exceeds token limit"));
            }
            other => panic!("expected NoViableStrategy, got {other:?}"),
        }
    }

    #[test]
    fn test_large_sheet_shortcut() {
        let grid = repetitive(40);
        let estimator = CharRatioEstimator::default();
        let mut base = CompressionConfig::new();
        base.strategy.large_sheet_threshold = 100;

        assert!(is_large_sheet(&grid, &base));
        let outcome = compress_with_best_method(&grid, &base, &estimator).unwrap();
        assert!(outcome.is_large_sheet());
        assert_eq!(outcome.method, Strategy::FormatAggregation);
        assert_eq!(outcome.baseline_tokens, None);
    }

    #[test]
    fn test_workbook_keeps_input_order() {
        let sheets = vec![repetitive(20), SheetMatrix::from_rows("Tiny", vec![vec![1]])];
        let estimator = CharRatioEstimator::default();
        let results = compress_workbook(&sheets, &CompressionConfig::new(), &estimator);

        let names: Vec<&str> = results.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["Tickets", "Tiny"]);
        assert!(results.iter().all(|(_, r)| r.is_ok()));
    }
}
