//! Token estimation
//!
//! The pipeline only needs an estimator that is deterministic and monotone
//! (longer text never estimates fewer tokens). Any tokenizer can be plugged
//! in through [`TokenEstimator`], including plain closures.

use lazy_regex::regex;

/// Estimates how many model tokens a text occupies
pub trait TokenEstimator: Send + Sync {
    /// Estimated token count of `text`
    fn estimate(&self, text: &str) -> usize;
}

impl<F> TokenEstimator for F
where
    F: Fn(&str) -> usize + Send + Sync,
{
    fn estimate(&self, text: &str) -> usize {
        self(text)
    }
}

/// Character-count estimator: one token per `chars_per_token` characters
///
/// This is the default estimator. It is strictly monotone under appending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharRatioEstimator {
    pub chars_per_token: usize,
}

/// The estimator used when none is supplied
pub static DEFAULT_ESTIMATOR: CharRatioEstimator = CharRatioEstimator { chars_per_token: 4 };

impl Default for CharRatioEstimator {
    fn default() -> Self {
        DEFAULT_ESTIMATOR
    }
}

impl TokenEstimator for CharRatioEstimator {
    fn estimate(&self, text: &str) -> usize {
        let per = self.chars_per_token.max(1);
        let chars = text.chars().count();
        (chars + per - 1) / per
    }
}

/// Estimator that splits text the way BPE pre-tokenizers do
///
/// Words, runs of up to three digits, punctuation runs and whitespace each
/// form a piece; a piece costs one token per four bytes, at least one. Closer
/// to real tokenizers on JSON-heavy text than [`CharRatioEstimator`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PieceEstimator;

impl TokenEstimator for PieceEstimator {
    fn estimate(&self, text: &str) -> usize {
        let pieces = regex!(
            r"(?i:'s|'t|'re|'ve|'m|'ll|'d)|[^\r\n\p{L}\p{N}]?\p{L}+|\p{N}{1,3}| ?[^\s\p{L}\p{N}]+[\r\n]*|\s*[\r\n]+|\s+"
        );
        pieces
            .find_iter(text)
            .map(|m| ((m.as_str().len() + 3) / 4).max(1))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_ratio() {
        let est = CharRatioEstimator::default();
        assert_eq!(est.estimate(""), 0);
        assert_eq!(est.estimate("abc"), 1);
        assert_eq!(est.estimate("abcd"), 1);
        assert_eq!(est.estimate("abcde"), 2);
        assert_eq!(CharRatioEstimator { chars_per_token: 0 }.estimate("ab"), 2);
    }

    #[test]
    fn test_char_ratio_is_monotone() {
        let est = CharRatioEstimator::default();
        let text = "# Sheet: Summary\nDimensions: 10x4\n{\"Revenue\":[\"A1\"]}";
        let mut last = 0;
        for end in 0..=text.len() {
            if text.is_char_boundary(end) {
                let n = est.estimate(&text[..end]);
                assert!(n >= last);
                last = n;
            }
        }
    }

    #[test]
    fn test_piece_estimator() {
        let est = PieceEstimator;
        assert_eq!(est.estimate(""), 0);
        assert_eq!(est.estimate("hello"), 2);
        // "12345" splits into "123" and "45"
        assert_eq!(est.estimate("12345"), 2);
        assert!(est.estimate("{\"A1\":[\"B2:C3\"]}") >= 5);
        assert_eq!(est.estimate("same text"), est.estimate("same text"));
    }

    #[test]
    fn test_closure_estimator() {
        let words = |t: &str| t.split_whitespace().count();
        assert_eq!(words.estimate("one two three"), 3);
    }
}
