//! Compression statistics shown next to a summary.

use std::fmt;

use serde::Serialize;

/// Word counts of a source/summary pair and the resulting ratio.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CompressionStats {
    /// Whitespace-separated words in the source.
    pub input_words: usize,
    /// Whitespace-separated words in the summary.
    pub output_words: usize,
    /// `output_words / input_words`, absent for a wordless source.
    pub ratio: Option<f64>,
    /// Share of the source removed by summarizing, `1 - ratio`.
    pub reduction: Option<f64>,
}

impl CompressionStats {
    /// Compute statistics for a source text and its summary.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn compute(input: &str, summary: &str) -> Self {
        let input_words = word_count(input);
        let output_words = word_count(summary);
        let ratio = (input_words > 0).then(|| output_words as f64 / input_words as f64);
        Self {
            input_words,
            output_words,
            ratio,
            reduction: ratio.map(|ratio| 1.0 - ratio),
        }
    }
}

impl fmt::Display for CompressionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {} words", self.output_words, self.input_words)?;
        if let (Some(ratio), Some(reduction)) = (self.ratio, self.reduction) {
            write!(
                f,
                ", compressed to {:.0}% of the original ({:.0}% shorter)",
                ratio * 100.0,
                reduction * 100.0
            )?;
        }
        Ok(())
    }
}

/// Count whitespace-separated words.
#[must_use]
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_and_reduction() {
        let stats = CompressionStats::compute("one two three four", "one");
        assert_eq!(stats.input_words, 4);
        assert_eq!(stats.output_words, 1);
        assert_eq!(stats.ratio, Some(0.25));
        assert_eq!(stats.reduction, Some(0.75));
    }

    #[test]
    fn test_empty_source_has_no_ratio() {
        let stats = CompressionStats::compute("   ", "anything");
        assert_eq!(stats.ratio, None);
        assert_eq!(stats.reduction, None);
        assert_eq!(stats.to_string(), "1 / 0 words");
    }

    #[test]
    fn test_serializes_reduction() {
        let json = serde_json::to_value(CompressionStats::compute("a b c d", "a")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "input_words": 4,
                "output_words": 1,
                "ratio": 0.25,
                "reduction": 0.75,
            })
        );
    }

    #[test]
    fn test_display_line() {
        let stats = CompressionStats::compute("a b c d e f g h i j", "a b");
        assert_eq!(
            stats.to_string(),
            "2 / 10 words, compressed to 20% of the original (80% shorter)"
        );
    }
}
