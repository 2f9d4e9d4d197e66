//! Cleanup applied to decoded model output.

use regex::Regex;

/// Whitespace and punctuation cleanup for decoded summaries.
///
/// Only spacing the tokenizer introduces is removed: a space before closing
/// punctuation, before a contraction suffix that ends the word, and before a
/// colon that starts a clause. Quoted words and ratios such as `3 : 1` are
/// left alone.
#[derive(Debug, Clone)]
pub struct SummaryNormalizer {
    whitespace: Regex,
    space_before_punct: Regex,
    space_before_colon: Regex,
}

impl SummaryNormalizer {
    /// Compile the cleanup patterns.
    ///
    /// # Errors
    /// Returns an error if a pattern fails to compile.
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            whitespace: Regex::new(r"\s+")?,
            space_before_punct: Regex::new(
                r" ([.,!?;%)\]}]|(?:'s|n't|'re|'ve|'ll|'d|'m)\b)",
            )?,
            space_before_colon: Regex::new(r" :( [^\d\s]|$)")?,
        })
    }

    /// Trim the text, collapse whitespace runs and drop tokenizer spacing.
    #[must_use]
    pub fn normalize(&self, raw: &str) -> String {
        let collapsed = self.whitespace.replace_all(raw.trim(), " ");
        let joined = self.space_before_punct.replace_all(&collapsed, "$1");
        self.space_before_colon
            .replace_all(&joined, ":$1")
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(raw: &str) -> String {
        SummaryNormalizer::new().unwrap().normalize(raw)
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(
            normalize("  The  council\n\nvoted\tyes  "),
            "The council voted yes"
        );
    }

    #[test]
    fn test_removes_space_before_punctuation() {
        assert_eq!(
            normalize("Prices rose 5 % . It was n't expected , analysts said ."),
            "Prices rose 5%. It wasn't expected, analysts said."
        );
    }

    #[test]
    fn test_joins_contractions_at_word_end() {
        assert_eq!(
            normalize("The mayor 's plan , they 're sure , is what we 'd chosen ."),
            "The mayor's plan, they're sure, is what we'd chosen."
        );
    }

    #[test]
    fn test_quoted_words_keep_their_spacing() {
        assert_eq!(
            normalize("The board called it 'done' and 'legal' after 'summer' talks."),
            "The board called it 'done' and 'legal' after 'summer' talks."
        );
    }

    #[test]
    fn test_ratios_are_untouched() {
        assert_eq!(
            normalize("The vote was 3 : 1 in favour."),
            "The vote was 3 : 1 in favour."
        );
        assert_eq!(
            normalize("The board called it 'done' and 'legal' : 3 : 1"),
            "The board called it 'done' and 'legal' : 3 : 1"
        );
    }

    #[test]
    fn test_clause_colon_is_joined() {
        assert_eq!(
            normalize("Two changes : taxes and roads"),
            "Two changes: taxes and roads"
        );
        assert_eq!(normalize("The result :"), "The result:");
    }

    #[test]
    fn test_blank_output_stays_blank() {
        assert_eq!(normalize(" \n "), "");
    }
}
