//! Normalisation: extracted text → token sequence.
//!
//! Steps, applied in this order:
//! 1. Lowercase
//! 2. Delete every character that is not an ASCII letter or whitespace
//!    (`"Report2023"` becomes `"report"`)
//! 3. Split on whitespace
//! 4. Drop stopwords
//! 5. Lemmatise each remaining token as a noun
//!
//! The result is deterministic for a given input and never an error; text
//! made only of digits and punctuation yields an empty sequence.

use super::lemmatize::NounLemmatizer;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static RE_NON_ALPHA: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z\s]").unwrap());

/// Ordered normalised tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenSequence(Vec<String>);

impl TokenSequence {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Space-joined tokens, suitable for feeding back into [`Normalizer::normalize`].
    pub fn to_text(&self) -> String {
        self.0.join(" ")
    }
}

impl From<Vec<String>> for TokenSequence {
    fn from(tokens: Vec<String>) -> Self {
        Self(tokens)
    }
}

/// Stateless text normaliser over a fixed stopword set and lemmatiser.
#[derive(Debug, Clone)]
pub struct Normalizer {
    stopwords: HashSet<String>,
    lemmatizer: NounLemmatizer,
}

impl Normalizer {
    pub fn new(stopwords: HashSet<String>, lemmatizer: NounLemmatizer) -> Self {
        Self {
            stopwords,
            lemmatizer,
        }
    }

    pub fn normalize(&self, text: &str) -> TokenSequence {
        let lowered = text.to_lowercase();
        let letters_only = RE_NON_ALPHA.replace_all(&lowered, "");
        letters_only
            .split_whitespace()
            .filter(|token| !self.stopwords.contains(*token))
            .map(|token| self.lemmatizer.lemmatize(token))
            .collect::<Vec<_>>()
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn normalizer() -> Normalizer {
        let stopwords = ["the", "and", "of", "for", "is", "a"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let index = ["report", "annual", "financial", "highlight", "year", "company"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        Normalizer::new(stopwords, NounLemmatizer::new(HashMap::new(), index))
    }

    fn tokens(seq: &TokenSequence) -> Vec<&str> {
        seq.iter().collect()
    }

    #[test]
    fn digits_inside_tokens_are_deleted() {
        let n = normalizer();
        assert_eq!(tokens(&n.normalize("Report2023")), vec!["report"]);
    }

    #[test]
    fn full_pipeline_order() {
        let n = normalizer();
        let seq = n.normalize("The Annual Report 2023: Financial Highlights of the Year!");
        assert_eq!(
            tokens(&seq),
            vec!["annual", "report", "financial", "highlight", "year"]
        );
    }

    #[test]
    fn punctuation_joins_rather_than_splits() {
        let n = normalizer();
        // The apostrophe is deleted, so "company's" becomes "companys",
        // which then lemmatises like a plural.
        assert_eq!(tokens(&n.normalize("company's")), vec!["company"]);
        assert_eq!(tokens(&n.normalize("year-end")), vec!["yearend"]);
    }

    #[test]
    fn non_ascii_letters_are_stripped() {
        let n = normalizer();
        assert_eq!(tokens(&n.normalize("Résumé reports")), vec!["rsum", "report"]);
    }

    #[test]
    fn empty_and_symbol_only_text() {
        let n = normalizer();
        assert!(n.normalize("").is_empty());
        assert!(n.normalize("2023 — 42% / $1,000").is_empty());
        assert!(n.normalize("the and of").is_empty());
    }

    #[test]
    fn idempotent_on_own_output() {
        let n = normalizer();
        let once = n.normalize("Annual Reports for the Company: financial years 2021-2023");
        let twice = n.normalize(&once.to_text());
        assert_eq!(once, twice);
    }

    #[test]
    fn deterministic() {
        let n = normalizer();
        let text = "Annual reports, annual highlights, companies.";
        assert_eq!(n.normalize(text), n.normalize(text));
    }
}
