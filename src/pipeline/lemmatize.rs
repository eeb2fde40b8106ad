//! WordNet-style noun lemmatisation.
//!
//! Every token is treated as a noun. Verbs and adjectives therefore keep
//! most of their inflection ("running" stays "running"); the embedding and
//! classifier artifacts were trained on tokens produced the same way, so the
//! behaviour is kept as is.
//!
//! ## Algorithm
//!
//! 1. If the word has an exception entry, the candidates are the word itself
//!    plus its listed lemmas.
//! 2. Otherwise the detachment rules in [`NOUN_RULES`] are applied once and
//!    the candidates are the word plus every rewritten form.
//! 3. Candidates not in the lemma index are discarded. If none survive in
//!    step 2, the rules are re-applied to the rewritten forms until something
//!    survives or no forms are left.
//! 4. The shortest surviving candidate wins (first one on ties). With no
//!    survivors the word is returned unchanged.

use std::collections::{HashMap, HashSet};

/// Suffix rewrites for English nouns, in application order.
pub const NOUN_RULES: [(&str, &str); 9] = [
    ("s", ""),
    ("ses", "s"),
    ("ves", "f"),
    ("xes", "x"),
    ("zes", "z"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("men", "man"),
    ("ies", "y"),
];

/// Noun lemmatiser over an exception table and a lemma index.
#[derive(Debug, Clone, Default)]
pub struct NounLemmatizer {
    exceptions: HashMap<String, Vec<String>>,
    index: HashSet<String>,
}

impl NounLemmatizer {
    pub fn new(exceptions: HashMap<String, Vec<String>>, index: HashSet<String>) -> Self {
        Self { exceptions, index }
    }

    /// Number of known lemmas.
    pub fn index_len(&self) -> usize {
        self.index.len()
    }

    /// Reduce `word` to its dictionary form.
    pub fn lemmatize(&self, word: &str) -> String {
        self.candidates(word)
            .into_iter()
            .min_by_key(|c| c.len())
            .unwrap_or_else(|| word.to_string())
    }

    fn candidates(&self, word: &str) -> Vec<String> {
        if let Some(lemmas) = self.exceptions.get(word) {
            let forms = std::iter::once(word.to_string()).chain(lemmas.iter().cloned());
            return self.known(forms);
        }

        let mut forms = apply_rules(&[word.to_string()]);
        let found = self.known(std::iter::once(word.to_string()).chain(forms.iter().cloned()));
        if !found.is_empty() {
            return found;
        }

        while !forms.is_empty() {
            forms = apply_rules(&forms);
            let found = self.known(forms.iter().cloned());
            if !found.is_empty() {
                return found;
            }
        }
        Vec::new()
    }

    /// Keep forms present in the index, first occurrence only.
    fn known(&self, forms: impl Iterator<Item = String>) -> Vec<String> {
        let mut seen = HashSet::new();
        forms
            .filter(|f| self.index.contains(f))
            .filter(|f| seen.insert(f.clone()))
            .collect()
    }
}

fn apply_rules(forms: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for form in forms {
        for (suffix, replacement) in NOUN_RULES {
            if let Some(stem) = form.strip_suffix(suffix) {
                let rewritten = format!("{stem}{replacement}");
                if !out.contains(&rewritten) {
                    out.push(rewritten);
                }
            }
        }
    }
    out
}
