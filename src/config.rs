//! Configuration types for loading the inference context.
//!
//! Everything the classifier needs at startup is named in one
//! [`ClassifierConfig`], built via its [`ClassifierConfigBuilder`]. Only the
//! two model artifacts are required; the language resources fall back to the
//! bundled English defaults.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Paths to the artifacts and resources loaded by
/// [`crate::InferenceContext::load`].
///
/// # Example
/// ```rust
/// use annual_report_classifier::{ClassifierConfig, EmbeddingFormat};
///
/// let config = ClassifierConfig::builder()
///     .embedding_model("models/word2vec.txt")
///     .embedding_format(EmbeddingFormat::Text)
///     .classifier_model("models/random_forest.json")
///     .build()
///     .unwrap();
/// assert!(config.stopwords.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Pretrained word-embedding table in word2vec format.
    pub embedding_model: PathBuf,

    /// Encoding of `embedding_model`. Default: [`EmbeddingFormat::Auto`].
    pub embedding_format: EmbeddingFormat,

    /// Trained classifier, as a JSON model description.
    pub classifier_model: PathBuf,

    /// Stopword list, one word per line. If None, the bundled English list.
    pub stopwords: Option<PathBuf>,

    /// Noun exception list (`inflected lemma [lemma…]` per line).
    /// If None, the bundled English list.
    pub noun_exceptions: Option<PathBuf>,

    /// Valid noun lemmas, one per line. If None, the embedding vocabulary
    /// serves as the lemma index.
    pub lemma_index: Option<PathBuf>,
}

impl ClassifierConfig {
    /// Create a new builder for `ClassifierConfig`.
    pub fn builder() -> ClassifierConfigBuilder {
        ClassifierConfigBuilder::default()
    }

    /// The embedding format with `Auto` resolved against the file extension.
    pub fn resolved_embedding_format(&self) -> EmbeddingFormat {
        self.embedding_format.resolve(&self.embedding_model)
    }
}

/// Builder for [`ClassifierConfig`].
#[derive(Debug, Default)]
pub struct ClassifierConfigBuilder {
    embedding_model: Option<PathBuf>,
    embedding_format: EmbeddingFormat,
    classifier_model: Option<PathBuf>,
    stopwords: Option<PathBuf>,
    noun_exceptions: Option<PathBuf>,
    lemma_index: Option<PathBuf>,
}

impl ClassifierConfigBuilder {
    pub fn embedding_model(mut self, path: impl Into<PathBuf>) -> Self {
        self.embedding_model = Some(path.into());
        self
    }

    pub fn embedding_format(mut self, format: EmbeddingFormat) -> Self {
        self.embedding_format = format;
        self
    }

    pub fn classifier_model(mut self, path: impl Into<PathBuf>) -> Self {
        self.classifier_model = Some(path.into());
        self
    }

    pub fn stopwords(mut self, path: impl Into<PathBuf>) -> Self {
        self.stopwords = Some(path.into());
        self
    }

    pub fn noun_exceptions(mut self, path: impl Into<PathBuf>) -> Self {
        self.noun_exceptions = Some(path.into());
        self
    }

    pub fn lemma_index(mut self, path: impl Into<PathBuf>) -> Self {
        self.lemma_index = Some(path.into());
        self
    }

    /// Build the configuration, validating that both artifacts are named.
    ///
    /// Existence on disk is checked later, by the loader.
    pub fn build(self) -> Result<ClassifierConfig, ConfigError> {
        let embedding_model = required(self.embedding_model, "embedding model")?;
        let classifier_model = required(self.classifier_model, "classifier model")?;
        Ok(ClassifierConfig {
            embedding_model,
            embedding_format: self.embedding_format,
            classifier_model,
            stopwords: self.stopwords,
            noun_exceptions: self.noun_exceptions,
            lemma_index: self.lemma_index,
        })
    }
}

fn required(path: Option<PathBuf>, what: &str) -> Result<PathBuf, ConfigError> {
    match path {
        Some(p) if !p.as_os_str().is_empty() => Ok(p),
        _ => Err(ConfigError::InvalidConfig(format!("{what} path is required"))),
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// On-disk encoding of the word-embedding table.
///
/// Both encodings start with a `"<vocab size> <dimension>"` header line, as
/// written by word2vec and gensim's `save_word2vec_format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingFormat {
    /// `Binary` for a `.bin` extension, `Text` otherwise. (default)
    #[default]
    Auto,
    /// One `word v1 … vD` line per entry.
    Text,
    /// `word ` followed by D little-endian `f32` values per entry.
    Binary,
}

impl EmbeddingFormat {
    /// Resolve `Auto` for a given artifact path; explicit formats pass through.
    pub fn resolve(self, path: &Path) -> EmbeddingFormat {
        match self {
            EmbeddingFormat::Auto => match path.extension().and_then(|e| e.to_str()) {
                Some(ext) if ext.eq_ignore_ascii_case("bin") => EmbeddingFormat::Binary,
                _ => EmbeddingFormat::Text,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_requires_both_artifacts() {
        let err = ClassifierConfig::builder()
            .embedding_model("w2v.txt")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("classifier model"), "got: {err}");

        let err = ClassifierConfig::builder()
            .classifier_model("rf.json")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("embedding model"), "got: {err}");
    }

    #[test]
    fn empty_path_is_rejected() {
        let err = ClassifierConfig::builder()
            .embedding_model("")
            .classifier_model("rf.json")
            .build();
        assert!(matches!(err, Err(ConfigError::InvalidConfig(_))));
    }

    #[test]
    fn auto_format_follows_extension() {
        assert_eq!(
            EmbeddingFormat::Auto.resolve(Path::new("vectors.bin")),
            EmbeddingFormat::Binary
        );
        assert_eq!(
            EmbeddingFormat::Auto.resolve(Path::new("vectors.BIN")),
            EmbeddingFormat::Binary
        );
        assert_eq!(
            EmbeddingFormat::Auto.resolve(Path::new("vectors.txt")),
            EmbeddingFormat::Text
        );
        assert_eq!(
            EmbeddingFormat::Text.resolve(Path::new("vectors.bin")),
            EmbeddingFormat::Text
        );
    }

    #[test]
    fn optional_resources_default_to_none() {
        let config = ClassifierConfig::builder()
            .embedding_model("w2v.bin")
            .classifier_model("rf.json")
            .build()
            .unwrap();
        assert!(config.stopwords.is_none());
        assert!(config.noun_exceptions.is_none());
        assert!(config.lemma_index.is_none());
        assert_eq!(config.resolved_embedding_format(), EmbeddingFormat::Binary);
    }
}
