//! The process-wide inference context.
//!
//! [`InferenceContext`] owns everything loaded at startup: the normaliser
//! (stopwords, noun exceptions, lemma index), the word-embedding table and
//! the classifier. It is immutable once built and `Send + Sync`, so one
//! instance can be shared by reference or `Arc` across any number of
//! concurrent requests without locking.
//!
//! The only way to obtain a context is a successful load, which includes the
//! embedding/classifier dimension check. A process that failed to load has
//! nothing to run inference with.

use crate::config::ClassifierConfig;
use crate::error::ConfigError;
use crate::pipeline::classify::{Classifier, ClassifierModel};
use crate::pipeline::embed::WordVectors;
use crate::pipeline::lemmatize::NounLemmatizer;
use crate::pipeline::normalize::Normalizer;
use crate::resources::{self, LanguageResources};
use std::collections::HashSet;
use std::fmt;
use std::time::Instant;
use tracing::{debug, info};

/// Loaded models and language resources.
pub struct InferenceContext {
    normalizer: Normalizer,
    embeddings: WordVectors,
    classifier: Box<dyn Classifier>,
}

impl InferenceContext {
    /// Load every artifact named in `config`.
    ///
    /// # Errors
    /// Any missing, unreadable, or corrupt artifact, and a classifier whose
    /// input width differs from the embedding dimension.
    pub fn load(config: &ClassifierConfig) -> Result<Self, ConfigError> {
        let start = Instant::now();
        info!("Loading inference context");

        let classifier = ClassifierModel::load(&config.classifier_model)?;
        let embeddings =
            WordVectors::load(&config.embedding_model, config.resolved_embedding_format())?;
        check_dimensions(&classifier, &embeddings)?;

        let resources =
            LanguageResources::load(config.stopwords.as_deref(), config.noun_exceptions.as_deref())?;
        let lemma_index = match config.lemma_index.as_deref() {
            Some(path) => resources::load_word_list(path)?,
            None => embeddings.words().map(str::to_string).collect(),
        };

        let context = Self::from_parts(resources, lemma_index, embeddings, Box::new(classifier))?;
        info!(
            "Inference context ready in {}ms",
            start.elapsed().as_millis()
        );
        Ok(context)
    }

    /// Assemble a context from already-loaded parts.
    pub fn from_parts(
        resources: LanguageResources,
        lemma_index: HashSet<String>,
        embeddings: WordVectors,
        classifier: Box<dyn Classifier>,
    ) -> Result<Self, ConfigError> {
        check_dimensions(classifier.as_ref(), &embeddings)?;
        let lemmatizer = NounLemmatizer::new(resources.noun_exceptions, lemma_index);
        debug!(
            "Lemma index: {} entries, {} stopwords",
            lemmatizer.index_len(),
            resources.stopwords.len()
        );
        Ok(Self {
            normalizer: Normalizer::new(resources.stopwords, lemmatizer),
            embeddings,
            classifier,
        })
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn embeddings(&self) -> &WordVectors {
        &self.embeddings
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    /// Width of every document vector.
    pub fn dimension(&self) -> usize {
        self.embeddings.dimension()
    }
}

impl fmt::Debug for InferenceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceContext")
            .field("vocabulary", &self.embeddings.len())
            .field("dimension", &self.embeddings.dimension())
            .field("classifier", &self.classifier)
            .finish()
    }
}

fn check_dimensions(
    classifier: &dyn Classifier,
    embeddings: &WordVectors,
) -> Result<(), ConfigError> {
    if classifier.input_dimension() != embeddings.dimension() {
        return Err(ConfigError::DimensionMismatch {
            classifier_dim: classifier.input_dimension(),
            embedding_dim: embeddings.dimension(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logistic(n: usize) -> Box<dyn Classifier> {
        let json = format!(
            r#"{{ "kind": "logistic_regression", "n_features": {n},
                 "coef": {:?}, "intercept": 0.0, "classes": [0, 1] }}"#,
            vec![1.0f32; n]
        );
        Box::new(ClassifierModel::from_json(&json).unwrap())
    }

    fn vectors(dim: usize) -> WordVectors {
        WordVectors::from_entries(dim, vec![("report", vec![1.0; dim])]).unwrap()
    }

    #[test]
    fn mismatched_dimensions_are_fatal() {
        let err = InferenceContext::from_parts(
            LanguageResources::english(),
            HashSet::new(),
            vectors(100),
            logistic(300),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::DimensionMismatch {
                classifier_dim: 300,
                embedding_dim: 100
            }
        ));
    }

    #[test]
    fn matching_dimensions_build() {
        let ctx = InferenceContext::from_parts(
            LanguageResources::english(),
            HashSet::new(),
            vectors(4),
            logistic(4),
        )
        .unwrap();
        assert_eq!(ctx.dimension(), 4);
        assert_eq!(ctx.classifier().input_dimension(), 4);
    }

    #[test]
    fn context_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<InferenceContext>();
    }
}
