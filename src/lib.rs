//! # annual-report-classifier
//!
//! Decide whether a PDF is an annual report.
//!
//! The text layer of every page is extracted, normalised into lemmatised
//! tokens, averaged into a document vector with a pretrained word2vec table,
//! and handed to a pretrained classifier. Both models are opaque artifacts
//! loaded once at startup.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF bytes
//!  │
//!  ├─ 1. Extract    text layer per page via lopdf, page order
//!  ├─ 2. Normalise  lowercase, letters only, stopwords, noun lemmas
//!  ├─ 3. Embed      mean word2vec vector (zero vector if all OOV)
//!  ├─ 4. Classify   random forest / logistic regression
//!  └─ 5. Respond    "Annual Report" | "Non-Annual Report" | error kind
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use annual_report_classifier::{classify, ClassifierConfig, InferenceContext, RawDocument};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClassifierConfig::builder()
//!         .embedding_model("models/word2vec.txt")
//!         .classifier_model("models/random_forest.json")
//!         .build()?;
//!     let context = InferenceContext::load(&config)?;
//!
//!     let document = RawDocument::from_path("integrated_report_2023.pdf")?;
//!     let prediction = classify(&context, document)?;
//!     println!("{}", prediction.label);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `classify-report` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod context;
pub mod error;
pub mod infer;
pub mod output;
pub mod pipeline;
pub mod resources;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ClassifierConfig, ClassifierConfigBuilder, EmbeddingFormat};
pub use context::InferenceContext;
pub use error::{ConfigError, ErrorKind, RequestError};
pub use infer::{classify, classify_async, inspect, respond};
pub use output::{InferenceResponse, Label, PipelineStats, Prediction, PredictionResult};
pub use pipeline::classify::{Classifier, ClassifierModel};
pub use pipeline::extract::DocumentInfo;
pub use pipeline::input::RawDocument;
