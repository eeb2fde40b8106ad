//! Pipeline stages for document classification.
//!
//! Each submodule implements exactly one transformation step and can be
//! tested on its own.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ normalize ──▶ embed ──▶ classify
//! (bytes)   (lopdf)     (tokens)      (mean)    (model)
//! ```
//!
//! 1. [`input`]     — the uploaded bytes and filename
//! 2. [`extract`]   — per-page text layer, concatenated in page order
//! 3. [`normalize`] — lowercase, letters only, stopwords out, lemmatised via
//!    [`lemmatize`]
//! 4. [`embed`]     — mean word vector, zero vector when nothing is known
//! 5. [`classify`]  — forest or linear model over the document vector

pub mod classify;
pub mod embed;
pub mod extract;
pub mod input;
pub mod lemmatize;
pub mod normalize;
