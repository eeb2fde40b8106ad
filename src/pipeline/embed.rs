//! Embedding: token sequence → fixed-width document vector.
//!
//! The document vector is the element-wise mean of the word vectors of every
//! in-vocabulary token (repeats included). Out-of-vocabulary tokens are
//! dropped. When nothing is left the zero vector is returned, so the output
//! width is always [`WordVectors::dimension`].
//!
//! ## Artifact formats
//!
//! Both formats start with an ASCII `"<vocab size> <dimension>"` line.
//!
//! * **Text**: one `word v1 v2 … vD` line per entry.
//! * **Binary**: per entry: the word's UTF-8 bytes, a single space, then
//!   `D` little-endian `f32` values. Newlines between entries are skipped.

use super::normalize::TokenSequence;
use crate::config::EmbeddingFormat;
use crate::error::ConfigError;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Widest vector a header may declare.
pub const MAX_DIMENSION: usize = 1 << 16;

/// Upper bound on what a header may reserve up front; larger tables grow
/// as their rows are read.
const MAX_RESERVED_WORDS: usize = 1 << 16;
const MAX_RESERVED_VALUES: usize = 1 << 22;

/// An immutable word-embedding table.
#[derive(Debug, Clone)]
pub struct WordVectors {
    dimension: usize,
    index: HashMap<String, usize>,
    /// Row-major, `index.len() * dimension` values.
    data: Vec<f32>,
}

/// A document vector plus how many tokens fed into it.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    pub vector: Vec<f32>,
    pub tokens_in_vocabulary: usize,
}

impl WordVectors {
    /// Build a table from `(word, vector)` pairs. All vectors must have
    /// length `dimension`.
    pub fn from_entries<I, S>(dimension: usize, entries: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = (S, Vec<f32>)>,
        S: Into<String>,
    {
        if dimension == 0 {
            return Err("vector dimension must be at least 1".into());
        }
        let mut table = Self {
            dimension,
            index: HashMap::new(),
            data: Vec::new(),
        };
        for (word, vector) in entries {
            let word = word.into();
            if vector.len() != dimension {
                return Err(format!(
                    "vector for '{word}' has {} values, expected {dimension}",
                    vector.len()
                ));
            }
            table.insert(word, &vector);
        }
        Ok(table)
    }

    /// Load a word2vec artifact from disk.
    pub fn load(path: &Path, format: EmbeddingFormat) -> Result<Self, ConfigError> {
        let start = Instant::now();
        if !path.exists() {
            return Err(ConfigError::ArtifactNotFound {
                path: path.to_path_buf(),
            });
        }
        let file = File::open(path).map_err(|source| ConfigError::ArtifactUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let reader = BufReader::new(file);

        let parsed = match format.resolve(path) {
            EmbeddingFormat::Binary => Self::read_binary(reader),
            _ => Self::read_text(reader),
        };
        let table = parsed.map_err(|detail| ConfigError::CorruptEmbedding {
            path: path.to_path_buf(),
            detail,
        })?;

        info!(
            "Loaded embedding model: {} words × {} dims in {}ms",
            table.len(),
            table.dimension,
            start.elapsed().as_millis()
        );
        Ok(table)
    }

    /// Parse the text format.
    pub fn read_text(reader: impl BufRead) -> Result<Self, String> {
        let mut lines = reader.lines();
        let header = lines
            .next()
            .ok_or("file is empty")?
            .map_err(|e| e.to_string())?;
        let (count, dimension) = parse_header(&header)?;
        let mut table = Self::with_capacity(count, dimension)?;

        let mut rows = 0usize;
        for (i, line) in lines.enumerate() {
            let line = line.map_err(|e| e.to_string())?;
            if line.trim().is_empty() {
                continue;
            }
            let line_no = i + 2;
            let mut fields = line.split_whitespace();
            let word = fields.next().unwrap_or_default().to_string();
            let vector = fields
                .map(|f| f.parse::<f32>())
                .collect::<Result<Vec<f32>, _>>()
                .map_err(|e| format!("line {line_no}: {e}"))?;
            if vector.len() != dimension {
                return Err(format!(
                    "line {line_no}: expected {dimension} values, found {}",
                    vector.len()
                ));
            }
            table.insert(word, &vector);
            rows += 1;
        }

        check_row_count(rows, count)?;
        table.ensure_non_empty()?;
        Ok(table)
    }

    /// Parse the binary format.
    pub fn read_binary(mut reader: impl BufRead) -> Result<Self, String> {
        let mut header = String::new();
        reader
            .read_line(&mut header)
            .map_err(|e| format!("header: {e}"))?;
        let (count, dimension) = parse_header(&header)?;
        let mut table = Self::with_capacity(count, dimension)?;

        let row_bytes = dimension
            .checked_mul(std::mem::size_of::<f32>())
            .ok_or_else(|| format!("header dimension {dimension} is too large"))?;
        let mut word_buf = Vec::new();
        let mut vector_buf = vec![0u8; row_bytes];
        for row in 0..count {
            word_buf.clear();
            reader
                .read_until(b' ', &mut word_buf)
                .map_err(|e| format!("entry {row}: {e}"))?;
            if word_buf.last() != Some(&b' ') {
                return Err(format!("entry {row}: unexpected end of file"));
            }
            word_buf.pop();
            let word = String::from_utf8_lossy(&word_buf)
                .trim_start_matches(|c: char| c == '\n' || c == '\r')
                .to_string();

            reader
                .read_exact(&mut vector_buf)
                .map_err(|e| format!("entry {row} ('{word}'): {e}"))?;
            let vector: Vec<f32> = vector_buf
                .chunks_exact(4)
                .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect();
            table.insert(word, &vector);
        }

        table.ensure_non_empty()?;
        Ok(table)
    }

    /// Empty table sized from a header; the header itself is not trusted.
    fn with_capacity(count: usize, dimension: usize) -> Result<Self, String> {
        if dimension == 0 {
            return Err("vector dimension must be at least 1".into());
        }
        if dimension > MAX_DIMENSION {
            return Err(format!(
                "header dimension {dimension} exceeds the maximum of {MAX_DIMENSION}"
            ));
        }
        let words = count.min(MAX_RESERVED_WORDS);
        Ok(Self {
            dimension,
            index: HashMap::with_capacity(words),
            data: Vec::with_capacity(words.saturating_mul(dimension).min(MAX_RESERVED_VALUES)),
        })
    }

    fn insert(&mut self, word: String, vector: &[f32]) {
        if self.index.contains_key(&word) {
            warn!("Duplicate embedding entry '{}' ignored", word);
            return;
        }
        self.index.insert(word, self.index.len());
        self.data.extend_from_slice(vector);
    }

    fn ensure_non_empty(&self) -> Result<(), String> {
        if self.index.is_empty() {
            Err("vocabulary is empty".into())
        } else {
            Ok(())
        }
    }

    /// Width of every vector in the table.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of words in the vocabulary.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    pub fn get(&self, word: &str) -> Option<&[f32]> {
        self.index.get(word).map(|&row| {
            let start = row * self.dimension;
            &self.data[start..start + self.dimension]
        })
    }

    /// Iterate the vocabulary in no particular order.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    /// Mean vector of the in-vocabulary tokens, or zeros if there are none.
    pub fn embed(&self, tokens: &TokenSequence) -> Embedding {
        let mut sum = vec![0f64; self.dimension];
        let mut hits = 0usize;
        for vector in tokens.iter().filter_map(|t| self.get(t)) {
            for (acc, &v) in sum.iter_mut().zip(vector) {
                *acc += f64::from(v);
            }
            hits += 1;
        }

        let vector = if hits == 0 {
            vec![0f32; self.dimension]
        } else {
            sum.into_iter().map(|s| (s / hits as f64) as f32).collect()
        };
        Embedding {
            vector,
            tokens_in_vocabulary: hits,
        }
    }
}

fn parse_header(line: &str) -> Result<(usize, usize), String> {
    let mut fields = line.split_whitespace();
    let mut next = |what: &str| -> Result<usize, String> {
        fields
            .next()
            .ok_or_else(|| format!("header is missing the {what}"))?
            .parse::<usize>()
            .map_err(|e| format!("header {what}: {e}"))
    };
    let count = next("vocabulary size")?;
    let dimension = next("vector dimension")?;
    Ok((count, dimension))
}

fn check_row_count(rows: usize, declared: usize) -> Result<(), String> {
    if rows != declared {
        return Err(format!("header declares {declared} words, found {rows}"));
    }
    Ok(())
}
