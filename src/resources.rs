//! Language resources for the normaliser: stopwords and noun exceptions.
//!
//! Both are plain word lists, loaded once at startup. The English defaults
//! are compiled into the binary from `resources/`; a configured file replaces
//! the default entirely.
//!
//! File syntax shared by every list: one entry per line, blank lines and
//! lines starting with `#` ignored.

use crate::error::ConfigError;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::debug;

const BUNDLED_STOPWORDS: &str = include_str!("../resources/stopwords_en.txt");
const BUNDLED_NOUN_EXCEPTIONS: &str = include_str!("../resources/noun_exceptions_en.txt");

/// Stopwords and irregular noun forms for one language.
#[derive(Debug, Clone)]
pub struct LanguageResources {
    pub stopwords: HashSet<String>,
    /// Inflected form → candidate lemmas, in file order.
    pub noun_exceptions: HashMap<String, Vec<String>>,
}

impl LanguageResources {
    /// The bundled English resources.
    pub fn english() -> Self {
        Self {
            stopwords: parse_word_list(BUNDLED_STOPWORDS),
            // The bundled file is covered by a unit test.
            noun_exceptions: parse_exceptions(BUNDLED_NOUN_EXCEPTIONS).unwrap_or_default(),
        }
    }

    /// Load resources, substituting the bundled English list for any path
    /// that is `None`.
    pub fn load(
        stopwords: Option<&Path>,
        noun_exceptions: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let defaults = Self::english();

        let stopwords = match stopwords {
            Some(path) => load_word_list(path)?,
            None => defaults.stopwords,
        };

        let noun_exceptions = match noun_exceptions {
            Some(path) => {
                let content = read_resource(path)?;
                parse_exceptions(&content).map_err(|detail| ConfigError::InvalidResource {
                    path: path.to_path_buf(),
                    detail,
                })?
            }
            None => defaults.noun_exceptions,
        };

        debug!(
            "Language resources: {} stopwords, {} noun exceptions",
            stopwords.len(),
            noun_exceptions.len()
        );
        Ok(Self {
            stopwords,
            noun_exceptions,
        })
    }
}

/// Load a one-word-per-line list such as a lemma index.
pub fn load_word_list(path: &Path) -> Result<HashSet<String>, ConfigError> {
    let content = read_resource(path)?;
    let words = parse_word_list(&content);
    if words.is_empty() {
        return Err(ConfigError::InvalidResource {
            path: path.to_path_buf(),
            detail: "list is empty".into(),
        });
    }
    Ok(words)
}

fn read_resource(path: &Path) -> Result<String, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::ArtifactNotFound {
            path: path.to_path_buf(),
        });
    }
    std::fs::read_to_string(path).map_err(|source| ConfigError::ArtifactUnreadable {
        path: path.to_path_buf(),
        source,
    })
}

fn entries(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

fn parse_word_list(content: &str) -> HashSet<String> {
    entries(content).map(|(_, w)| w.to_string()).collect()
}

fn parse_exceptions(content: &str) -> Result<HashMap<String, Vec<String>>, String> {
    let mut map = HashMap::new();
    for (line_no, line) in entries(content) {
        let mut fields = line.split_whitespace();
        let inflected = fields.next().unwrap_or_default();
        let lemmas: Vec<String> = fields.map(str::to_string).collect();
        if lemmas.is_empty() {
            return Err(format!("line {line_no}: expected '<inflected> <lemma>…'"));
        }
        map.insert(inflected.to_string(), lemmas);
    }
    Ok(map)
}
