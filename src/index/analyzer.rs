use crate::config::types::AnalyzerConfig;

use anyhow::{Context, Result};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::LazyLock;

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}\p{N}]+").expect("word pattern is valid"));

/// Maps every synonym to one canonical term, so equivalent words compare equal.
///
/// Rules use the usual synonym-file syntax:
/// - `tv, television, телевизор` makes all three equivalent (the first is canonical);
/// - `notebook, laptop => ноутбук` rewrites the left side to the right side.
///
/// Blank lines and `#` comments are skipped. Multi-word entries are ignored, because
/// matching happens on single tokens.
#[derive(Debug, Default, Clone)]
pub struct SynonymTable {
    canonical: HashMap<String, String>,
}

impl SynonymTable {
    pub fn parse(rules: &str) -> Self {
        let mut canonical = HashMap::new();

        for line in rules.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (sources, target) = match line.split_once("=>") {
                Some((lhs, rhs)) => (lhs, rhs.split(',').next().map(normalize_term)),
                None => (line, line.split(',').next().map(normalize_term)),
            };
            let Some(Some(target)) = target else {
                continue;
            };

            for source in sources.split(',').filter_map(normalize_term) {
                if source != target {
                    canonical.insert(source, target.clone());
                }
            }
        }

        Self { canonical }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let rules = std::fs::read_to_string(path)
            .with_context(|| format!("reading synonyms {}", path.display()))?;
        Ok(Self::parse(&rules))
    }

    pub fn canonical<'a>(&'a self, token: &'a str) -> &'a str {
        self.canonical.get(token).map(String::as_str).unwrap_or(token)
    }

    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }
}

fn normalize_term(term: &str) -> Option<String> {
    let term = term.trim().to_lowercase();
    if term.is_empty() || term.contains(char::is_whitespace) {
        None
    } else {
        Some(term)
    }
}

/// Lowercasing word tokenizer with stop-word removal and synonym folding.
#[derive(Debug, Default, Clone)]
pub struct Analyzer {
    stopwords: HashSet<String>,
    synonyms: SynonymTable,
}

impl Analyzer {
    pub fn new(stopwords: impl IntoIterator<Item = String>, synonyms: SynonymTable) -> Self {
        Self {
            stopwords: stopwords.into_iter().map(|w| w.to_lowercase()).collect(),
            synonyms,
        }
    }

    /// Builds the analyzer described by `config`, reading the synonym file if one is set.
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self> {
        let synonyms = match &config.synonyms_path {
            Some(path) => SynonymTable::load(path)?,
            None => SynonymTable::default(),
        };
        Ok(Self::new(config.stopwords.iter().cloned(), synonyms))
    }

    /// Distinct terms of a document field.
    pub fn tokenize_text(&self, text: &str) -> HashSet<String> {
        self.terms(text).collect()
    }

    /// Terms of a query, in order, duplicates kept.
    pub fn tokenize_query(&self, query: &str) -> Vec<String> {
        self.terms(query).collect()
    }

    fn terms<'a>(&'a self, text: &'a str) -> impl Iterator<Item = String> + 'a {
        WORD_RE
            .find_iter(text)
            .map(|m| m.as_str().to_lowercase())
            .filter(|word| !self.stopwords.contains(word))
            .map(|word| self.synonyms.canonical(&word).to_string())
    }
}
