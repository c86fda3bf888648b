use super::TextIndex;
use super::analyzer::Analyzer;
use super::types::{IndexDocument, IndexError, RankedReference};
use crate::store::types::RecordId;

use anyhow::{Context, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

struct IndexedDoc {
    seq: u64,
    name_terms: HashSet<String>,
    text_terms: HashSet<String>,
}

/// In-process text index.
///
/// Every query term has to appear in the document's `name` or `text`; tags are indexed
/// as part of `text`. The score is the number of matching terms, with `name` matches
/// weighted by `name_boost`. Equal scores
/// keep the order in which documents were first added.
pub struct MemoryIndex {
    analyzer: Analyzer,
    name_boost: f32,
    docs: DashMap<RecordId, IndexedDoc>,
    next_seq: AtomicU64,
}

impl MemoryIndex {
    pub fn new(analyzer: Analyzer, name_boost: f32) -> Self {
        Self {
            analyzer,
            name_boost,
            docs: DashMap::new(),
            next_seq: AtomicU64::new(0),
        }
    }

    /// Reads a JSON array of [`IndexDocument`]s into the index.
    pub fn load_json_file(&self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading index seed {}", path.display()))?;
        let documents: Vec<IndexDocument> = serde_json::from_str(&text)
            .with_context(|| format!("parsing index seed {}", path.display()))?;

        let count = documents.len();
        for document in documents {
            self.add(document);
        }

        tracing::info!("Indexed {} documents from {}", count, path.display());
        Ok(count)
    }

    /// Adds or replaces a document. A replaced document keeps its original position
    /// for tie-breaking.
    pub fn add(&self, document: IndexDocument) {
        let id = RecordId(document.id);
        let seq = match self.docs.get(&id) {
            Some(existing) => existing.seq,
            None => self.next_seq.fetch_add(1, Ordering::Relaxed),
        };

        let mut text_terms = self.analyzer.tokenize_text(&document.text);
        for tag in &document.tags {
            text_terms.extend(self.analyzer.tokenize_text(tag));
        }

        let indexed = IndexedDoc {
            seq,
            name_terms: self.analyzer.tokenize_text(&document.name),
            text_terms,
        };
        self.docs.insert(id, indexed);
    }

    pub fn remove(&self, id: &RecordId) -> bool {
        self.docs.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    fn score(&self, doc: &IndexedDoc, terms: &[String]) -> Option<f32> {
        let mut score = 0.0;
        for term in terms {
            let in_name = doc.name_terms.contains(term);
            let in_text = doc.text_terms.contains(term);
            if !in_name && !in_text {
                return None;
            }
            if in_name {
                score += self.name_boost;
            }
            if in_text {
                score += 1.0;
            }
        }
        Some(score)
    }
}

#[async_trait]
impl TextIndex for MemoryIndex {
    async fn lookup(&self, text: &str, limit: usize) -> Result<Vec<RankedReference>, IndexError> {
        let terms = self.analyzer.tokenize_query(text);
        if terms.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let mut hits: Vec<(f32, u64, RecordId)> = self
            .docs
            .iter()
            .filter_map(|entry| {
                self.score(entry.value(), &terms)
                    .map(|score| (score, entry.value().seq, entry.key().clone()))
            })
            .collect();

        hits.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
        hits.truncate(limit);

        tracing::debug!("Memory index: {:?} matched {} documents", terms, hits.len());

        Ok(RankedReference::from_ordered(
            hits.into_iter().map(|(_, _, id)| id),
        ))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
