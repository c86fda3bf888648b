use super::TextIndex;
use super::protocol::{ENDPOINT_SEARCH, SearchResponse};
use super::types::{IndexError, RankedReference};
use crate::config::types::{AnalyzerConfig, IndexConfig};
use crate::store::types::RecordId;

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashSet;
use std::time::Duration;

const STOP_FILTER: &str = "catalog_stopwords";
const SYNONYM_FILTER: &str = "catalog_synonyms";
const STEMMER_FILTER: &str = "catalog_stemmer";

/// Text index backed by an Elasticsearch-compatible engine over HTTP.
///
/// Each whitespace-separated word of the query becomes a required `multi_match` over
/// `name` (boosted) and `text`, analysed with the configured analyzer and fuzziness.
/// Configured stop words are left out of the query, the same as in the memory index.
/// Only hit identifiers are requested; stored sources are never used.
pub struct ElasticIndex {
    http_client: reqwest::Client,
    base_url: String,
    index_name: String,
    timeout: Duration,
    name_boost: f32,
    fuzziness: String,
    analyzer: AnalyzerConfig,
    stopwords: HashSet<String>,
}

impl ElasticIndex {
    pub fn new(config: &IndexConfig) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            index_name: config.index_name.clone(),
            timeout: Duration::from_millis(config.timeout_ms),
            name_boost: config.name_boost,
            fuzziness: config.fuzziness.clone(),
            analyzer: config.analyzer.clone(),
            stopwords: config
                .analyzer
                .stopwords
                .iter()
                .map(|w| w.to_lowercase())
                .collect(),
        }
    }

    fn query_words<'a>(&self, text: &'a str) -> Vec<&'a str> {
        text.split_whitespace()
            .filter(|word| !self.stopwords.contains(&word.to_lowercase()))
            .collect()
    }

    fn index_url(&self) -> String {
        format!("{}/{}", self.base_url, self.index_name)
    }

    /// Request body for a ranked-identifier search.
    pub fn search_body(&self, text: &str, limit: usize) -> Value {
        let name_field = format!("name^{}", self.name_boost);
        let must: Vec<Value> = self
            .query_words(text)
            .into_iter()
            .map(|word| {
                json!({
                    "multi_match": {
                        "query": word,
                        "fields": [name_field, "text"],
                        "analyzer": self.analyzer.analyzer_name,
                        "fuzziness": self.fuzziness,
                        "zero_terms_query": "all",
                    }
                })
            })
            .collect();

        json!({
            "from": 0,
            "size": limit,
            "_source": false,
            "query": { "bool": { "must": must } },
        })
    }

    pub async fn index_exists(&self) -> Result<bool, IndexError> {
        let response = self
            .http_client
            .head(self.index_url())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| IndexError::Transport(e.to_string()))?;

        match response.status() {
            s if s.is_success() => Ok(true),
            reqwest::StatusCode::NOT_FOUND => Ok(false),
            s => Err(IndexError::Status {
                status: s.as_u16(),
                body: String::new(),
            }),
        }
    }

    pub async fn create_index(&self) -> Result<(), IndexError> {
        let response = self
            .http_client
            .put(self.index_url())
            .json(&index_definition(&self.analyzer))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| IndexError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        tracing::info!(
            "Created index {} with analyzer {} ({})",
            self.index_name,
            self.analyzer.analyzer_name,
            self.analyzer.language
        );
        Ok(())
    }

    /// Creates the index if it does not exist yet. Returns whether it was created.
    pub async fn ensure_index(&self) -> Result<bool, IndexError> {
        if self.index_exists().await? {
            tracing::debug!("Index {} already exists", self.index_name);
            return Ok(false);
        }
        self.create_index().await?;
        Ok(true)
    }
}

#[async_trait]
impl TextIndex for ElasticIndex {
    async fn lookup(&self, text: &str, limit: usize) -> Result<Vec<RankedReference>, IndexError> {
        if self.query_words(text).is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let url = format!("{}/{}", self.index_url(), ENDPOINT_SEARCH);
        let response = self
            .http_client
            .post(url)
            .json(&self.search_body(text, limit))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| IndexError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| IndexError::Decode(e.to_string()))?;

        tracing::debug!(
            "Search engine returned {} hits for {:?}",
            body.hits.hits.len(),
            text
        );

        Ok(RankedReference::from_ordered(
            body.hits
                .hits
                .into_iter()
                .take(limit)
                .map(|hit| RecordId(hit.id)),
        ))
    }

    fn name(&self) -> &'static str {
        "elasticsearch"
    }
}

async fn status_error(response: reqwest::Response) -> IndexError {
    let status = response.status().as_u16();
    let mut body = response.text().await.unwrap_or_default();
    if body.len() > 512 {
        let cut = (0..=512).rev().find(|i| body.is_char_boundary(*i)).unwrap_or(0);
        body.truncate(cut);
    }
    IndexError::Status { status, body }
}

/// Index settings and mappings derived from the analyzer policy.
///
/// The analyzer chain is `lowercase → stop words → synonyms → stemmer`; the synonym
/// filter is left out when no synonym file is configured. `name` and `text` are analysed
/// text fields, `name.keyword` keeps the exact value.
pub fn index_definition(analyzer: &AnalyzerConfig) -> Value {
    let mut filters = serde_json::Map::new();
    filters.insert(
        STOP_FILTER.to_string(),
        json!({ "type": "stop", "stopwords": analyzer.stopwords }),
    );
    if let Some(path) = &analyzer.synonyms_path {
        filters.insert(
            SYNONYM_FILTER.to_string(),
            json!({ "type": "synonym", "synonyms_path": path }),
        );
    }
    filters.insert(
        STEMMER_FILTER.to_string(),
        json!({ "type": "stemmer", "language": analyzer.language }),
    );

    let mut chain = vec!["lowercase", STOP_FILTER];
    if analyzer.synonyms_path.is_some() {
        chain.push(SYNONYM_FILTER);
    }
    chain.push(STEMMER_FILTER);

    json!({
        "settings": {
            "index": { "mapping": { "total_fields": { "limit": 10000 } } },
            "analysis": {
                "filter": filters,
                "analyzer": {
                    (analyzer.analyzer_name.clone()): {
                        "type": "custom",
                        "tokenizer": "standard",
                        "filter": chain,
                    }
                }
            }
        },
        "mappings": {
            "properties": {
                "name": {
                    "type": "text",
                    "analyzer": analyzer.analyzer_name,
                    "fields": { "keyword": { "type": "keyword" } }
                },
                "text": { "type": "text", "analyzer": analyzer.analyzer_name },
                "price": { "type": "float" },
                "currency": { "type": "keyword" }
            }
        }
    })
}
