use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Stop words applied by the default analyzer (Russian and English catalog text).
pub const DEFAULT_STOPWORDS: &str = "а,без,более,бы,был,была,были,было,быть,в,вам,вас,весь,во,вот,все,всего,всех,вы,где,да,даже,для,до,его,ее,если,есть,еще,же,за,здесь,и,из,или,им,их,к,как,ко,когда,кто,ли,либо,мне,может,мы,на,надо,наш,не,него,нее,нет,ни,них,но,ну,о,об,однако,он,она,они,оно,от,очень,по,под,при,с,со,так,также,такой,там,те,тем,то,того,тоже,той,только,том,ты,у,уже,хотя,чего,чей,чем,что,чтобы,чье,чья,эта,эти,это,я,a,an,and,are,as,at,be,but,by,for,if,in,into,is,it,no,not,of,on,or,such,that,the,their,then,there,these,they,this,to,was,will,with";

/// Top-level service configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    /// Address the HTTP gateway listens on.
    pub bind: SocketAddr,
    /// Max tracing level: `error`, `warn`, `info`, `debug` or `trace`.
    pub log_level: String,
    pub search: SearchSettings,
    pub index: IndexConfig,
    pub store: StoreConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            log_level: "info".to_string(),
            search: SearchSettings::default(),
            index: IndexConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

/// Bounds and lookup mode for the aggregator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchSettings {
    /// Largest `limit` a caller may ask for.
    pub max_limit: usize,
    /// Limit used when the request carries none.
    pub default_limit: usize,
    /// Hydrate with one multi-get instead of one lookup per hit.
    pub batch_lookup: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_limit: 100,
            default_limit: 10,
            batch_lookup: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackend {
    Elasticsearch,
    Memory,
}

/// Where ranking comes from, and the analysis policy handed to it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IndexConfig {
    pub backend: IndexBackend,
    /// Base URL of the search engine, e.g. `http://localhost:9200`.
    pub url: String,
    pub index_name: String,
    pub timeout_ms: u64,
    /// Relevance weight of the `name` field relative to `text`.
    pub name_boost: f32,
    pub fuzziness: String,
    /// Create the index with the configured analysis settings at startup if absent.
    pub create_if_missing: bool,
    /// JSON array of `{id, name, text, tags}` documents for the in-memory backend.
    pub seed_path: Option<PathBuf>,
    pub analyzer: AnalyzerConfig,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            backend: IndexBackend::Elasticsearch,
            url: "http://localhost:9200".to_string(),
            index_name: "search-documents".to_string(),
            timeout_ms: 2_000,
            name_boost: 3.0,
            fuzziness: "AUTO".to_string(),
            create_if_missing: false,
            seed_path: None,
            analyzer: AnalyzerConfig::default(),
        }
    }
}

/// Text analysis policy: language, stop words and synonyms.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Name the analyzer is registered under in the search engine.
    pub analyzer_name: String,
    /// Stemmer language.
    pub language: String,
    pub stopwords: Vec<String>,
    /// Synonym table, one rule per line (`a, b, c` or `a, b => c`).
    pub synonyms_path: Option<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            analyzer_name: "product_search_analyzer".to_string(),
            language: "russian".to_string(),
            stopwords: DEFAULT_STOPWORDS.split(',').map(str::to_string).collect(),
            synonyms_path: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Http,
    Memory,
}

/// Where canonical records are read from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Postgres connection string (`postgres` backend).
    pub database_url: Option<String>,
    pub max_connections: u32,
    /// Base URL of a peer gateway (`http` backend).
    pub base_url: Option<String>,
    pub timeout_ms: u64,
    /// JSON array of product objects for the in-memory backend.
    pub seed_path: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Postgres,
            database_url: None,
            max_connections: 5,
            base_url: None,
            timeout_ms: 2_000,
            seed_path: None,
        }
    }
}
