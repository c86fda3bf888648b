use super::types::{IndexBackend, ServiceConfig, StoreBackend};

use anyhow::{Context, Result, bail};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const ENV_CONFIG: &str = "MARKETPLACE_CONFIG";
pub const ENV_BIND: &str = "MARKETPLACE_BIND";
pub const ENV_LOG: &str = "MARKETPLACE_LOG";
pub const ENV_ELASTICSEARCH_URL: &str = "ELASTICSEARCH_URL";
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_RECORD_SERVICE_URL: &str = "RECORD_SERVICE_URL";

/// Flags accepted on the command line.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CliArgs {
    pub config: Option<PathBuf>,
    pub bind: Option<SocketAddr>,
}

impl CliArgs {
    /// Parses `--config <path>` and `--bind <addr:port>`; `args[0]` is the program name.
    /// Unknown flags are ignored.
    pub fn parse(args: &[String]) -> Result<Self> {
        let mut cli = CliArgs::default();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--config" => {
                    let value = args.get(i + 1).context("--config needs a path")?;
                    cli.config = Some(PathBuf::from(value));
                    i += 2;
                }
                "--bind" => {
                    let value = args.get(i + 1).context("--bind needs an address")?;
                    cli.bind = Some(
                        value
                            .parse()
                            .with_context(|| format!("invalid --bind address {}", value))?,
                    );
                    i += 2;
                }
                _ => {
                    i += 1;
                }
            }
        }

        Ok(cli)
    }
}

impl ServiceConfig {
    /// Reads a JSON config file. Missing sections and fields keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Resolves the full configuration: defaults, then the config file, then the
    /// environment, then command-line flags. The result is validated.
    pub fn load<F>(cli: &CliArgs, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = cli.config.clone().or_else(|| env(ENV_CONFIG).map(PathBuf::from));

        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        config.apply_env(&env)?;

        if let Some(bind) = cli.bind {
            config.bind = bind;
        }

        config.validate()?;
        Ok(config)
    }

    /// Overrides fields from environment variables.
    pub fn apply_env<F>(&mut self, env: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = env(ENV_BIND) {
            self.bind = bind
                .parse()
                .with_context(|| format!("invalid {} {}", ENV_BIND, bind))?;
        }
        if let Some(level) = env(ENV_LOG) {
            self.log_level = level;
        }
        if let Some(url) = env(ENV_ELASTICSEARCH_URL) {
            self.index.url = url;
        }
        if let Some(url) = env(ENV_DATABASE_URL) {
            self.store.database_url = Some(url);
        }
        if let Some(url) = env(ENV_RECORD_SERVICE_URL) {
            self.store.base_url = Some(url);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let search = &self.search;
        if search.max_limit == 0 {
            bail!("search.max_limit must be at least 1");
        }
        if search.default_limit == 0 || search.default_limit > search.max_limit {
            bail!(
                "search.default_limit must be within 1..={}, got {}",
                search.max_limit,
                search.default_limit
            );
        }

        if self.log_level.parse::<tracing::Level>().is_err() {
            bail!("unknown log_level {}", self.log_level);
        }

        match self.index.backend {
            IndexBackend::Elasticsearch => {
                if self.index.url.trim().is_empty() {
                    bail!("index.url is required for the elasticsearch backend");
                }
                if self.index.index_name.trim().is_empty() {
                    bail!("index.index_name must not be empty");
                }
            }
            IndexBackend::Memory => {
                if self.index.seed_path.is_none() {
                    tracing::warn!("In-memory index has no seed_path, every search will be empty");
                }
            }
        }
        if !(self.index.name_boost > 0.0) {
            bail!("index.name_boost must be positive");
        }

        match self.store.backend {
            StoreBackend::Postgres if self.store.database_url.is_none() => {
                bail!("store.database_url (or {}) is required for the postgres backend", ENV_DATABASE_URL)
            }
            StoreBackend::Http if self.store.base_url.is_none() => {
                bail!("store.base_url (or {}) is required for the http backend", ENV_RECORD_SERVICE_URL)
            }
            _ => {}
        }
        if self.store.max_connections == 0 {
            bail!("store.max_connections must be at least 1");
        }

        Ok(())
    }
}
