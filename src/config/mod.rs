//! Service Configuration Module
//!
//! Everything the gateway needs to know at startup: where to listen, which text index and
//! record store backends to wire in, the aggregator's limits, and the analyzer policy
//! handed to the search engine.
//!
//! ## Resolution Order
//! 1. Built-in defaults.
//! 2. A JSON file (`--config <path>` or `MARKETPLACE_CONFIG`).
//! 3. Environment overrides (`MARKETPLACE_BIND`, `ELASTICSEARCH_URL`, `DATABASE_URL`, ...).
//! 4. Command-line flags (`--bind`).

pub mod loader;
pub mod types;
