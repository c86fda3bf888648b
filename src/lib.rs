//! Marketplace Search Gateway Library
//!
//! This library crate defines the modules of the product search gateway. It serves as the
//! foundation for the binary executable (`main.rs`).
//!
//! ## Architecture Modules
//! A search is a two-stage fan-out: the text index ranks identifiers, the record store
//! hydrates them.
//!
//! - **`config`**: Layered service configuration (defaults, JSON file, environment, flags),
//!   including the analyzer policy handed to the text index.
//! - **`index`**: The ranking capability. An Elasticsearch HTTP adapter and an in-process
//!   index behind the `TextIndex` trait.
//! - **`store`**: The canonical records. Postgres, a peer gateway over HTTP, or an
//!   in-process map behind the `RecordStore` trait.
//! - **`search`**: Query validation, the aggregator that joins the two stages in rank
//!   order, the error taxonomy and the HTTP handlers.

pub mod config;
pub mod index;
pub mod search;
pub mod store;
