//! Search Service Module
//!
//! The query path of the gateway: validate a free-text query, get ranked identifiers from
//! the text index, hydrate them from the record store, and answer in ranking order.
//!
//! ## Responsibilities
//! - **Validation**: Blank text and out-of-range limits are rejected before any backend call.
//! - **Fan-out**: One index lookup, then one store lookup per hit (or one multi-get).
//! - **Consistency**: An identifier the store cannot resolve fails the whole request.
//! - **API**: Axum handlers for the search endpoints.
//!
//! ## Submodules
//! - **`aggregator`**: The fan-out and hydration logic.
//! - **`errors`**: The error taxonomy and its HTTP mapping.
//! - **`handlers`**: HTTP request handlers for the Axum web server.
//! - **`types`**: Queries, result sets and wire DTOs.

pub mod aggregator;
pub mod errors;
pub mod handlers;
pub mod types;

#[cfg(test)]
mod tests;
