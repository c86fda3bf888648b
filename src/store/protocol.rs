//! Product Lookup Protocol
//!
//! Endpoint paths for reading single records over HTTP. The gateway serves them, and
//! [`HttpRecordStore`](super::remote::HttpRecordStore) consumes them from a peer.

/// Public endpoint prefix for product reads (`/products/:id`).
pub const ENDPOINT_PRODUCTS: &str = "/products";
