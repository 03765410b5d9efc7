//! Integration tests for the KnaveTone store.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p knavetone-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `order_workflow` - Order status graph and snapshot totals
//! - `cart_stock` - Stock reservation bookkeeping
//! - `auth_tokens` - Bearer token lifecycle
//! - `api_contract` - Error-to-status mapping and wire shapes
//!
//! The tests in `tests/` exercise the service and model layers directly and
//! do not need a running server or database. HTTP-level tests against a live
//! instance belong in a separate suite driven by the deployment environment.
