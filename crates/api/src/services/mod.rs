//! Business logic services.
//!
//! Services sit between route handlers and the repository layer: they own
//! transactions and enforce the store's invariants (stock reconciliation,
//! order snapshots, status workflow, credential handling).

pub mod auth;
pub mod cart;
pub mod orders;

pub use auth::AuthService;
pub use cart::CartService;
pub use orders::OrderService;
