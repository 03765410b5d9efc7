//! Integration tests for the order workflow.
//!
//! These tests verify the status transition graph and snapshot total
//! arithmetic without requiring a database.

#![allow(clippy::unwrap_used)]

use knavetone_api::models::{Order, OrderLine};
use knavetone_api::services::orders::snapshot_total;
use knavetone_core::{OrderId, OrderLineId, OrderStatus, ProductId};

// =============================================================================
// Status Graph Tests
// =============================================================================

#[test]
fn test_valid_transitions() {
    let valid = [
        (OrderStatus::Pending, OrderStatus::Processing),
        (OrderStatus::Pending, OrderStatus::Cancelled),
        (OrderStatus::Processing, OrderStatus::Shipped),
        (OrderStatus::Processing, OrderStatus::Cancelled),
        (OrderStatus::Shipped, OrderStatus::Delivered),
    ];

    for (from, to) in valid {
        assert!(from.can_transition_to(to), "{from} -> {to} should be valid");
    }
}

#[test]
fn test_invalid_transitions() {
    let invalid = [
        (OrderStatus::Pending, OrderStatus::Shipped), // must process first
        (OrderStatus::Pending, OrderStatus::Delivered),
        (OrderStatus::Shipped, OrderStatus::Cancelled), // already left the warehouse
        (OrderStatus::Shipped, OrderStatus::Pending),
        (OrderStatus::Delivered, OrderStatus::Pending), // terminal
        (OrderStatus::Delivered, OrderStatus::Cancelled),
        (OrderStatus::Cancelled, OrderStatus::Processing), // terminal
        (OrderStatus::Cancelled, OrderStatus::Pending),
    ];

    for (from, to) in invalid {
        assert!(
            !from.can_transition_to(to),
            "{from} -> {to} should be rejected"
        );
    }
}

#[test]
fn test_terminal_states_allow_nothing() {
    let all = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    for terminal in [OrderStatus::Delivered, OrderStatus::Cancelled] {
        assert!(terminal.is_terminal());
        for to in all {
            assert!(!terminal.can_transition_to(to));
        }
    }
}

#[test]
fn test_full_happy_path() {
    // Pending -> Processing -> Shipped -> Delivered, step by step
    let path = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ];

    for pair in path.windows(2) {
        assert!(pair[0].can_transition_to(pair[1]));
    }
}

#[test]
fn test_status_labels_roundtrip() {
    for status in [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ] {
        let label = status.to_string();
        let parsed: OrderStatus = label.parse().expect("label should parse back");
        assert_eq!(parsed, status);
    }
}

#[test]
fn test_unknown_status_label_rejected() {
    assert!("Refunded".parse::<OrderStatus>().is_err());
    assert!("pending ".parse::<OrderStatus>().is_err());
    assert!(String::new().parse::<OrderStatus>().is_err());
}

// =============================================================================
// Snapshot Total Tests
// =============================================================================

fn snapshot_line(name: &str, price: &str, quantity: i32) -> OrderLine {
    OrderLine {
        id: OrderLineId::new(0),
        order_id: OrderId::new(0),
        product_id: ProductId::new(1),
        name: name.to_string(),
        price: price.parse().expect("test price"),
        quantity,
        image: None,
    }
}

#[test]
fn test_total_sums_price_times_quantity() {
    let lines = vec![
        snapshot_line("Stratocaster", "799.99", 1),
        snapshot_line("Tube Screamer", "99.99", 2),
    ];

    assert_eq!(snapshot_total(&lines), "999.97".parse().unwrap());
}

#[test]
fn test_total_is_immutable_under_catalog_edits() {
    // The stored total must always equal the sum over the snapshot lines;
    // a price change in the catalog does not touch either side.
    let lines = vec![snapshot_line("D-28", "3199.00", 1)];
    let stored_total = Order::compute_total(&lines);

    // catalog price doubles; snapshot lines are untouched
    assert_eq!(snapshot_total(&lines), stored_total);
}

#[test]
fn test_total_exact_decimal_arithmetic() {
    // 0.10 x 3 must be exactly 0.30, not a float approximation
    let lines = vec![snapshot_line("Pick", "0.10", 3)];
    assert_eq!(snapshot_total(&lines), "0.30".parse().unwrap());
}

// =============================================================================
// Schema Contract Tests
// =============================================================================

#[test]
fn test_orders_schema_keeps_history_on_user_deletion() {
    // Orders are permanent sales records: no route deletes one, and deleting
    // an account must not take its order history along. The orders table
    // therefore carries no foreign key back to users (the only cascade is
    // order_lines -> orders).
    let ddl = include_str!("../../api/migrations/20260801000004_create_orders.sql");

    let orders_table = ddl
        .split("CREATE TABLE order_lines")
        .next()
        .expect("orders DDL present");

    assert!(
        !orders_table.contains("REFERENCES users"),
        "orders.user_id must be a weak reference"
    );
    assert!(
        !orders_table.contains("ON DELETE CASCADE"),
        "nothing may cascade into orders"
    );
}
