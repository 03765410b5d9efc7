//! HTTP route handlers for the store API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                           - Welcome message
//! GET  /health                     - Liveness check
//! GET  /health/ready               - Readiness check (database ping)
//!
//! # Users
//! POST   /api/users                - Register (public; first account becomes admin)
//! POST   /api/users/login          - Login, returns bearer token (public)
//! GET    /api/users                - List users (admin)
//! GET    /api/users/profile        - Own profile (user)
//! PUT    /api/users/profile        - Update own profile (user)
//! PUT    /api/users/profile/picture - Upload profile picture (user, multipart)
//! PUT    /api/users/{id}/admin     - Toggle admin role (admin, not self)
//! DELETE /api/users/{id}           - Delete user (admin, not self)
//!
//! # Products
//! GET    /api/products             - List catalog (public)
//! GET    /api/products/{id}        - Fetch one (public)
//! POST   /api/products             - Create (admin)
//! PUT    /api/products/{id}        - Update (admin)
//! DELETE /api/products/{id}        - Delete (admin)
//!
//! # Cart
//! GET    /api/cart                 - Own cart joined with live products (user)
//! POST   /api/cart                 - Upsert line {productId, quantity} (user)
//! DELETE /api/cart/{productId}     - Remove line, restore stock (user)
//!
//! # Orders
//! POST   /api/orders               - Place order from selected cart lines (user)
//! GET    /api/orders/my            - Own orders (user)
//! GET    /api/orders               - All orders (admin)
//! GET    /api/orders/{id}          - One order (owner or admin)
//! PUT    /api/orders/{id}/status   - Set status (admin)
//! ```

pub mod cart;
pub mod orders;
pub mod products;
pub mod users;

use axum::{
    Json, Router,
    http::{StatusCode, Uri},
    routing::{delete, get, post, put},
};
use serde_json::{Value, json};

use crate::state::AppState;

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(users::register).get(users::list))
        .route("/login", post(users::login))
        .route(
            "/profile",
            get(users::profile).put(users::update_profile),
        )
        .route("/profile/picture", put(users::upload_picture))
        .route("/{id}/admin", put(users::toggle_admin))
        .route("/{id}", delete(users::remove))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::remove),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).post(cart::upsert))
        .route("/{product_id}", delete(cart::remove))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::place).get(orders::list_all))
        .route("/my", get(orders::list_mine))
        .route("/{id}", get(orders::show))
        .route("/{id}/status", put(orders::set_status))
}

/// Create all routes for the store API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(welcome))
        .nest("/api/users", user_routes())
        .nest("/api/products", product_routes())
        .nest("/api/cart", cart_routes())
        .nest("/api/orders", order_routes())
        .fallback(not_found)
}

/// Root route: a small welcome document naming the endpoint groups.
async fn welcome() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the KnaveTone API!",
        "available_endpoints": ["/api/users", "/api/products", "/api/cart", "/api/orders"],
    }))
}

/// JSON 404 handler naming the missing path.
async fn not_found(uri: Uri) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Not Found",
            "message": format!("The endpoint {} does not exist.", uri.path()),
        })),
    )
}
