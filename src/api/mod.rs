// ARCHITECTURE: API Module - Resource Endpoints
//
// Each resource module owns its record type, its ordered validation checks,
// its terminal handlers, and its slice of the router:
//
// 1. DISHES (dishes.rs): GET/POST /dishes, GET/PUT /dishes/{dish_id}
// 2. ORDERS (orders.rs): GET/POST /orders, GET/PUT/DELETE /orders/{order_id}
// 3. HEALTH (health.rs): GET /health liveness probe
//
// Request bodies arrive wrapped as { "data": { ... } } and every success
// response is wrapped the same way; rejects are { "error": <message> }.

pub mod dishes;
pub mod health;
pub mod orders;

use axum::{Router, http::Uri, routing::get};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::state::AppState;

/// Incoming `{ "data": { ... } }` request envelope.
///
/// `data` is optional so an empty body object still reaches the validation
/// pipeline, which owns the field-level messages.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub data: Option<T>,
}

/// Success payload wrapper; every 2xx body with content is `{ "data": ... }`.
#[derive(Debug, Serialize)]
pub struct Data<T> {
    pub data: T,
}

/// Assembles the full service router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .merge(dishes::router())
        .merge(orders::router())
        .fallback(not_found)
        .with_state(state)
}

/// Generic fallback for unmatched paths.
async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("Not found: {uri}"))
}
