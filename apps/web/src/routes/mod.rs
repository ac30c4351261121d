//! # HTTP Routes
//!
//! ```text
//! GET  /health                      public
//! ─────────────────────────── bearer token required below ───────────────
//! GET  /dashboard
//! GET  /products          POST /products
//! GET  /products/{id}     PUT  /products/{id}      DELETE /products/{id}
//! GET  /customers         POST /customers
//! GET  /customers/{id}    DELETE /customers/{id}
//! GET  /suppliers         POST /suppliers
//! GET  /suppliers/{id}    DELETE /suppliers/{id}   POST /suppliers/{id}/payments
//! GET  /orders
//! GET  /orders/create     POST /orders/create      (url-encoded form, 303)
//! GET  /orders/{id}       POST /orders/{id}/status (url-encoded form)
//! GET  /reports?basis=snapshot|live
//! ```

pub mod customers;
pub mod dashboard;
pub mod orders;
pub mod products;
pub mod reports;
pub mod suppliers;

use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use stockbook_db::TenantScope;

use crate::auth::{auth_middleware, TenantContext};
use crate::AppState;

/// Builds the application router.
pub fn build_router(state: AppState) -> Router {
    let tenant_routes = Router::new()
        .route("/dashboard", get(dashboard::show))
        .route("/products", get(products::list).post(products::create))
        .route(
            "/products/{id}",
            get(products::show).put(products::update).delete(products::remove),
        )
        .route("/customers", get(customers::list).post(customers::create))
        .route("/customers/{id}", get(customers::show).delete(customers::remove))
        .route("/suppliers", get(suppliers::list).post(suppliers::create))
        .route("/suppliers/{id}", get(suppliers::show).delete(suppliers::remove))
        .route("/suppliers/{id}/payments", post(suppliers::record_payment))
        .route("/orders", get(orders::list))
        .route("/orders/create", get(orders::form).post(orders::create))
        .route("/orders/{id}", get(orders::show))
        .route("/orders/{id}/status", post(orders::update_status))
        .route("/reports", get(reports::sales))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/health", get(health))
        .merge(tenant_routes)
        .with_state(state)
}

/// Repositories for the request's tenant.
pub(crate) fn scope(state: &AppState, tenant: &TenantContext) -> TenantScope {
    state.db.tenant(tenant.tenant_id())
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    database: bool,
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<Health>) {
    if state.db.health_check().await {
        (
            StatusCode::OK,
            Json(Health {
                status: "ok",
                database: true,
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(Health {
                status: "degraded",
                database: false,
            }),
        )
    }
}
