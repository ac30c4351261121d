//! # Stockbook Web
//!
//! HTTP surface over the Stockbook engine.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Request Path                                   │
//! │                                                                         │
//! │  HTTP ──► auth_middleware ──► handler ──► TenantScope ──► SQLite       │
//! │           (Bearer JWT,        (thin:       (stockbook-db:               │
//! │            sub = tenant)       decode,      ledger, order engine,       │
//! │                                map errors)  reports)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables (see [`config::WebConfig`]):
//! - `STOCKBOOK_BIND_ADDR` - listen address (default: 0.0.0.0:8080)
//! - `STOCKBOOK_DB_PATH` - SQLite file (default: ./stockbook.db)
//! - `STOCKBOOK_DB_MAX_CONNECTIONS` - pool size (default: 5)
//! - `STOCKBOOK_JWT_SECRET` - token signing secret
//! - `STOCKBOOK_TOKEN_LIFETIME_SECS` - token lifetime (default: 3600)
//! - `STOCKBOOK_LOW_STOCK_THRESHOLD` - dashboard threshold (default: 10)
//! - `STOCKBOOK_COST_BASIS` - `snapshot` or `live` (default: snapshot)

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use stockbook_db::Database;
use tracing_subscriber::EnvFilter;

// Re-exports
pub use auth::TokenManager;
pub use config::WebConfig;
pub use error::ApiError;
pub use routes::build_router;

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,stockbook=debug,sqlx=warn";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub tokens: Arc<TokenManager>,
    pub config: Arc<WebConfig>,
}

impl AppState {
    pub fn new(db: Database, config: WebConfig) -> Self {
        AppState {
            db,
            tokens: Arc::new(TokenManager::new(
                &config.jwt_secret,
                config.token_lifetime_secs,
            )),
            config: Arc::new(config),
        }
    }
}

/// Initializes the global tracing subscriber.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use stockbook_core::TenantId;
    use stockbook_db::DbConfig;
    use tower::ServiceExt;

    struct TestApp {
        router: Router,
        state: AppState,
    }

    impl TestApp {
        async fn new() -> Self {
            let db = Database::new(DbConfig::in_memory()).await.unwrap();
            let config = WebConfig::from_lookup(|key| match key {
                "STOCKBOOK_JWT_SECRET" => Some("router-test-secret".to_string()),
                _ => None,
            })
            .unwrap();
            let state = AppState::new(db, config);
            TestApp {
                router: build_router(state.clone()),
                state,
            }
        }

        fn token(&self, tenant: &str) -> String {
            self.state
                .tokens
                .issue(&TenantId::new(tenant).unwrap())
                .unwrap()
        }

        async fn send(&self, request: Request<Body>) -> (StatusCode, Option<String>, Value) {
            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let location = response
                .headers()
                .get(header::LOCATION)
                .map(|v| v.to_str().unwrap().to_string());
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, location, body)
        }

        async fn get(&self, tenant: &str, uri: &str) -> (StatusCode, Value) {
            let request = Request::builder()
                .uri(uri)
                .header(header::AUTHORIZATION, format!("Bearer {}", self.token(tenant)))
                .body(Body::empty())
                .unwrap();
            let (status, _, body) = self.send(request).await;
            (status, body)
        }

        async fn post_json(&self, tenant: &str, uri: &str, body: Value) -> (StatusCode, Value) {
            let request = Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::AUTHORIZATION, format!("Bearer {}", self.token(tenant)))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap();
            let (status, _, body) = self.send(request).await;
            (status, body)
        }

        async fn post_form(&self, tenant: &str, uri: &str, form: &str) -> (StatusCode, Option<String>, Value) {
            let request = Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::AUTHORIZATION, format!("Bearer {}", self.token(tenant)))
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form.to_string()))
                .unwrap();
            self.send(request).await
        }

        async fn delete(&self, tenant: &str, uri: &str) -> (StatusCode, Value) {
            let request = Request::builder()
                .method("DELETE")
                .uri(uri)
                .header(header::AUTHORIZATION, format!("Bearer {}", self.token(tenant)))
                .body(Body::empty())
                .unwrap();
            let (status, _, body) = self.send(request).await;
            (status, body)
        }

        /// Product with unit cost 17.60 and a customer, as in the worked example.
        async fn seed(&self, tenant: &str, quantity: i64) -> (String, String) {
            let (status, product) = self
                .post_json(
                    tenant,
                    "/products",
                    json!({
                        "sku": "P1",
                        "name": "Widget",
                        "supplier_id": null,
                        "quantity": quantity,
                        "wholesale_price_cents": 1000,
                        "import_charge_cents": 2000,
                        "total_weight_milli": 2000,
                        "per_weight_cost_cents": 500,
                        "domestic_charge_cents": 800
                    }),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED, "{}", product);

            let (status, customer) = self
                .post_json(
                    tenant,
                    "/customers",
                    json!({ "name": "Karim", "phone": "0100", "address": null }),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED, "{}", customer);

            (
                product["id"].as_str().unwrap().to_string(),
                customer["id"].as_str().unwrap().to_string(),
            )
        }
    }

    fn order_form(customer_id: &str, delivery: &str, lines: &[(&str, &str, &str)]) -> String {
        let mut form = url::form_urlencoded::Serializer::new(String::new());
        form.append_pair("customer_id", customer_id);
        form.append_pair("delivery_charge", delivery);
        for (product_id, quantity, price) in lines {
            form.append_pair("product_id[]", product_id);
            form.append_pair("quantity[]", quantity);
            form.append_pair("sale_price[]", price);
        }
        form.finish()
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let app = TestApp::new().await;
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, _, body) = app.send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_missing_or_bad_token_rejected() {
        let app = TestApp::new().await;

        let request = Request::builder().uri("/orders").body(Body::empty()).unwrap();
        let (status, _, body) = app.send(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHORIZED");

        let request = Request::builder()
            .uri("/orders")
            .header(header::AUTHORIZATION, "Bearer not-a-jwt")
            .body(Body::empty())
            .unwrap();
        let (status, _, _) = app.send(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_order_form_success_redirects_to_customer() {
        let app = TestApp::new().await;
        let (product_id, customer_id) = app.seed("acme", 5).await;

        let form = order_form(&customer_id, "10", &[(&product_id, "3", "25")]);
        let (status, location, _) = app.post_form("acme", "/orders/create", &form).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location.unwrap(), format!("/customers/{}", customer_id));

        let (status, detail) = app.get("acme", &format!("/customers/{}", customer_id)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(detail["orders"][0]["total_price_cents"], 8500);

        let (_, product) = app.get("acme", &format!("/products/{}", product_id)).await;
        assert_eq!(product["quantity"], 2);

        let (_, report) = app.get("acme", "/reports").await;
        assert_eq!(report["basis"], "snapshot");
        assert_eq!(report["total_sales_cents"], 8500);
        assert_eq!(report["total_cogs_cents"], 5280);
        assert_eq!(report["profit_cents"], 3220);
    }

    #[tokio::test]
    async fn test_order_form_failure_redirects_back_with_error() {
        let app = TestApp::new().await;
        let (product_id, customer_id) = app.seed("acme", 2).await;

        let form = order_form(&customer_id, "", &[(&product_id, "10", "25")]);
        let (status, location, _) = app.post_form("acme", "/orders/create", &form).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        let location = location.unwrap();
        assert!(location.starts_with("/orders/create?error="), "{}", location);
        assert!(location.contains("Insufficient+stock"), "{}", location);

        let (_, orders) = app.get("acme", "/orders").await;
        assert_eq!(orders.as_array().unwrap().len(), 0);
        let (_, product) = app.get("acme", &format!("/products/{}", product_id)).await;
        assert_eq!(product["quantity"], 2);

        let (status, page) = app.get("acme", &location).await;
        assert_eq!(status, StatusCode::OK);
        assert!(page["error"].as_str().unwrap().starts_with("Insufficient stock"));
        assert_eq!(page["products"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_order_form_rejected() {
        let app = TestApp::new().await;
        let (_, customer_id) = app.seed("acme", 5).await;

        let form = order_form(&customer_id, "5", &[]);
        let (status, location, _) = app.post_form("acme", "/orders/create", &form).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert!(location.unwrap().contains("at+least+one+item"));
    }

    #[tokio::test]
    async fn test_oversized_amounts_rejected_without_side_effects() {
        let app = TestApp::new().await;
        let (product_id, customer_id) = app.seed("acme", 5).await;

        let form = order_form(&customer_id, "", &[(&product_id, "2", "90000000000000000")]);
        let (status, location, _) = app.post_form("acme", "/orders/create", &form).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        let location = location.unwrap();
        assert!(
            location.contains("sale_price+must+be+between+0+and+100000000000"),
            "{}",
            location
        );

        let (_, orders) = app.get("acme", "/orders").await;
        assert_eq!(orders.as_array().unwrap().len(), 0);
        let (_, product) = app.get("acme", &format!("/products/{}", product_id)).await;
        assert_eq!(product["quantity"], 5);

        let (status, body) = app
            .post_json(
                "acme",
                "/products",
                json!({
                    "sku": "HUGE",
                    "name": "Huge",
                    "quantity": 1000,
                    "wholesale_price_cents": i64::MAX / 100
                }),
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "VALIDATION_FAILED");

        let (_, report) = app.get("acme", "/reports?basis=live").await;
        assert_eq!(report["total_sales_cents"], 0);
    }

    #[tokio::test]
    async fn test_tenants_cannot_see_each_other() {
        let app = TestApp::new().await;
        let (product_id, customer_id) = app.seed("acme", 5).await;

        let (status, body) = app.get("globex", &format!("/products/{}", product_id)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");

        // Ordering another tenant's product for another tenant's customer
        let form = order_form(&customer_id, "0", &[(&product_id, "1", "25")]);
        let (status, location, _) = app.post_form("globex", "/orders/create", &form).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert!(location.unwrap().contains("not+found"));

        let (_, product) = app.get("acme", &format!("/products/{}", product_id)).await;
        assert_eq!(product["quantity"], 5);

        let (_, products) = app.get("globex", "/products").await;
        assert!(products.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_status_update_and_delete_policies() {
        let app = TestApp::new().await;
        let (product_id, customer_id) = app.seed("acme", 5).await;

        let form = order_form(&customer_id, "0", &[(&product_id, "1", "25")]);
        app.post_form("acme", "/orders/create", &form).await;
        let (_, orders) = app.get("acme", "/orders").await;
        let order_id = orders[0]["id"].as_str().unwrap().to_string();

        let (status, _, order) = app
            .post_form("acme", &format!("/orders/{}/status", order_id), "status=Shipped")
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(order["status"], "Shipped");

        let (status, body) = app.delete("acme", &format!("/products/{}", product_id)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "DELETE_RESTRICTED");

        let (status, _) = app.delete("acme", &format!("/customers/{}", customer_id)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = app.get("acme", &format!("/orders/{}", order_id)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app.delete("acme", &format!("/products/{}", product_id)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_report_basis_query() {
        let app = TestApp::new().await;

        let (status, report) = app.get("acme", "/reports?basis=live").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["basis"], "live");
        assert_eq!(report["profit_cents"], 0);

        let (status, body) = app.get("acme", "/reports?basis=fifo").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "VALIDATION_FAILED");
    }

    #[tokio::test]
    async fn test_supplier_payment_and_balance() {
        let app = TestApp::new().await;
        let (status, supplier) = app
            .post_json(
                "acme",
                "/suppliers",
                json!({ "name": "Guangzhou Trading", "contact_person": null, "phone": "0900", "address": null }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let supplier_id = supplier["id"].as_str().unwrap();

        let (status, _) = app
            .post_json(
                "acme",
                &format!("/suppliers/{}/payments", supplier_id),
                json!({ "amount_cents": 2500 }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, detail) = app.get("acme", &format!("/suppliers/{}", supplier_id)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(detail["balance"]["total_paid_cents"], 2500);
        assert_eq!(detail["balance"]["total_due_cents"], -2500);

        let (status, _) = app
            .post_json(
                "globex",
                &format!("/suppliers/{}/payments", supplier_id),
                json!({ "amount_cents": 100 }),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_dashboard_uses_configured_threshold() {
        let app = TestApp::new().await;
        app.seed("acme", 5).await;

        let (status, dashboard) = app.get("acme", "/dashboard").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(dashboard["low_stock_threshold"], 10);
        assert_eq!(dashboard["low_stock_count"], 1);
        assert_eq!(dashboard["customer_count"], 1);
    }
}
