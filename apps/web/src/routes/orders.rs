//! Order endpoints.
//!
//! `POST /orders/create` is a browser form post: it answers with a `303`
//! redirect in both outcomes, to the customer's page on success and back to
//! the form with the error message otherwise.

use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use axum::{Extension, Form, Json};
use serde::{Deserialize, Serialize};
use stockbook_core::{Order, OrderDetail, OrderFormData, OrderRequest, OrderSummary};
use tracing::debug;
use url::form_urlencoded;

use super::scope;
use crate::auth::TenantContext;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub async fn list(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
) -> ApiResult<Json<Vec<OrderSummary>>> {
    Ok(Json(scope(&state, &tenant).orders().list().await?))
}

#[derive(Debug, Deserialize)]
pub struct FormQuery {
    pub error: Option<String>,
}

/// Order form contents plus the error of the last failed submission.
#[derive(Debug, Serialize)]
pub struct OrderFormPage {
    #[serde(flatten)]
    pub form: OrderFormData,
    pub error: Option<String>,
}

pub async fn form(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Query(query): Query<FormQuery>,
) -> ApiResult<Json<OrderFormPage>> {
    let form = scope(&state, &tenant).orders().form_data().await?;
    Ok(Json(OrderFormPage {
        form,
        error: query.error.filter(|e| !e.is_empty()),
    }))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Redirect {
    let outcome = async {
        let request = OrderRequest::from_form_pairs(&pairs)?;
        let order = scope(&state, &tenant).orders().create(&request).await?;
        Ok::<Order, ApiError>(order)
    }
    .await;

    match outcome {
        Ok(order) => Redirect::to(&format!("/customers/{}", order.customer_id)),
        Err(err) => {
            debug!(tenant = %tenant.tenant_id(), error = %err, "Order form rejected");
            Redirect::to(&form_error_location(&err.message))
        }
    }
}

/// `/orders/create?error=<message>`
fn form_error_location(message: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(message.as_bytes()).collect();
    format!("/orders/create?error={}", encoded)
}

pub async fn show(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<OrderDetail>> {
    Ok(Json(scope(&state, &tenant).orders().detail(&id).await?))
}

#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

pub async fn update_status(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
    Form(form): Form<StatusForm>,
) -> ApiResult<Json<Order>> {
    let order = scope(&state, &tenant)
        .orders()
        .update_status(&id, &form.status)
        .await?;
    Ok(Json(order))
}
