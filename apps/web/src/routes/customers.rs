use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use stockbook_core::{Customer, CustomerDetail, CustomerInput};

use super::scope;
use crate::auth::TenantContext;
use crate::error::ApiResult;
use crate::AppState;

pub async fn list(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
) -> ApiResult<Json<Vec<Customer>>> {
    Ok(Json(scope(&state, &tenant).customers().list().await?))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Json(input): Json<CustomerInput>,
) -> ApiResult<(StatusCode, Json<Customer>)> {
    let customer = scope(&state, &tenant).customers().insert(&input).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

/// Customer with their orders; the order form redirects here.
pub async fn show(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<CustomerDetail>> {
    Ok(Json(scope(&state, &tenant).customers().detail(&id).await?))
}

/// Also deletes the customer's orders and their items.
pub async fn remove(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    scope(&state, &tenant).customers().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
