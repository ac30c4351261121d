use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use stockbook_core::{NewSupplierPayment, Supplier, SupplierDetail, SupplierInput, SupplierPayment};

use super::scope;
use crate::auth::TenantContext;
use crate::error::ApiResult;
use crate::AppState;

pub async fn list(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
) -> ApiResult<Json<Vec<Supplier>>> {
    Ok(Json(scope(&state, &tenant).suppliers().list().await?))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Json(input): Json<SupplierInput>,
) -> ApiResult<(StatusCode, Json<Supplier>)> {
    let supplier = scope(&state, &tenant).suppliers().insert(&input).await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

/// Supplier with products, payments and the balance still due.
pub async fn show(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<SupplierDetail>> {
    Ok(Json(scope(&state, &tenant).suppliers().detail(&id).await?))
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    scope(&state, &tenant).suppliers().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn record_payment(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
    Json(input): Json<NewSupplierPayment>,
) -> ApiResult<(StatusCode, Json<SupplierPayment>)> {
    let payment = scope(&state, &tenant)
        .suppliers()
        .record_payment(&id, &input)
        .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}
