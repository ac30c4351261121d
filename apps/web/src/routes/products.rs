use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use stockbook_core::{Product, ProductInput};

use super::scope;
use crate::auth::TenantContext;
use crate::error::ApiResult;
use crate::AppState;

pub async fn list(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(scope(&state, &tenant).products().list().await?))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Json(input): Json<ProductInput>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let product = scope(&state, &tenant).products().insert(&input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn show(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<Product>> {
    Ok(Json(scope(&state, &tenant).products().get(&id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
    Json(input): Json<ProductInput>,
) -> ApiResult<Json<Product>> {
    Ok(Json(scope(&state, &tenant).products().update(&id, &input).await?))
}

/// Refused while any order item references the product.
pub async fn remove(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    scope(&state, &tenant).products().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
