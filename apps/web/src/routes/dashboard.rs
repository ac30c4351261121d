use axum::extract::State;
use axum::{Extension, Json};
use stockbook_core::Dashboard;

use super::scope;
use crate::auth::TenantContext;
use crate::error::ApiResult;
use crate::AppState;

pub async fn show(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
) -> ApiResult<Json<Dashboard>> {
    let dashboard = scope(&state, &tenant)
        .reports()
        .dashboard(state.config.low_stock_threshold)
        .await?;
    Ok(Json(dashboard))
}
