use axum::extract::{Query, State};
use axum::{Extension, Json};
use serde::Deserialize;
use stockbook_core::{CostBasis, SalesReport};

use super::scope;
use crate::auth::TenantContext;
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub basis: Option<String>,
}

/// Sales report; `basis` overrides the configured cost basis.
pub async fn sales(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Query(query): Query<ReportQuery>,
) -> ApiResult<Json<SalesReport>> {
    let basis = match query.basis.as_deref().map(str::trim) {
        None | Some("") => state.config.cost_basis,
        Some(raw) => raw.parse::<CostBasis>()?,
    };

    Ok(Json(scope(&state, &tenant).reports().sales_report(basis).await?))
}
