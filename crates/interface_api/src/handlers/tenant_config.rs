//! Tenant configuration handlers

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::TenantId;

use crate::dto::skip_rules::{AutoApprovalRequest, AutoApprovalResponse};
use crate::error::ApiError;
use crate::AppState;

/// Gets the tenant's auto-approval thresholds
pub async fn get_auto_approval(
    State(state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
) -> Result<Json<AutoApprovalResponse>, ApiError> {
    let config = state
        .service
        .auto_approval_config(TenantId::from(tenant_id))
        .await?;
    Ok(Json(config.into()))
}

/// Replaces the tenant's auto-approval thresholds
pub async fn put_auto_approval(
    State(state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
    Json(request): Json<AutoApprovalRequest>,
) -> Result<Json<AutoApprovalResponse>, ApiError> {
    request.validate()?;
    let config = request.into();
    state
        .service
        .put_auto_approval_config(TenantId::from(tenant_id), config)
        .await?;

    let stored = state
        .service
        .auto_approval_config(TenantId::from(tenant_id))
        .await?;
    Ok(Json(stored.into()))
}
