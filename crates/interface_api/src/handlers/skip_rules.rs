//! Skip rule handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use core_kernel::{SkipRuleId, TenantId};
use domain_approval::skip_rules::ApprovalSkipRule;

use crate::dto::skip_rules::{SkipRuleRequest, SkipRuleResponse};
use crate::error::ApiError;
use crate::AppState;

/// Lists all skip rules for a tenant, ordered by priority
pub async fn list_rules(
    State(state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
) -> Result<Json<Vec<SkipRuleResponse>>, ApiError> {
    let rules = state
        .service
        .list_skip_rules(TenantId::from(tenant_id))
        .await?;
    Ok(Json(rules.iter().map(SkipRuleResponse::from).collect()))
}

/// Creates a skip rule
pub async fn create_rule(
    State(state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
    Json(request): Json<SkipRuleRequest>,
) -> Result<(StatusCode, Json<SkipRuleResponse>), ApiError> {
    request.validate()?;
    let now = Utc::now();
    let rule = ApprovalSkipRule {
        id: SkipRuleId::new(),
        tenant_id: TenantId::from(tenant_id),
        name: request.name,
        priority: request.priority,
        is_active: request.is_active,
        conditions: request.conditions,
        scope: request.scope,
        created_at: now,
        updated_at: now,
    };

    let saved = state.service.upsert_skip_rule(rule).await?;
    Ok((StatusCode::CREATED, Json(SkipRuleResponse::from(&saved))))
}

/// Replaces an existing skip rule
pub async fn update_rule(
    State(state): State<AppState>,
    Path((tenant_id, rule_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<SkipRuleRequest>,
) -> Result<Json<SkipRuleResponse>, ApiError> {
    request.validate()?;
    let tenant_id = TenantId::from(tenant_id);
    let rule_id = SkipRuleId::from(rule_id);

    // Preserve creation time when the rule already exists
    let existing = state
        .service
        .list_skip_rules(tenant_id)
        .await?
        .into_iter()
        .find(|r| r.id == rule_id)
        .ok_or_else(|| ApiError::NotFound(format!("skip rule {rule_id}")))?;

    let rule = ApprovalSkipRule {
        id: rule_id,
        tenant_id,
        name: request.name,
        priority: request.priority,
        is_active: request.is_active,
        conditions: request.conditions,
        scope: request.scope,
        created_at: existing.created_at,
        updated_at: Utc::now(),
    };

    let saved = state.service.upsert_skip_rule(rule).await?;
    Ok(Json(SkipRuleResponse::from(&saved)))
}

/// Deletes a skip rule
pub async fn delete_rule(
    State(state): State<AppState>,
    Path((tenant_id, rule_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    state
        .service
        .delete_skip_rule(TenantId::from(tenant_id), SkipRuleId::from(rule_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
