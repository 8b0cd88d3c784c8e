//! Claim handlers

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{ClaimId, DocumentId, EmployeeId, Money};
use domain_approval::claim::{ClaimEdits, DocumentRef};
use domain_approval::services::ClaimDraft;
use domain_approval::state_machine::ActionRequest;

use crate::dto::claims::*;
use crate::error::ApiError;
use crate::handlers::tenant_from_headers;
use crate::AppState;

/// Creates a claim and routes it through the approval workflow
pub async fn submit_claim(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<SubmitClaimRequest>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let tenant_id = tenant_from_headers(&headers)?;
    request.validate()?;

    let amount = Money::non_negative(request.amount, request.currency)
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let draft = ClaimDraft {
        employee_id: EmployeeId::from(request.employee_id),
        claim_type: request.claim_type,
        category: request.category,
        amount,
        claim_date: request.claim_date.into(),
        description: request.description.map(Into::into),
        vendor: request.vendor.map(Into::into),
        project_code: request.project_code.map(Into::into),
        transaction_ref: request.transaction_ref.map(Into::into),
        documents: request
            .documents
            .into_iter()
            .map(|d| {
                (
                    d.id.map(DocumentId::from).unwrap_or_default(),
                    d.file_name,
                )
            })
            .collect(),
        ai_confidence: request.ai_confidence,
    };

    let claim = state.service.submit_claim(tenant_id, draft).await?;
    Ok(Json(ClaimResponse::from(&claim)))
}

/// Gets a claim by ID
pub async fn get_claim(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let tenant_id = tenant_from_headers(&headers)?;
    let claim = state
        .service
        .get_claim(tenant_id, ClaimId::from(id))
        .await?;
    Ok(Json(ClaimResponse::from(&claim)))
}

/// Performs an approval action (approve, reject, return, escalate, settle)
pub async fn act_on_claim(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(request): Json<ClaimActionRequest>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let tenant_id = tenant_from_headers(&headers)?;
    let action_request = ActionRequest {
        action: request.action,
        actor_id: EmployeeId::from(request.actor_id),
        actor_role: request.actor_role,
        comment: request.comment,
    };

    let claim = state
        .service
        .act_on_claim(tenant_id, ClaimId::from(id), action_request)
        .await?;
    Ok(Json(ClaimResponse::from(&claim)))
}

/// Applies employee edits to a returned claim and resubmits it
pub async fn resubmit_claim(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(request): Json<ResubmitClaimRequest>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let tenant_id = tenant_from_headers(&headers)?;
    let edits = convert_edits(request.edits)?;

    let claim = state
        .service
        .resubmit_claim(
            tenant_id,
            ClaimId::from(id),
            EmployeeId::from(request.actor_id),
            edits,
        )
        .await?;
    Ok(Json(ClaimResponse::from(&claim)))
}

fn convert_edits(edits: ClaimEditsRequest) -> Result<ClaimEdits, ApiError> {
    let amount = match (edits.amount, edits.currency) {
        (Some(amount), Some(currency)) => Some(
            Money::non_negative(amount, currency)
                .map_err(|e| ApiError::Validation(e.to_string()))?,
        ),
        (Some(_), None) => {
            return Err(ApiError::Validation(
                "currency is required when editing the amount".to_string(),
            ))
        }
        _ => None,
    };

    Ok(ClaimEdits {
        amount,
        claim_date: edits.claim_date,
        description: edits.description,
        vendor: edits.vendor,
        project_code: edits.project_code,
        transaction_ref: edits.transaction_ref,
        documents: edits.documents.map(|docs| {
            docs.into_iter()
                .map(|d| DocumentRef {
                    id: d.id.map(DocumentId::from).unwrap_or_default(),
                    file_name: d.file_name,
                })
                .collect()
        }),
    })
}
