//! Claim DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use core_kernel::Currency;
use domain_approval::claim::{
    ActorRole, ApprovalHistoryItem, Claim, ClaimType, FieldSource, Sourced,
};
use domain_approval::compliance::PolicyCheck;
use domain_approval::state_machine::ApprovalAction;

/// A field value with its provenance tag; defaults to manual entry
#[derive(Debug, Deserialize)]
pub struct SourcedInput<T> {
    pub value: T,
    #[serde(default = "manual_source")]
    pub source: FieldSource,
}

fn manual_source() -> FieldSource {
    FieldSource::Manual
}

impl<T> From<SourcedInput<T>> for Sourced<T> {
    fn from(input: SourcedInput<T>) -> Self {
        Sourced {
            value: input.value,
            source: input.source,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DocumentInput {
    pub id: Option<Uuid>,
    pub file_name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitClaimRequest {
    pub employee_id: Uuid,
    pub claim_type: ClaimType,
    #[validate(length(min = 1, message = "category must not be empty"))]
    pub category: String,
    pub amount: Decimal,
    pub currency: Currency,
    pub claim_date: SourcedInput<NaiveDate>,
    pub description: Option<SourcedInput<String>>,
    pub vendor: Option<SourcedInput<String>>,
    pub project_code: Option<SourcedInput<String>>,
    pub transaction_ref: Option<SourcedInput<String>>,
    #[serde(default)]
    pub documents: Vec<DocumentInput>,
    #[validate(range(max = 100, message = "ai_confidence must be between 0 and 100"))]
    pub ai_confidence: u8,
}

#[derive(Debug, Deserialize)]
pub struct ClaimActionRequest {
    pub action: ApprovalAction,
    pub actor_id: Uuid,
    pub actor_role: ActorRole,
    pub comment: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClaimEditsRequest {
    pub amount: Option<Decimal>,
    /// Required when `amount` is present
    pub currency: Option<Currency>,
    pub claim_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub vendor: Option<String>,
    pub project_code: Option<String>,
    pub transaction_ref: Option<String>,
    pub documents: Option<Vec<DocumentInput>>,
}

#[derive(Debug, Deserialize)]
pub struct ResubmitClaimRequest {
    pub actor_id: Uuid,
    #[serde(default)]
    pub edits: ClaimEditsRequest,
}

#[derive(Debug, Serialize)]
pub struct SourcedField<T> {
    pub value: T,
    pub source: FieldSource,
}

impl<T: Clone> SourcedField<T> {
    fn from_domain(sourced: &Sourced<T>) -> Self {
        Self {
            value: sourced.value.clone(),
            source: sourced.source,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub id: String,
    pub file_name: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub action: String,
    pub actor_id: String,
    pub actor_role: String,
    pub timestamp: DateTime<Utc>,
    pub comment: Option<String>,
    pub from_status: String,
    pub to_status: String,
}

impl From<&ApprovalHistoryItem> for HistoryResponse {
    fn from(item: &ApprovalHistoryItem) -> Self {
        Self {
            action: format!("{:?}", item.action).to_lowercase(),
            actor_id: item.actor_id.to_string(),
            actor_role: item.actor_role.to_string(),
            timestamp: item.timestamp,
            comment: item.comment.clone(),
            from_status: item.from_status.to_string(),
            to_status: item.to_status.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    pub id: String,
    pub tenant_id: String,
    pub employee_id: String,
    pub claim_number: String,
    pub claim_type: ClaimType,
    pub category: String,
    pub amount: Decimal,
    pub currency: Currency,
    pub claim_date: SourcedField<NaiveDate>,
    pub description: Option<SourcedField<String>>,
    pub vendor: Option<SourcedField<String>>,
    pub project_code: Option<SourcedField<String>>,
    pub transaction_ref: Option<SourcedField<String>>,
    pub documents: Vec<DocumentResponse>,
    pub status: String,
    pub version: u64,
    pub return_count: u32,
    pub ai_confidence: u8,
    pub compliance_score: u8,
    pub policy_checks: Vec<PolicyCheck>,
    pub approval_history: Vec<HistoryResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Claim> for ClaimResponse {
    fn from(claim: &Claim) -> Self {
        Self {
            id: claim.id.to_string(),
            tenant_id: claim.tenant_id.to_string(),
            employee_id: claim.employee_id.to_string(),
            claim_number: claim.claim_number.clone(),
            claim_type: claim.claim_type,
            category: claim.category.clone(),
            amount: claim.amount.amount(),
            currency: claim.amount.currency(),
            claim_date: SourcedField::from_domain(&claim.claim_date),
            description: claim.description.as_ref().map(SourcedField::from_domain),
            vendor: claim.vendor.as_ref().map(SourcedField::from_domain),
            project_code: claim.project_code.as_ref().map(SourcedField::from_domain),
            transaction_ref: claim
                .transaction_ref
                .as_ref()
                .map(SourcedField::from_domain),
            documents: claim
                .documents
                .iter()
                .map(|d| DocumentResponse {
                    id: d.id.to_string(),
                    file_name: d.file_name.clone(),
                })
                .collect(),
            status: claim.status.to_string(),
            version: claim.version,
            return_count: claim.return_count,
            ai_confidence: claim.ai_confidence,
            compliance_score: claim.compliance_score,
            policy_checks: claim.policy_checks.clone(),
            approval_history: claim.approval_history.iter().map(HistoryResponse::from).collect(),
            created_at: claim.created_at,
            updated_at: claim.updated_at,
        }
    }
}
