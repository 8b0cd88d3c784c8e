//! Claim aggregate

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AuditEntryId, ClaimId, DocumentId, EmployeeId, Money, TenantId};

use crate::compliance::{ComplianceEvaluation, PolicyCheck};
use crate::error::ApprovalError;

/// Claim workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    /// Being drafted by the employee
    Draft,
    /// Submitted but not yet routed; produced only by upstream imports
    Submitted,
    /// Awaiting manager approval
    PendingManager,
    /// Awaiting HR approval
    PendingHr,
    /// Awaiting finance approval
    PendingFinance,
    /// Fully approved
    Approved,
    /// Rejected; terminal
    Rejected,
    /// Sent back to the employee for rework
    Returned,
    /// Paid out and closed; terminal
    Settled,
}

impl ClaimStatus {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, ClaimStatus::Rejected | ClaimStatus::Settled)
    }

    /// Returns true if the claim is waiting on an approver
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            ClaimStatus::Submitted
                | ClaimStatus::PendingManager
                | ClaimStatus::PendingHr
                | ClaimStatus::PendingFinance
        )
    }

    /// The role gating approval at this stage, if the claim is pending
    ///
    /// `Submitted` is gated like `PendingManager`: a claim in that state is
    /// awaiting its first approver.
    pub fn gating_role(&self) -> Option<ActorRole> {
        match self {
            ClaimStatus::Submitted | ClaimStatus::PendingManager => Some(ActorRole::Manager),
            ClaimStatus::PendingHr => Some(ActorRole::Hr),
            ClaimStatus::PendingFinance => Some(ActorRole::Finance),
            _ => None,
        }
    }
}

impl std::fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ClaimStatus::Draft => "draft",
            ClaimStatus::Submitted => "submitted",
            ClaimStatus::PendingManager => "pending_manager",
            ClaimStatus::PendingHr => "pending_hr",
            ClaimStatus::PendingFinance => "pending_finance",
            ClaimStatus::Approved => "approved",
            ClaimStatus::Rejected => "rejected",
            ClaimStatus::Returned => "returned",
            ClaimStatus::Settled => "settled",
        };
        write!(f, "{}", s)
    }
}

/// Type of claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimType {
    Reimbursement,
    Allowance,
}

/// Role of an actor in the approval workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Employee,
    Manager,
    Hr,
    Finance,
    Admin,
}

impl std::fmt::Display for ActorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ActorRole::Employee => "employee",
            ActorRole::Manager => "manager",
            ActorRole::Hr => "hr",
            ActorRole::Finance => "finance",
            ActorRole::Admin => "admin",
        };
        write!(f, "{}", s)
    }
}

/// Where a claim field's value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSource {
    /// Extracted by the upstream OCR pipeline
    Ocr,
    /// Entered by hand at submission
    Manual,
    /// Changed by the employee after a return
    Edited,
}

/// A value tagged with its provenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sourced<T> {
    pub value: T,
    pub source: FieldSource,
}

impl<T> Sourced<T> {
    pub fn ocr(value: T) -> Self {
        Self {
            value,
            source: FieldSource::Ocr,
        }
    }

    pub fn manual(value: T) -> Self {
        Self {
            value,
            source: FieldSource::Manual,
        }
    }

    /// Replaces the value, flipping provenance to `Edited`
    pub fn edit(&mut self, value: T) {
        self.value = value;
        self.source = FieldSource::Edited;
    }
}

/// Reference to an attached document
///
/// Document content lives in external storage; the engine only ever checks
/// for presence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub id: DocumentId,
    pub file_name: String,
}

/// Action recorded in the approval history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    Submitted,
    Approved,
    Rejected,
    Returned,
    Escalated,
    Settled,
}

/// One entry in a claim's approval trail, immutable once appended
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalHistoryItem {
    pub id: AuditEntryId,
    pub action: HistoryAction,
    pub actor_id: EmployeeId,
    pub actor_role: ActorRole,
    pub timestamp: DateTime<Utc>,
    pub comment: Option<String>,
    pub from_status: ClaimStatus,
    pub to_status: ClaimStatus,
}

/// An expense or allowance claim moving through the approval workflow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    /// Unique identifier
    pub id: ClaimId,
    /// Owning tenant
    pub tenant_id: TenantId,
    /// Submitting employee
    pub employee_id: EmployeeId,
    /// Human-readable number, unique per tenant, assigned at submission
    pub claim_number: String,
    /// Reimbursement or allowance
    pub claim_type: ClaimType,
    /// Category code from the tenant's catalog
    pub category: String,
    /// Claimed amount, non-negative
    pub amount: Money,
    /// Date the expense was incurred
    pub claim_date: Sourced<NaiveDate>,
    /// Free-text description
    pub description: Option<Sourced<String>>,
    /// Vendor/merchant name
    pub vendor: Option<Sourced<String>>,
    /// Project the expense belongs to
    pub project_code: Option<Sourced<String>>,
    /// Payment/transaction reference
    pub transaction_ref: Option<Sourced<String>>,
    /// Attached documents (presence only)
    pub documents: Vec<DocumentRef>,
    /// Workflow status
    pub status: ClaimStatus,
    /// Monotonic version for optimistic concurrency
    pub version: u64,
    /// Times the claim has been returned for rework
    pub return_count: u32,
    /// AI-derived confidence, 0-100, supplied externally
    pub ai_confidence: u8,
    /// Weighted policy compliance score, 0-100, computed by the evaluator
    pub compliance_score: u8,
    /// Findings from the latest compliance evaluation
    pub policy_checks: Vec<PolicyCheck>,
    /// Append-only approval trail
    pub approval_history: Vec<ApprovalHistoryItem>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

/// Content edits an employee may apply while a claim is returned
#[derive(Debug, Clone, Default)]
pub struct ClaimEdits {
    pub amount: Option<Money>,
    pub claim_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub vendor: Option<String>,
    pub project_code: Option<String>,
    pub transaction_ref: Option<String>,
    pub documents: Option<Vec<DocumentRef>>,
}

impl ClaimEdits {
    pub fn is_empty(&self) -> bool {
        self.amount.is_none()
            && self.claim_date.is_none()
            && self.description.is_none()
            && self.vendor.is_none()
            && self.project_code.is_none()
            && self.transaction_ref.is_none()
            && self.documents.is_none()
    }
}

impl Claim {
    /// Updates the compliance result
    ///
    /// Score and checks always move together so neither is ever stale
    /// relative to the other.
    pub fn set_compliance(&mut self, evaluation: ComplianceEvaluation) {
        self.compliance_score = evaluation.score;
        self.policy_checks = evaluation.checks;
        self.updated_at = Utc::now();
    }

    /// Returns true if any current policy check failed
    pub fn has_failing_checks(&self) -> bool {
        self.policy_checks
            .iter()
            .any(|c| c.status == crate::compliance::CheckStatus::Fail)
    }

    /// Appends a history entry
    pub fn record(&mut self, item: ApprovalHistoryItem) {
        self.approval_history.push(item);
        self.updated_at = Utc::now();
    }

    /// Merges employee edits, flipping provenance of touched fields to `Edited`
    ///
    /// Only permitted while the claim is returned (or still a draft).
    pub fn apply_edits(&mut self, edits: ClaimEdits) -> Result<(), ApprovalError> {
        if !matches!(self.status, ClaimStatus::Returned | ClaimStatus::Draft) {
            return Err(ApprovalError::Validation(format!(
                "claim {} cannot be edited in state {}",
                self.id, self.status
            )));
        }

        if let Some(amount) = edits.amount {
            if amount.is_negative() {
                return Err(ApprovalError::Validation(
                    "amount must be non-negative".to_string(),
                ));
            }
            self.amount = amount;
        }
        if let Some(date) = edits.claim_date {
            self.claim_date.edit(date);
        }
        if let Some(description) = edits.description {
            edit_optional(&mut self.description, description);
        }
        if let Some(vendor) = edits.vendor {
            edit_optional(&mut self.vendor, vendor);
        }
        if let Some(project_code) = edits.project_code {
            edit_optional(&mut self.project_code, project_code);
        }
        if let Some(transaction_ref) = edits.transaction_ref {
            edit_optional(&mut self.transaction_ref, transaction_ref);
        }
        if let Some(documents) = edits.documents {
            self.documents = documents;
        }

        self.updated_at = Utc::now();
        Ok(())
    }
}

fn edit_optional(field: &mut Option<Sourced<String>>, value: String) {
    match field {
        Some(sourced) => sourced.edit(value),
        None => {
            *field = Some(Sourced {
                value,
                source: FieldSource::Edited,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    use core_kernel::Currency;

    fn test_claim(status: ClaimStatus) -> Claim {
        Claim {
            id: ClaimId::new_v7(),
            tenant_id: TenantId::new(),
            employee_id: EmployeeId::new(),
            claim_number: "EXP-2025-000001".to_string(),
            claim_type: ClaimType::Reimbursement,
            category: "travel".to_string(),
            amount: Money::new(dec!(1200), Currency::INR),
            claim_date: Sourced::ocr(NaiveDate::from_ymd_opt(2025, 8, 1).unwrap()),
            description: Some(Sourced::ocr("Taxi to airport".to_string())),
            vendor: None,
            project_code: None,
            transaction_ref: None,
            documents: vec![],
            status,
            version: 1,
            return_count: 0,
            ai_confidence: 80,
            compliance_score: 0,
            policy_checks: vec![],
            approval_history: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_gating_roles() {
        assert_eq!(
            ClaimStatus::PendingManager.gating_role(),
            Some(ActorRole::Manager)
        );
        assert_eq!(ClaimStatus::Submitted.gating_role(), Some(ActorRole::Manager));
        assert_eq!(ClaimStatus::PendingHr.gating_role(), Some(ActorRole::Hr));
        assert_eq!(
            ClaimStatus::PendingFinance.gating_role(),
            Some(ActorRole::Finance)
        );
        assert_eq!(ClaimStatus::Approved.gating_role(), None);
    }

    #[test]
    fn test_terminal_states() {
        assert!(ClaimStatus::Rejected.is_terminal());
        assert!(ClaimStatus::Settled.is_terminal());
        assert!(!ClaimStatus::Returned.is_terminal());
    }

    #[test]
    fn test_edits_flip_provenance() {
        let mut claim = test_claim(ClaimStatus::Returned);
        claim
            .apply_edits(ClaimEdits {
                description: Some("Taxi to airport, corrected fare".to_string()),
                vendor: Some("City Cabs".to_string()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(
            claim.description.as_ref().unwrap().source,
            FieldSource::Edited
        );
        assert_eq!(claim.vendor.as_ref().unwrap().source, FieldSource::Edited);
        // Untouched fields keep their provenance
        assert_eq!(claim.claim_date.source, FieldSource::Ocr);
    }

    #[test]
    fn test_edits_rejected_while_pending() {
        let mut claim = test_claim(ClaimStatus::PendingManager);
        let result = claim.apply_edits(ClaimEdits {
            description: Some("nope".to_string()),
            ..Default::default()
        });
        assert!(matches!(result, Err(ApprovalError::Validation(_))));
    }

    #[test]
    fn test_negative_amount_edit_rejected() {
        let mut claim = test_claim(ClaimStatus::Returned);
        let result = claim.apply_edits(ClaimEdits {
            amount: Some(Money::new(dec!(-5), Currency::INR)),
            ..Default::default()
        });
        assert!(matches!(result, Err(ApprovalError::Validation(_))));
    }
}
