//! Approval orchestration service
//!
//! Every operation follows the same shape: load state through the ports,
//! run the pure domain functions, then write conditionally on the version
//! read. A concurrent writer surfaces as `ApprovalError::Conflict`; the
//! service never retries on the caller's behalf.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use core_kernel::{ClaimId, DocumentId, EmployeeId, Money, SkipRuleId, TenantId};

use crate::claim::{
    ActorRole, Claim, ClaimEdits, ClaimStatus, ClaimType, DocumentRef, Sourced,
};
use crate::error::ApprovalError;
use crate::ports::{ClaimStore, SkipRuleStore, TenantConfigStore};
use crate::skip_rules::ApprovalSkipRule;
use crate::state_machine::{
    self, ActionRequest, ApprovalAction, AutoApprovalConfig, TransitionContext,
};

/// Input for creating and submitting a claim
#[derive(Debug, Clone)]
pub struct ClaimDraft {
    pub employee_id: EmployeeId,
    pub claim_type: ClaimType,
    pub category: String,
    pub amount: Money,
    pub claim_date: Sourced<NaiveDate>,
    pub description: Option<Sourced<String>>,
    pub vendor: Option<Sourced<String>>,
    pub project_code: Option<Sourced<String>>,
    pub transaction_ref: Option<Sourced<String>>,
    pub documents: Vec<(DocumentId, String)>,
    /// Confidence score from the upstream extraction pipeline, 0-100
    pub ai_confidence: u8,
}

/// Orchestrates claim submission, approval actions, and skip rule
/// administration over the store ports
#[derive(Clone)]
pub struct ApprovalService {
    claims: Arc<dyn ClaimStore>,
    rules: Arc<dyn SkipRuleStore>,
    config: Arc<dyn TenantConfigStore>,
}

impl ApprovalService {
    pub fn new(
        claims: Arc<dyn ClaimStore>,
        rules: Arc<dyn SkipRuleStore>,
        config: Arc<dyn TenantConfigStore>,
    ) -> Self {
        Self {
            claims,
            rules,
            config,
        }
    }

    /// Creates a claim from a draft and routes it through the workflow
    ///
    /// Skip rules are consulted first; otherwise the claim is evaluated
    /// against tenant policy and either auto-approved or parked for the
    /// manager.
    pub async fn submit_claim(
        &self,
        tenant_id: TenantId,
        draft: ClaimDraft,
    ) -> Result<Claim, ApprovalError> {
        validate_draft(&draft)?;

        let now = Utc::now();
        let claim_number = self.claims.next_claim_number(tenant_id).await?;
        let mut claim = Claim {
            id: ClaimId::new_v7(),
            tenant_id,
            employee_id: draft.employee_id,
            claim_number,
            claim_type: draft.claim_type,
            category: draft.category,
            amount: draft.amount,
            claim_date: draft.claim_date,
            description: draft.description,
            vendor: draft.vendor,
            project_code: draft.project_code,
            transaction_ref: draft.transaction_ref,
            documents: draft
                .documents
                .into_iter()
                .map(|(id, file_name)| DocumentRef { id, file_name })
                .collect(),
            status: ClaimStatus::Draft,
            version: 1,
            return_count: 0,
            ai_confidence: draft.ai_confidence,
            compliance_score: 0,
            policy_checks: vec![],
            approval_history: vec![],
            created_at: now,
            updated_at: now,
        };

        let request = ActionRequest {
            action: ApprovalAction::Submit,
            actor_id: claim.employee_id,
            actor_role: ActorRole::Employee,
            comment: None,
        };
        let transition = self.plan_with_context(&claim, &request).await?;

        info!(
            claim_id = %claim.id,
            tenant_id = %tenant_id,
            to = %transition.to,
            skip_rule = transition.skip.as_ref().map(|s| s.rule_name.as_str()),
            "claim submitted"
        );

        state_machine::apply(&mut claim, &request, transition, now);
        self.claims.insert(claim.clone()).await?;
        Ok(claim)
    }

    /// Performs an approval action against a stored claim
    ///
    /// Submission actions are excluded: `submit_claim` and `resubmit_claim`
    /// are the only entry points, since resubmission carries an owner check
    /// this surface does not perform.
    ///
    /// The write is conditioned on the version read at the start; a
    /// concurrent update fails with `Conflict` and no partial effect.
    pub async fn act_on_claim(
        &self,
        tenant_id: TenantId,
        claim_id: ClaimId,
        request: ActionRequest,
    ) -> Result<Claim, ApprovalError> {
        if matches!(
            request.action,
            ApprovalAction::Submit | ApprovalAction::Resubmit
        ) {
            return Err(ApprovalError::Validation(format!(
                "{} is not an approval action; use the dedicated submission operation",
                request.action
            )));
        }

        let claim = self.claims.get(tenant_id, claim_id).await?;
        let read_version = claim.version;

        let transition = self.plan_with_context(&claim, &request).await?;

        let mut updated = claim;
        let from = updated.status;
        state_machine::apply(&mut updated, &request, transition, Utc::now());

        match self.claims.update(updated, read_version).await {
            Ok(stored) => {
                info!(
                    claim_id = %claim_id,
                    action = %request.action,
                    from = %from,
                    to = %stored.status,
                    "claim transitioned"
                );
                Ok(stored)
            }
            Err(err) if err.is_conflict() => {
                warn!(claim_id = %claim_id, action = %request.action, "concurrent update lost");
                Err(err.into())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Applies employee edits to a returned claim and resubmits it
    pub async fn resubmit_claim(
        &self,
        tenant_id: TenantId,
        claim_id: ClaimId,
        actor_id: EmployeeId,
        edits: ClaimEdits,
    ) -> Result<Claim, ApprovalError> {
        let mut claim = self.claims.get(tenant_id, claim_id).await?;
        let read_version = claim.version;

        if claim.status != ClaimStatus::Returned {
            return Err(ApprovalError::InvalidTransition {
                status: claim.status,
                action: ApprovalAction::Resubmit,
            });
        }
        if claim.employee_id != actor_id {
            return Err(ApprovalError::Unauthorized {
                role: ActorRole::Employee,
                action: ApprovalAction::Resubmit,
                status: claim.status,
            });
        }

        claim.apply_edits(edits)?;

        let request = ActionRequest {
            action: ApprovalAction::Resubmit,
            actor_id,
            actor_role: ActorRole::Employee,
            comment: None,
        };
        let transition = self.plan_with_context(&claim, &request).await?;

        info!(
            claim_id = %claim_id,
            return_count = claim.return_count,
            to = %transition.to,
            "claim resubmitted"
        );

        state_machine::apply(&mut claim, &request, transition, Utc::now());
        Ok(self.claims.update(claim, read_version).await?)
    }

    pub async fn get_claim(
        &self,
        tenant_id: TenantId,
        claim_id: ClaimId,
    ) -> Result<Claim, ApprovalError> {
        Ok(self.claims.get(tenant_id, claim_id).await?)
    }

    pub async fn list_skip_rules(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<ApprovalSkipRule>, ApprovalError> {
        Ok(self.rules.list(tenant_id).await?)
    }

    /// Creates or replaces a skip rule after validating its shape
    pub async fn upsert_skip_rule(
        &self,
        rule: ApprovalSkipRule,
    ) -> Result<ApprovalSkipRule, ApprovalError> {
        if rule.name.trim().is_empty() {
            return Err(ApprovalError::Validation(
                "skip rule name must not be empty".to_string(),
            ));
        }
        if let Some(max) = rule.conditions.max_amount {
            if max.is_sign_negative() {
                return Err(ApprovalError::Validation(
                    "skip rule max_amount must be non-negative".to_string(),
                ));
            }
        }
        info!(rule_id = %rule.id, tenant_id = %rule.tenant_id, name = %rule.name, "skip rule saved");
        Ok(self.rules.upsert(rule).await?)
    }

    pub async fn delete_skip_rule(
        &self,
        tenant_id: TenantId,
        rule_id: SkipRuleId,
    ) -> Result<(), ApprovalError> {
        self.rules.delete(tenant_id, rule_id).await?;
        info!(rule_id = %rule_id, tenant_id = %tenant_id, "skip rule deleted");
        Ok(())
    }

    pub async fn auto_approval_config(
        &self,
        tenant_id: TenantId,
    ) -> Result<AutoApprovalConfig, ApprovalError> {
        Ok(self.config.auto_approval_config(tenant_id).await?)
    }

    pub async fn put_auto_approval_config(
        &self,
        tenant_id: TenantId,
        config: AutoApprovalConfig,
    ) -> Result<(), ApprovalError> {
        if config.ai_threshold > 100 || config.compliance_threshold > 100 {
            return Err(ApprovalError::Validation(
                "auto-approval thresholds must be between 0 and 100".to_string(),
            ));
        }
        if config.max_amount.is_sign_negative() {
            return Err(ApprovalError::Validation(
                "auto-approval max_amount must be non-negative".to_string(),
            ));
        }
        self.config.put_auto_approval_config(tenant_id, config).await?;
        Ok(())
    }

    /// Gathers the pre-fetched context a transition needs and plans it
    async fn plan_with_context(
        &self,
        claim: &Claim,
        request: &ActionRequest,
    ) -> Result<state_machine::Transition, ApprovalError> {
        let rules = self.rules.list_active(claim.tenant_id).await?;
        let employee = self
            .config
            .employee_context(claim.tenant_id, claim.employee_id)
            .await?;
        let policy = self.config.policy_config(claim.tenant_id).await?;
        let auto_approval = self.config.auto_approval_config(claim.tenant_id).await?;
        let duplicates = self
            .claims
            .find_recent_for_employee(claim.tenant_id, claim.employee_id)
            .await?;

        let ctx = TransitionContext {
            rules: &rules,
            employee: &employee,
            policy: &policy,
            auto_approval: &auto_approval,
            duplicates: &duplicates,
            now: Utc::now(),
        };
        state_machine::plan(claim, request, &ctx)
    }
}

fn validate_draft(draft: &ClaimDraft) -> Result<(), ApprovalError> {
    if draft.category.trim().is_empty() {
        return Err(ApprovalError::Validation(
            "category must not be empty".to_string(),
        ));
    }
    if draft.amount.is_negative() {
        return Err(ApprovalError::Validation(
            "amount must be non-negative".to_string(),
        ));
    }
    if draft.ai_confidence > 100 {
        return Err(ApprovalError::Validation(
            "ai_confidence must be between 0 and 100".to_string(),
        ));
    }
    Ok(())
}
