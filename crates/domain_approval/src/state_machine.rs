//! Approval state machine
//!
//! Transition planning is pure: `plan` consumes the claim, the requested
//! action, and a context of pre-fetched configuration, and returns the
//! transition to perform without touching the claim. `apply` then mutates
//! the claim in one place, so the persistence write always sees the full
//! effect of a transition at once.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{AuditEntryId, EmployeeId};

use crate::claim::{
    ActorRole, ApprovalHistoryItem, Claim, ClaimStatus, HistoryAction,
};
use crate::compliance::{self, ComplianceEvaluation, DuplicateCandidate, TenantPolicyConfig};
use crate::error::ApprovalError;
use crate::skip_rules::{self, ApprovalSkipRule, EmployeeContext, SkipDecision};

/// Actions that drive the approval workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalAction {
    Submit,
    Approve,
    Reject,
    Return,
    Resubmit,
    Escalate,
    Settle,
}

impl std::fmt::Display for ApprovalAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ApprovalAction::Submit => "submit",
            ApprovalAction::Approve => "approve",
            ApprovalAction::Reject => "reject",
            ApprovalAction::Return => "return",
            ApprovalAction::Resubmit => "resubmit",
            ApprovalAction::Escalate => "escalate",
            ApprovalAction::Settle => "settle",
        };
        write!(f, "{}", s)
    }
}

/// Tenant auto-approval thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoApprovalConfig {
    pub enabled: bool,
    /// Minimum AI confidence, 0-100
    pub ai_threshold: u8,
    /// Minimum compliance score, 0-100
    pub compliance_threshold: u8,
    /// Maximum auto-approvable amount
    pub max_amount: Decimal,
    /// Also auto-approve after manager sign-off when thresholds hold
    pub auto_skip_after_manager: bool,
}

impl Default for AutoApprovalConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            ai_threshold: 100,
            compliance_threshold: 100,
            max_amount: Decimal::ZERO,
            auto_skip_after_manager: false,
        }
    }
}

/// Pre-fetched inputs a transition may consult
#[derive(Debug)]
pub struct TransitionContext<'a> {
    pub rules: &'a [ApprovalSkipRule],
    pub employee: &'a EmployeeContext,
    pub policy: &'a TenantPolicyConfig,
    pub auto_approval: &'a AutoApprovalConfig,
    /// Recent claims of the same employee, for the duplicate check
    pub duplicates: &'a [DuplicateCandidate],
    pub now: DateTime<Utc>,
}

/// An action requested by an actor
#[derive(Debug, Clone)]
pub struct ActionRequest {
    pub action: ApprovalAction,
    pub actor_id: EmployeeId,
    pub actor_role: ActorRole,
    pub comment: Option<String>,
}

/// A planned transition, not yet applied
#[derive(Debug, Clone)]
pub struct Transition {
    pub to: ClaimStatus,
    /// Fresh compliance result, present when the action re-evaluated policy
    pub evaluation: Option<ComplianceEvaluation>,
    /// The skip rule that routed the claim, if any
    pub skip: Option<SkipDecision>,
    pub history_action: HistoryAction,
}

/// Plans the transition for `request` against the claim's current state
///
/// Returns an error without side effects when the action is invalid for the
/// state, the actor's role does not gate the stage, or a required comment
/// is missing.
pub fn plan(
    claim: &Claim,
    request: &ActionRequest,
    ctx: &TransitionContext<'_>,
) -> Result<Transition, ApprovalError> {
    match request.action {
        ApprovalAction::Submit => plan_submission(claim, ClaimStatus::Draft, request, ctx),
        ApprovalAction::Resubmit => plan_resubmission(claim, request, ctx),
        ApprovalAction::Approve => plan_approve(claim, request, ctx),
        ApprovalAction::Reject => {
            require_stage_role(claim, request)?;
            require_comment(request)?;
            Ok(Transition {
                to: ClaimStatus::Rejected,
                evaluation: None,
                skip: None,
                history_action: HistoryAction::Rejected,
            })
        }
        ApprovalAction::Return => {
            require_stage_role(claim, request)?;
            require_comment(request)?;
            Ok(Transition {
                to: ClaimStatus::Returned,
                evaluation: None,
                skip: None,
                history_action: HistoryAction::Returned,
            })
        }
        ApprovalAction::Escalate => plan_escalate(claim, request),
        ApprovalAction::Settle => plan_settle(claim, request),
    }
}

/// Applies a planned transition to the claim
///
/// Appends the history entry, moves the status, stores a fresh compliance
/// result when one was produced, and counts returns. The version field is
/// untouched; the store bumps it on write.
pub fn apply(
    claim: &mut Claim,
    request: &ActionRequest,
    transition: Transition,
    now: DateTime<Utc>,
) {
    let from_status = claim.status;

    if let Some(evaluation) = transition.evaluation {
        claim.set_compliance(evaluation);
    }
    if transition.to == ClaimStatus::Returned {
        claim.return_count += 1;
    }

    claim.status = transition.to;
    claim.record(ApprovalHistoryItem {
        id: AuditEntryId::new(),
        action: transition.history_action,
        actor_id: request.actor_id,
        actor_role: request.actor_role,
        timestamp: now,
        comment: request.comment.clone(),
        from_status,
        to_status: transition.to,
    });
    claim.updated_at = now;
}

/// Routes a claim entering the workflow: skip rules first, then policy
/// evaluation with the auto-approval thresholds.
fn plan_submission(
    claim: &Claim,
    expected_from: ClaimStatus,
    request: &ActionRequest,
    ctx: &TransitionContext<'_>,
) -> Result<Transition, ApprovalError> {
    if claim.status != expected_from {
        return Err(ApprovalError::InvalidTransition {
            status: claim.status,
            action: request.action,
        });
    }
    if !matches!(request.actor_role, ActorRole::Employee | ActorRole::Admin) {
        return Err(ApprovalError::Unauthorized {
            role: request.actor_role,
            action: request.action,
            status: claim.status,
        });
    }

    // A matching skip rule decides the route on its own; compliance is not
    // consulted and not re-evaluated.
    if let Some(skip) = skip_rules::resolve(ctx.rules, claim, ctx.employee) {
        return Ok(Transition {
            to: skip.scope.entry_status(),
            evaluation: None,
            skip: Some(skip),
            history_action: HistoryAction::Submitted,
        });
    }

    let evaluation = compliance::evaluate(claim, ctx.policy, ctx.duplicates, ctx.now);
    let to = if auto_approvable(
        ctx.auto_approval,
        claim.ai_confidence,
        evaluation.score,
        claim.amount.amount(),
        evaluation.has_failures(),
    ) {
        ClaimStatus::Approved
    } else {
        ClaimStatus::PendingManager
    };

    Ok(Transition {
        to,
        evaluation: Some(evaluation),
        skip: None,
        history_action: HistoryAction::Submitted,
    })
}

fn plan_resubmission(
    claim: &Claim,
    request: &ActionRequest,
    ctx: &TransitionContext<'_>,
) -> Result<Transition, ApprovalError> {
    plan_submission(claim, ClaimStatus::Returned, request, ctx)
}

fn plan_approve(
    claim: &Claim,
    request: &ActionRequest,
    ctx: &TransitionContext<'_>,
) -> Result<Transition, ApprovalError> {
    require_stage_role(claim, request)?;

    let to = match claim.status {
        ClaimStatus::Submitted | ClaimStatus::PendingManager => {
            // After manager sign-off the remaining stages can be skipped when
            // the stored compliance result still clears the thresholds.
            let auto = ctx.auto_approval;
            if auto.auto_skip_after_manager
                && auto_approvable(
                    auto,
                    claim.ai_confidence,
                    claim.compliance_score,
                    claim.amount.amount(),
                    claim.has_failing_checks(),
                )
            {
                ClaimStatus::Approved
            } else {
                ClaimStatus::PendingHr
            }
        }
        ClaimStatus::PendingHr => ClaimStatus::PendingFinance,
        ClaimStatus::PendingFinance => ClaimStatus::Approved,
        // require_stage_role already rejected non-pending states
        _ => {
            return Err(ApprovalError::InvalidTransition {
                status: claim.status,
                action: request.action,
            })
        }
    };

    Ok(Transition {
        to,
        evaluation: None,
        skip: None,
        history_action: HistoryAction::Approved,
    })
}

fn plan_escalate(claim: &Claim, request: &ActionRequest) -> Result<Transition, ApprovalError> {
    if request.actor_role != ActorRole::Admin {
        return Err(ApprovalError::Unauthorized {
            role: request.actor_role,
            action: request.action,
            status: claim.status,
        });
    }

    let to = match claim.status {
        ClaimStatus::Submitted | ClaimStatus::PendingManager => ClaimStatus::PendingHr,
        ClaimStatus::PendingHr => ClaimStatus::PendingFinance,
        ClaimStatus::PendingFinance => ClaimStatus::Approved,
        _ => {
            return Err(ApprovalError::InvalidTransition {
                status: claim.status,
                action: request.action,
            })
        }
    };

    Ok(Transition {
        to,
        evaluation: None,
        skip: None,
        history_action: HistoryAction::Escalated,
    })
}

fn plan_settle(claim: &Claim, request: &ActionRequest) -> Result<Transition, ApprovalError> {
    if claim.status != ClaimStatus::Approved {
        return Err(ApprovalError::InvalidTransition {
            status: claim.status,
            action: request.action,
        });
    }
    if !matches!(request.actor_role, ActorRole::Finance | ActorRole::Admin) {
        return Err(ApprovalError::Unauthorized {
            role: request.actor_role,
            action: request.action,
            status: claim.status,
        });
    }

    Ok(Transition {
        to: ClaimStatus::Settled,
        evaluation: None,
        skip: None,
        history_action: HistoryAction::Settled,
    })
}

/// Every threshold must hold and no check may have failed
fn auto_approvable(
    config: &AutoApprovalConfig,
    ai_confidence: u8,
    compliance_score: u8,
    amount: Decimal,
    has_failures: bool,
) -> bool {
    config.enabled
        && ai_confidence >= config.ai_threshold
        && compliance_score >= config.compliance_threshold
        && amount <= config.max_amount
        && !has_failures
}

/// The actor must hold the role gating the claim's current stage; Admin
/// may always act.
fn require_stage_role(claim: &Claim, request: &ActionRequest) -> Result<(), ApprovalError> {
    let Some(gating) = claim.status.gating_role() else {
        return Err(ApprovalError::InvalidTransition {
            status: claim.status,
            action: request.action,
        });
    };
    if request.actor_role != gating && request.actor_role != ActorRole::Admin {
        return Err(ApprovalError::Unauthorized {
            role: request.actor_role,
            action: request.action,
            status: claim.status,
        });
    }
    Ok(())
}

fn require_comment(request: &ActionRequest) -> Result<(), ApprovalError> {
    match request.comment.as_deref().map(str::trim) {
        Some(comment) if !comment.is_empty() => Ok(()),
        _ => Err(ApprovalError::Validation(format!(
            "a comment is required to {} a claim",
            request.action
        ))),
    }
}
