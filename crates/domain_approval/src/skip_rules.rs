//! Skip rule resolution
//!
//! Tenant-configured rules that let claims bypass approval stages. Rules
//! are evaluated in ascending priority order and the first match wins.
//! Conditions are explicit tagged structures so they can be validated at
//! configuration time instead of failing at resolution time.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{EmployeeId, SkipRuleId, TenantId};

use crate::claim::{Claim, ClaimStatus};

/// Which approval stages a matching rule bypasses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipScope {
    /// Skip the manager stage only
    Manager,
    /// Skip manager and HR stages
    ManagerAndHr,
    /// Skip every stage; the claim is approved on submission
    All,
}

impl SkipScope {
    /// The status a claim enters when a rule with this scope matches at
    /// submission
    pub fn entry_status(&self) -> ClaimStatus {
        match self {
            SkipScope::Manager => ClaimStatus::PendingHr,
            SkipScope::ManagerAndHr => ClaimStatus::PendingFinance,
            SkipScope::All => ClaimStatus::Approved,
        }
    }
}

/// Conditions a claim and its submitter must satisfy for a rule to match
///
/// Every populated condition must hold (conjunction). An empty list or an
/// unset amount places no constraint. A condition that references a field
/// the submitter's record does not carry fails the match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConditions {
    /// Submitter designation must be one of these, if non-empty
    #[serde(default)]
    pub designations: Vec<String>,
    /// Submitter email must be one of these, if non-empty
    #[serde(default)]
    pub employee_emails: Vec<String>,
    /// Claim project code must be one of these, if non-empty
    #[serde(default)]
    pub project_codes: Vec<String>,
    /// Claim amount must not exceed this, if set
    pub max_amount: Option<Decimal>,
}

/// A tenant-scoped rule for bypassing approval stages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalSkipRule {
    pub id: SkipRuleId,
    pub tenant_id: TenantId,
    pub name: String,
    /// Lower priority values are evaluated first
    pub priority: u32,
    pub is_active: bool,
    pub conditions: RuleConditions,
    pub scope: SkipScope,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Submitter attributes consulted by rule conditions
#[derive(Debug, Clone, Default)]
pub struct EmployeeContext {
    pub employee_id: Option<EmployeeId>,
    pub email: Option<String>,
    pub designation: Option<String>,
}

/// The rule that matched and the stages it bypasses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkipDecision {
    pub rule_id: SkipRuleId,
    pub rule_name: String,
    pub scope: SkipScope,
}

/// Finds the first active rule, in ascending priority order, whose
/// conditions all hold for this claim and submitter
pub fn resolve(
    rules: &[ApprovalSkipRule],
    claim: &Claim,
    employee: &EmployeeContext,
) -> Option<SkipDecision> {
    let mut ordered: Vec<&ApprovalSkipRule> = rules.iter().filter(|r| r.is_active).collect();
    ordered.sort_by_key(|r| r.priority);

    ordered
        .into_iter()
        .find(|rule| matches_rule(&rule.conditions, claim, employee))
        .map(|rule| SkipDecision {
            rule_id: rule.id,
            rule_name: rule.name.clone(),
            scope: rule.scope,
        })
}

fn matches_rule(conditions: &RuleConditions, claim: &Claim, employee: &EmployeeContext) -> bool {
    if !conditions.designations.is_empty() {
        let Some(designation) = employee.designation.as_deref() else {
            return false;
        };
        if !conditions
            .designations
            .iter()
            .any(|d| d.eq_ignore_ascii_case(designation))
        {
            return false;
        }
    }

    if !conditions.employee_emails.is_empty() {
        let Some(email) = employee.email.as_deref() else {
            return false;
        };
        if !conditions
            .employee_emails
            .iter()
            .any(|e| e.eq_ignore_ascii_case(email))
        {
            return false;
        }
    }

    if !conditions.project_codes.is_empty() {
        let Some(project_code) = claim.project_code.as_ref() else {
            return false;
        };
        if !conditions
            .project_codes
            .iter()
            .any(|p| p.eq_ignore_ascii_case(&project_code.value))
        {
            return false;
        }
    }

    if let Some(max) = conditions.max_amount {
        if claim.amount.amount() > max {
            return false;
        }
    }

    true
}
