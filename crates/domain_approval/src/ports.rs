//! Store ports for the approval domain
//!
//! Adapters implement these traits; the service layer only ever sees the
//! trait objects. All writes that race go through `ClaimStore::update`,
//! which carries the caller's expected version and must refuse the write
//! on a mismatch.

use async_trait::async_trait;

use core_kernel::{ClaimId, DomainPort, EmployeeId, PortError, SkipRuleId, TenantId};

use crate::claim::Claim;
use crate::compliance::{DuplicateCandidate, TenantPolicyConfig};
use crate::skip_rules::{ApprovalSkipRule, EmployeeContext};
use crate::state_machine::AutoApprovalConfig;

/// Persistence port for claims
#[async_trait]
pub trait ClaimStore: DomainPort {
    /// Inserts a new claim; fails on a duplicate id
    async fn insert(&self, claim: Claim) -> Result<(), PortError>;

    /// Loads a claim by id
    async fn get(&self, tenant_id: TenantId, claim_id: ClaimId) -> Result<Claim, PortError>;

    /// Conditionally writes the claim
    ///
    /// Succeeds only when the stored version equals `expected_version`,
    /// bumping the version by one as part of the same write. A mismatch is
    /// a `PortError::Conflict` and leaves the stored claim untouched.
    async fn update(&self, claim: Claim, expected_version: u64) -> Result<Claim, PortError>;

    /// Recent claims of an employee, as duplicate-check candidates
    async fn find_recent_for_employee(
        &self,
        tenant_id: TenantId,
        employee_id: EmployeeId,
    ) -> Result<Vec<DuplicateCandidate>, PortError>;

    /// Allocates the next claim number for the tenant, e.g. `EXP-2025-000042`
    async fn next_claim_number(&self, tenant_id: TenantId) -> Result<String, PortError>;
}

/// Persistence port for skip rules
#[async_trait]
pub trait SkipRuleStore: DomainPort {
    async fn list(&self, tenant_id: TenantId) -> Result<Vec<ApprovalSkipRule>, PortError>;

    /// Active rules only, for resolution
    async fn list_active(&self, tenant_id: TenantId) -> Result<Vec<ApprovalSkipRule>, PortError>;

    async fn upsert(&self, rule: ApprovalSkipRule) -> Result<ApprovalSkipRule, PortError>;

    async fn delete(&self, tenant_id: TenantId, rule_id: SkipRuleId) -> Result<(), PortError>;
}

/// Port for tenant-level configuration and employee lookups
#[async_trait]
pub trait TenantConfigStore: DomainPort {
    /// Auto-approval thresholds; defaults to disabled when unconfigured
    async fn auto_approval_config(
        &self,
        tenant_id: TenantId,
    ) -> Result<AutoApprovalConfig, PortError>;

    async fn put_auto_approval_config(
        &self,
        tenant_id: TenantId,
        config: AutoApprovalConfig,
    ) -> Result<(), PortError>;

    /// Policy configuration; defaults to an empty catalog when unconfigured
    async fn policy_config(&self, tenant_id: TenantId) -> Result<TenantPolicyConfig, PortError>;

    async fn put_policy_config(
        &self,
        tenant_id: TenantId,
        config: TenantPolicyConfig,
    ) -> Result<(), PortError>;

    /// Attributes of the submitting employee consulted by skip rules;
    /// an unknown employee yields an empty context
    async fn employee_context(
        &self,
        tenant_id: TenantId,
        employee_id: EmployeeId,
    ) -> Result<EmployeeContext, PortError>;

    async fn put_employee_context(
        &self,
        tenant_id: TenantId,
        employee_id: EmployeeId,
        context: EmployeeContext,
    ) -> Result<(), PortError>;
}
