//! In-memory store
//!
//! Backs all three domain ports with `RwLock`-guarded maps. The claim
//! update path enforces the optimistic-concurrency contract: the write
//! holds the lock across the version comparison and the insert, so of any
//! set of racing writers exactly one succeeds and the rest observe a
//! conflict.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, Duration, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use core_kernel::{ClaimId, DomainPort, EmployeeId, PortError, SkipRuleId, TenantId};
use domain_approval::claim::Claim;
use domain_approval::compliance::{DuplicateCandidate, TenantPolicyConfig};
use domain_approval::ports::{ClaimStore, SkipRuleStore, TenantConfigStore};
use domain_approval::skip_rules::{ApprovalSkipRule, EmployeeContext};
use domain_approval::state_machine::AutoApprovalConfig;

/// How far back `find_recent_for_employee` looks
const RECENT_CLAIM_WINDOW_DAYS: i64 = 90;

/// In-memory adapter for all approval domain ports
#[derive(Default)]
pub struct MemoryStore {
    claims: RwLock<HashMap<(TenantId, ClaimId), Claim>>,
    rules: RwLock<HashMap<TenantId, HashMap<SkipRuleId, ApprovalSkipRule>>>,
    auto_approval: RwLock<HashMap<TenantId, AutoApprovalConfig>>,
    policies: RwLock<HashMap<TenantId, TenantPolicyConfig>>,
    employees: RwLock<HashMap<(TenantId, EmployeeId), EmployeeContext>>,
    claim_counters: Mutex<HashMap<TenantId, u64>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

impl DomainPort for MemoryStore {}

#[async_trait]
impl ClaimStore for MemoryStore {
    async fn insert(&self, claim: Claim) -> Result<(), PortError> {
        let mut claims = self.claims.write().await;
        let key = (claim.tenant_id, claim.id);
        if claims.contains_key(&key) {
            return Err(PortError::conflict(format!(
                "claim {} already exists",
                claim.id
            )));
        }
        debug!(claim_id = %claim.id, "claim inserted");
        claims.insert(key, claim);
        Ok(())
    }

    async fn get(&self, tenant_id: TenantId, claim_id: ClaimId) -> Result<Claim, PortError> {
        self.claims
            .read()
            .await
            .get(&(tenant_id, claim_id))
            .cloned()
            .ok_or_else(|| PortError::not_found("Claim", claim_id))
    }

    async fn update(&self, mut claim: Claim, expected_version: u64) -> Result<Claim, PortError> {
        let mut claims = self.claims.write().await;
        let key = (claim.tenant_id, claim.id);
        let stored = claims
            .get(&key)
            .ok_or_else(|| PortError::not_found("Claim", claim.id))?;

        if stored.version != expected_version {
            return Err(PortError::conflict(format!(
                "claim {} is at version {}, write expected {}",
                claim.id, stored.version, expected_version
            )));
        }

        claim.version = expected_version + 1;
        debug!(claim_id = %claim.id, version = claim.version, "claim updated");
        claims.insert(key, claim.clone());
        Ok(claim)
    }

    async fn find_recent_for_employee(
        &self,
        tenant_id: TenantId,
        employee_id: EmployeeId,
    ) -> Result<Vec<DuplicateCandidate>, PortError> {
        let cutoff = Utc::now().date_naive() - Duration::days(RECENT_CLAIM_WINDOW_DAYS);
        let claims = self.claims.read().await;
        Ok(claims
            .values()
            .filter(|c| {
                c.tenant_id == tenant_id
                    && c.employee_id == employee_id
                    && c.claim_date.value >= cutoff
            })
            .map(|c| DuplicateCandidate {
                claim_id: c.id,
                status: c.status,
                amount: c.amount.amount(),
                vendor: c.vendor.as_ref().map(|v| v.value.clone()),
                claim_date: c.claim_date.value,
            })
            .collect())
    }

    async fn next_claim_number(&self, tenant_id: TenantId) -> Result<String, PortError> {
        let mut counters = self.claim_counters.lock().await;
        let counter = counters.entry(tenant_id).or_insert(0);
        *counter += 1;
        Ok(format!("EXP-{}-{:06}", Utc::now().year(), counter))
    }
}

#[async_trait]
impl SkipRuleStore for MemoryStore {
    async fn list(&self, tenant_id: TenantId) -> Result<Vec<ApprovalSkipRule>, PortError> {
        let rules = self.rules.read().await;
        let mut result: Vec<ApprovalSkipRule> = rules
            .get(&tenant_id)
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default();
        result.sort_by_key(|r| r.priority);
        Ok(result)
    }

    async fn list_active(&self, tenant_id: TenantId) -> Result<Vec<ApprovalSkipRule>, PortError> {
        let mut result = self.list(tenant_id).await?;
        result.retain(|r| r.is_active);
        Ok(result)
    }

    async fn upsert(&self, rule: ApprovalSkipRule) -> Result<ApprovalSkipRule, PortError> {
        let mut rules = self.rules.write().await;
        rules
            .entry(rule.tenant_id)
            .or_default()
            .insert(rule.id, rule.clone());
        Ok(rule)
    }

    async fn delete(&self, tenant_id: TenantId, rule_id: SkipRuleId) -> Result<(), PortError> {
        let mut rules = self.rules.write().await;
        let removed = rules
            .get_mut(&tenant_id)
            .and_then(|m| m.remove(&rule_id));
        match removed {
            Some(_) => Ok(()),
            None => Err(PortError::not_found("ApprovalSkipRule", rule_id)),
        }
    }
}

#[async_trait]
impl TenantConfigStore for MemoryStore {
    async fn auto_approval_config(
        &self,
        tenant_id: TenantId,
    ) -> Result<AutoApprovalConfig, PortError> {
        Ok(self
            .auto_approval
            .read()
            .await
            .get(&tenant_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn put_auto_approval_config(
        &self,
        tenant_id: TenantId,
        config: AutoApprovalConfig,
    ) -> Result<(), PortError> {
        self.auto_approval.write().await.insert(tenant_id, config);
        Ok(())
    }

    async fn policy_config(&self, tenant_id: TenantId) -> Result<TenantPolicyConfig, PortError> {
        Ok(self
            .policies
            .read()
            .await
            .get(&tenant_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn put_policy_config(
        &self,
        tenant_id: TenantId,
        config: TenantPolicyConfig,
    ) -> Result<(), PortError> {
        self.policies.write().await.insert(tenant_id, config);
        Ok(())
    }

    async fn employee_context(
        &self,
        tenant_id: TenantId,
        employee_id: EmployeeId,
    ) -> Result<EmployeeContext, PortError> {
        Ok(self
            .employees
            .read()
            .await
            .get(&(tenant_id, employee_id))
            .cloned()
            .unwrap_or_default())
    }

    async fn put_employee_context(
        &self,
        tenant_id: TenantId,
        employee_id: EmployeeId,
        context: EmployeeContext,
    ) -> Result<(), PortError> {
        self.employees
            .write()
            .await
            .insert((tenant_id, employee_id), context);
        Ok(())
    }
}
