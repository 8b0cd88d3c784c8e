//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible
//! defaults. These builders allow tests to specify only the relevant fields
//! while using defaults for everything else.

use chrono::{NaiveDate, Utc};
use fake::faker::company::en::CompanyName;
use fake::Fake;
use rust_decimal::Decimal;

use core_kernel::{EmployeeId, Money, SkipRuleId, TenantId};
use domain_approval::claim::{ClaimType, Sourced};
use domain_approval::services::ClaimDraft;
use domain_approval::skip_rules::{ApprovalSkipRule, RuleConditions, SkipScope};

use crate::fixtures::{MoneyFixtures, TemporalFixtures};

/// Builder for claim drafts
pub struct ClaimDraftBuilder {
    employee_id: EmployeeId,
    claim_type: ClaimType,
    category: String,
    amount: Money,
    claim_date: Sourced<NaiveDate>,
    description: Option<Sourced<String>>,
    vendor: Option<Sourced<String>>,
    project_code: Option<Sourced<String>>,
    ai_confidence: u8,
}

impl Default for ClaimDraftBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimDraftBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            employee_id: EmployeeId::new(),
            claim_type: ClaimType::Reimbursement,
            category: "travel".to_string(),
            amount: MoneyFixtures::inr_small(),
            claim_date: Sourced::ocr(TemporalFixtures::recent_claim_date()),
            description: None,
            vendor: Some(Sourced::ocr("City Cabs".to_string())),
            project_code: None,
            ai_confidence: 90,
        }
    }

    /// Sets the submitting employee
    pub fn with_employee(mut self, id: EmployeeId) -> Self {
        self.employee_id = id;
        self
    }

    /// Sets the category code
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Sets the claimed amount
    pub fn with_amount(mut self, amount: Money) -> Self {
        self.amount = amount;
        self
    }

    /// Sets the claim date
    pub fn with_claim_date(mut self, date: NaiveDate) -> Self {
        self.claim_date = Sourced::manual(date);
        self
    }

    /// Sets the vendor name
    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = Some(Sourced::ocr(vendor.into()));
        self
    }

    /// Uses a randomly generated vendor name
    pub fn with_random_vendor(mut self) -> Self {
        self.vendor = Some(Sourced::ocr(CompanyName().fake()));
        self
    }

    /// Clears the vendor field
    pub fn without_vendor(mut self) -> Self {
        self.vendor = None;
        self
    }

    /// Sets the project code
    pub fn with_project_code(mut self, code: impl Into<String>) -> Self {
        self.project_code = Some(Sourced::manual(code.into()));
        self
    }

    /// Sets the AI confidence score
    pub fn with_ai_confidence(mut self, confidence: u8) -> Self {
        self.ai_confidence = confidence;
        self
    }

    /// Builds the draft
    pub fn build(self) -> ClaimDraft {
        ClaimDraft {
            employee_id: self.employee_id,
            claim_type: self.claim_type,
            category: self.category,
            amount: self.amount,
            claim_date: self.claim_date,
            description: self.description,
            vendor: self.vendor,
            project_code: self.project_code,
            transaction_ref: None,
            documents: Vec::new(),
            ai_confidence: self.ai_confidence,
        }
    }
}

/// Builder for skip rules
pub struct SkipRuleBuilder {
    tenant_id: TenantId,
    name: String,
    priority: u32,
    is_active: bool,
    conditions: RuleConditions,
    scope: SkipScope,
}

impl SkipRuleBuilder {
    /// Creates a new builder for the tenant
    pub fn new(tenant_id: TenantId) -> Self {
        Self {
            tenant_id,
            name: "test rule".to_string(),
            priority: 100,
            is_active: true,
            conditions: RuleConditions::default(),
            scope: SkipScope::Manager,
        }
    }

    /// Sets the rule name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the evaluation priority
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    /// Deactivates the rule
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Restricts the rule to designations
    pub fn for_designations(mut self, designations: &[&str]) -> Self {
        self.conditions.designations = designations.iter().map(|d| d.to_string()).collect();
        self
    }

    /// Restricts the rule to project codes
    pub fn for_projects(mut self, codes: &[&str]) -> Self {
        self.conditions.project_codes = codes.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Caps the rule at an amount
    pub fn up_to(mut self, max_amount: Decimal) -> Self {
        self.conditions.max_amount = Some(max_amount);
        self
    }

    /// Sets the stages the rule bypasses
    pub fn with_scope(mut self, scope: SkipScope) -> Self {
        self.scope = scope;
        self
    }

    /// Builds the rule
    pub fn build(self) -> ApprovalSkipRule {
        let now = Utc::now();
        ApprovalSkipRule {
            id: SkipRuleId::new(),
            tenant_id: self.tenant_id,
            name: self.name,
            priority: self.priority,
            is_active: self.is_active,
            conditions: self.conditions,
            scope: self.scope,
            created_at: now,
            updated_at: now,
        }
    }
}
