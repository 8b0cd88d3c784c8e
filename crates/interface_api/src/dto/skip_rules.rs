//! Skip rule and tenant configuration DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use domain_approval::skip_rules::{ApprovalSkipRule, RuleConditions, SkipScope};
use domain_approval::state_machine::AutoApprovalConfig;

#[derive(Debug, Deserialize, Validate)]
pub struct SkipRuleRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    pub priority: u32,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub conditions: RuleConditions,
    pub scope: SkipScope,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct SkipRuleResponse {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub priority: u32,
    pub is_active: bool,
    pub conditions: RuleConditions,
    pub scope: SkipScope,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&ApprovalSkipRule> for SkipRuleResponse {
    fn from(rule: &ApprovalSkipRule) -> Self {
        Self {
            id: rule.id.to_string(),
            tenant_id: rule.tenant_id.to_string(),
            name: rule.name.clone(),
            priority: rule.priority,
            is_active: rule.is_active,
            conditions: rule.conditions.clone(),
            scope: rule.scope,
            created_at: rule.created_at,
            updated_at: rule.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AutoApprovalRequest {
    pub enabled: bool,
    #[validate(range(max = 100, message = "ai_threshold must be between 0 and 100"))]
    pub ai_threshold: u8,
    #[validate(range(max = 100, message = "compliance_threshold must be between 0 and 100"))]
    pub compliance_threshold: u8,
    pub max_amount: Decimal,
    #[serde(default)]
    pub auto_skip_after_manager: bool,
}

impl From<AutoApprovalRequest> for AutoApprovalConfig {
    fn from(req: AutoApprovalRequest) -> Self {
        Self {
            enabled: req.enabled,
            ai_threshold: req.ai_threshold,
            compliance_threshold: req.compliance_threshold,
            max_amount: req.max_amount,
            auto_skip_after_manager: req.auto_skip_after_manager,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AutoApprovalResponse {
    pub enabled: bool,
    pub ai_threshold: u8,
    pub compliance_threshold: u8,
    pub max_amount: Decimal,
    pub auto_skip_after_manager: bool,
}

impl From<AutoApprovalConfig> for AutoApprovalResponse {
    fn from(config: AutoApprovalConfig) -> Self {
        Self {
            enabled: config.enabled,
            ai_threshold: config.ai_threshold,
            compliance_threshold: config.compliance_threshold,
            max_amount: config.max_amount,
            auto_skip_after_manager: config.auto_skip_after_manager,
        }
    }
}
