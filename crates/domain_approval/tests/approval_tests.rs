//! Comprehensive tests for domain_approval

use chrono::{Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

use core_kernel::{
    ClaimId, Currency, DocumentId, EmployeeId, FiscalYear, Money, SkipRuleId, TenantId, Timezone,
};

use domain_approval::claim::{
    ActorRole, Claim, ClaimEdits, ClaimStatus, ClaimType, DocumentRef, HistoryAction, Sourced,
};
use domain_approval::compliance::{
    self, CategoryPolicy, CheckStatus, TenantPolicyConfig,
};
use domain_approval::error::ApprovalError;
use domain_approval::skip_rules::{
    ApprovalSkipRule, EmployeeContext, RuleConditions, SkipScope,
};
use domain_approval::state_machine::{
    self, ActionRequest, ApprovalAction, AutoApprovalConfig, TransitionContext,
};

fn recent_date(days_ago: u64) -> NaiveDate {
    Utc::now().date_naive() - Days::new(days_ago)
}

fn create_test_claim(status: ClaimStatus, amount: Decimal) -> Claim {
    Claim {
        id: ClaimId::new_v7(),
        tenant_id: TenantId::new(),
        employee_id: EmployeeId::new(),
        claim_number: "EXP-2025-000042".to_string(),
        claim_type: ClaimType::Reimbursement,
        category: "travel".to_string(),
        amount: Money::new(amount, Currency::INR),
        claim_date: Sourced::ocr(recent_date(4)),
        description: Some(Sourced::ocr("Client visit taxi".to_string())),
        vendor: Some(Sourced::ocr("City Cabs".to_string())),
        project_code: None,
        transaction_ref: None,
        documents: vec![DocumentRef {
            id: DocumentId::new(),
            file_name: "receipt.pdf".to_string(),
        }],
        status,
        version: 1,
        return_count: 0,
        ai_confidence: 96,
        compliance_score: 0,
        policy_checks: vec![],
        approval_history: vec![],
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn create_policy() -> TenantPolicyConfig {
    let mut categories = HashMap::new();
    categories.insert(
        "travel".to_string(),
        CategoryPolicy {
            max_amount: Some(dec!(10000)),
            submission_window_days: Some(30),
            requires_documents: true,
        },
    );
    TenantPolicyConfig {
        categories,
        approved_vendors: vec!["City Cabs".to_string()],
        fiscal_year: FiscalYear::starting_in(1).unwrap(),
        timezone: Timezone::default(),
    }
}

fn create_auto_config() -> AutoApprovalConfig {
    AutoApprovalConfig {
        enabled: true,
        ai_threshold: 95,
        compliance_threshold: 80,
        max_amount: dec!(5000),
        auto_skip_after_manager: false,
    }
}

fn create_rule(priority: u32, scope: SkipScope, conditions: RuleConditions) -> ApprovalSkipRule {
    ApprovalSkipRule {
        id: SkipRuleId::new(),
        tenant_id: TenantId::new(),
        name: format!("rule-p{}", priority),
        priority,
        is_active: true,
        conditions,
        scope,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn plan<'a>(
    claim: &Claim,
    action: ApprovalAction,
    role: ActorRole,
    comment: Option<&str>,
    rules: &'a [ApprovalSkipRule],
    policy: &'a TenantPolicyConfig,
    auto: &'a AutoApprovalConfig,
) -> Result<state_machine::Transition, ApprovalError> {
    let employee = EmployeeContext::default();
    let ctx = TransitionContext {
        rules,
        employee: &employee,
        policy,
        auto_approval: auto,
        duplicates: &[],
        now: Utc::now(),
    };
    state_machine::plan(
        claim,
        &ActionRequest {
            action,
            actor_id: claim.employee_id,
            actor_role: role,
            comment: comment.map(String::from),
        },
        &ctx,
    )
}

// ============================================================================
// Auto-approval thresholds
// ============================================================================

mod auto_approval_tests {
    use super::*;

    #[test]
    fn test_claim_meeting_every_threshold_is_auto_approved() {
        let claim = create_test_claim(ClaimStatus::Draft, dec!(200));
        let policy = create_policy();
        let auto = create_auto_config();

        let transition = plan(
            &claim,
            ApprovalAction::Submit,
            ActorRole::Employee,
            None,
            &[],
            &policy,
            &auto,
        )
        .unwrap();

        assert_eq!(transition.to, ClaimStatus::Approved);
        let evaluation = transition.evaluation.unwrap();
        assert!(evaluation.score >= 80);
        assert!(!evaluation.has_failures());
    }

    #[test]
    fn test_amount_above_auto_limit_routes_to_manager() {
        let claim = create_test_claim(ClaimStatus::Draft, dec!(6000));
        let policy = create_policy();
        let auto = create_auto_config();

        let transition = plan(
            &claim,
            ApprovalAction::Submit,
            ActorRole::Employee,
            None,
            &[],
            &policy,
            &auto,
        )
        .unwrap();

        assert_eq!(transition.to, ClaimStatus::PendingManager);
        // The evaluation still ran and is carried on the transition
        assert!(transition.evaluation.is_some());
    }

    #[test]
    fn test_low_ai_confidence_routes_to_manager() {
        let mut claim = create_test_claim(ClaimStatus::Draft, dec!(200));
        claim.ai_confidence = 94;
        let policy = create_policy();
        let auto = create_auto_config();

        let transition = plan(
            &claim,
            ApprovalAction::Submit,
            ActorRole::Employee,
            None,
            &[],
            &policy,
            &auto,
        )
        .unwrap();

        assert_eq!(transition.to, ClaimStatus::PendingManager);
    }

    #[test]
    fn test_thresholds_are_inclusive() {
        let mut claim = create_test_claim(ClaimStatus::Draft, dec!(5000));
        claim.ai_confidence = 95;
        let policy = create_policy();
        let auto = create_auto_config();

        let transition = plan(
            &claim,
            ApprovalAction::Submit,
            ActorRole::Employee,
            None,
            &[],
            &policy,
            &auto,
        )
        .unwrap();

        // ai 95 >= 95, amount 5000 <= 5000
        assert_eq!(transition.to, ClaimStatus::Approved);
    }

    #[test]
    fn test_failing_check_blocks_auto_approval_even_with_high_score() {
        // duplicate fails while everything else passes
        let claim = create_test_claim(ClaimStatus::Draft, dec!(200));
        let policy = create_policy();
        let auto = create_auto_config();
        let employee = EmployeeContext::default();
        let duplicates = vec![domain_approval::compliance::DuplicateCandidate {
            claim_id: ClaimId::new_v7(),
            status: ClaimStatus::Approved,
            amount: dec!(200),
            vendor: Some("City Cabs".to_string()),
            claim_date: claim.claim_date.value,
        }];
        let ctx = TransitionContext {
            rules: &[],
            employee: &employee,
            policy: &policy,
            auto_approval: &auto,
            duplicates: &duplicates,
            now: Utc::now(),
        };

        let transition = state_machine::plan(
            &claim,
            &ActionRequest {
                action: ApprovalAction::Submit,
                actor_id: claim.employee_id,
                actor_role: ActorRole::Employee,
                comment: None,
            },
            &ctx,
        )
        .unwrap();

        assert_eq!(transition.to, ClaimStatus::PendingManager);
        assert!(transition.evaluation.unwrap().has_failures());
    }
}

// ============================================================================
// Skip rule routing
// ============================================================================

mod skip_routing_tests {
    use super::*;

    #[test]
    fn test_matching_rule_bypasses_evaluation() {
        let claim = create_test_claim(ClaimStatus::Draft, dec!(200));
        let policy = create_policy();
        let auto = AutoApprovalConfig::default();
        let rules = vec![create_rule(1, SkipScope::Manager, RuleConditions::default())];

        let transition = plan(
            &claim,
            ApprovalAction::Submit,
            ActorRole::Employee,
            None,
            &rules,
            &policy,
            &auto,
        )
        .unwrap();

        assert_eq!(transition.to, ClaimStatus::PendingHr);
        assert!(transition.evaluation.is_none());
        assert!(transition.skip.is_some());
    }

    #[test]
    fn test_scope_all_approves_on_submission() {
        let claim = create_test_claim(ClaimStatus::Draft, dec!(200));
        let policy = create_policy();
        let auto = AutoApprovalConfig::default();
        let rules = vec![create_rule(1, SkipScope::All, RuleConditions::default())];

        let transition = plan(
            &claim,
            ApprovalAction::Submit,
            ActorRole::Employee,
            None,
            &rules,
            &policy,
            &auto,
        )
        .unwrap();

        assert_eq!(transition.to, ClaimStatus::Approved);
    }

    #[test]
    fn test_lower_priority_rule_shadows_broader_one() {
        let claim = create_test_claim(ClaimStatus::Draft, dec!(200));
        let policy = create_policy();
        let auto = AutoApprovalConfig::default();
        let rules = vec![
            create_rule(10, SkipScope::All, RuleConditions::default()),
            create_rule(2, SkipScope::Manager, RuleConditions::default()),
        ];

        let transition = plan(
            &claim,
            ApprovalAction::Submit,
            ActorRole::Employee,
            None,
            &rules,
            &policy,
            &auto,
        )
        .unwrap();

        assert_eq!(transition.to, ClaimStatus::PendingHr);
        assert_eq!(transition.skip.unwrap().rule_name, "rule-p2");
    }

    #[test]
    fn test_non_matching_rule_falls_through_to_evaluation() {
        let claim = create_test_claim(ClaimStatus::Draft, dec!(200));
        let policy = create_policy();
        let auto = AutoApprovalConfig::default();
        let rules = vec![create_rule(
            1,
            SkipScope::All,
            RuleConditions {
                max_amount: Some(dec!(50)),
                ..Default::default()
            },
        )];

        let transition = plan(
            &claim,
            ApprovalAction::Submit,
            ActorRole::Employee,
            None,
            &rules,
            &policy,
            &auto,
        )
        .unwrap();

        assert_eq!(transition.to, ClaimStatus::PendingManager);
        assert!(transition.evaluation.is_some());
    }
}

// ============================================================================
// Return and resubmission loop
// ============================================================================

mod return_loop_tests {
    use super::*;

    #[test]
    fn test_return_from_hr_then_resubmit_after_edit() {
        let policy = create_policy();
        let auto = create_auto_config();
        let mut claim = create_test_claim(ClaimStatus::PendingHr, dec!(6000));

        // HR sends it back
        let req = ActionRequest {
            action: ApprovalAction::Return,
            actor_id: EmployeeId::new(),
            actor_role: ActorRole::Hr,
            comment: Some("amount looks wrong".to_string()),
        };
        let transition = plan(
            &claim,
            ApprovalAction::Return,
            ActorRole::Hr,
            Some("amount looks wrong"),
            &[],
            &policy,
            &auto,
        )
        .unwrap();
        state_machine::apply(&mut claim, &req, transition, Utc::now());

        assert_eq!(claim.status, ClaimStatus::Returned);
        assert_eq!(claim.return_count, 1);

        // Employee corrects the amount below the auto-approval limit
        claim
            .apply_edits(ClaimEdits {
                amount: Some(Money::new(dec!(200), Currency::INR)),
                ..Default::default()
            })
            .unwrap();

        let req = ActionRequest {
            action: ApprovalAction::Resubmit,
            actor_id: claim.employee_id,
            actor_role: ActorRole::Employee,
            comment: None,
        };
        let transition = plan(
            &claim,
            ApprovalAction::Resubmit,
            ActorRole::Employee,
            None,
            &[],
            &policy,
            &auto,
        )
        .unwrap();
        state_machine::apply(&mut claim, &req, transition, Utc::now());

        assert_eq!(claim.status, ClaimStatus::Approved);
        assert_eq!(claim.return_count, 1);
        assert_eq!(claim.approval_history.len(), 2);
        assert_eq!(
            claim.approval_history.last().unwrap().action,
            HistoryAction::Submitted
        );
    }

    #[test]
    fn test_repeated_returns_accumulate() {
        let mut claim = create_test_claim(ClaimStatus::PendingManager, dec!(200));
        let req = ActionRequest {
            action: ApprovalAction::Return,
            actor_id: EmployeeId::new(),
            actor_role: ActorRole::Manager,
            comment: Some("fix it".to_string()),
        };

        for expected in 1..=3u32 {
            claim.status = ClaimStatus::PendingManager;
            let transition = state_machine::Transition {
                to: ClaimStatus::Returned,
                evaluation: None,
                skip: None,
                history_action: HistoryAction::Returned,
            };
            state_machine::apply(&mut claim, &req, transition, Utc::now());
            assert_eq!(claim.return_count, expected);
        }
    }
}

// ============================================================================
// Compliance scoring at the crate boundary
// ============================================================================

mod compliance_tests {
    use super::*;

    #[test]
    fn test_clean_claim_scores_full_marks() {
        let claim = create_test_claim(ClaimStatus::Draft, dec!(200));
        let evaluation = compliance::evaluate(&claim, &create_policy(), &[], Utc::now());

        assert_eq!(evaluation.score, 100);
        assert_eq!(evaluation.checks.len(), 6);
    }

    #[test]
    fn test_unconfigured_tenant_warns_instead_of_erroring() {
        let claim = create_test_claim(ClaimStatus::Draft, dec!(200));
        let evaluation =
            compliance::evaluate(&claim, &TenantPolicyConfig::default(), &[], Utc::now());

        assert!(evaluation
            .checks
            .iter()
            .all(|c| c.status != CheckStatus::Fail));
        assert!(evaluation
            .checks
            .iter()
            .any(|c| c.status == CheckStatus::Warning));
    }

    #[test]
    fn test_zero_amount_excluded_from_score() {
        let mut claim = create_test_claim(ClaimStatus::Draft, dec!(200));
        claim.amount = Money::zero(Currency::INR);
        let evaluation = compliance::evaluate(&claim, &create_policy(), &[], Utc::now());

        let amount_check = evaluation
            .checks
            .iter()
            .find(|c| c.id == compliance::CHECK_AMOUNT_LIMIT)
            .unwrap();
        assert_eq!(amount_check.status, CheckStatus::Checking);
    }
}
