//! Integration Tests for the Expense Approval Engine
//!
//! These tests verify cross-crate workflows end to end: the orchestration
//! service driving the state machine, compliance evaluator, and skip rule
//! resolver over the in-memory store.

use std::sync::Arc;

use rust_decimal_macros::dec;

use core_kernel::{Currency, EmployeeId, Money, TenantId};
use domain_approval::claim::{ActorRole, ClaimEdits, ClaimStatus, HistoryAction};
use domain_approval::error::ApprovalError;
use domain_approval::ports::{SkipRuleStore, TenantConfigStore};
use domain_approval::skip_rules::SkipScope;
use domain_approval::state_machine::{ActionRequest, ApprovalAction};
use domain_approval::ApprovalService;
use infra_store::MemoryStore;
use test_utils::assertions::{assert_claim_status, assert_last_action};
use test_utils::builders::{ClaimDraftBuilder, SkipRuleBuilder};
use test_utils::fixtures::{ConfigFixtures, MoneyFixtures};

struct Harness {
    service: ApprovalService,
    store: Arc<MemoryStore>,
    tenant: TenantId,
}

async fn harness() -> Harness {
    let store = MemoryStore::new();
    let service = ApprovalService::new(store.clone(), store.clone(), store.clone());
    let tenant = TenantId::new();
    store
        .put_policy_config(tenant, ConfigFixtures::standard_policy())
        .await
        .expect("seed policy");
    Harness {
        service,
        store,
        tenant,
    }
}

fn action(action: ApprovalAction, role: ActorRole, comment: Option<&str>) -> ActionRequest {
    ActionRequest {
        action,
        actor_id: EmployeeId::new(),
        actor_role: role,
        comment: comment.map(String::from),
    }
}

mod full_workflow {
    use super::*;

    /// A plain claim walks every stage to settlement
    #[tokio::test]
    async fn test_submit_to_settlement() {
        let h = harness().await;
        let draft = ClaimDraftBuilder::new().build();

        let claim = h.service.submit_claim(h.tenant, draft).await.unwrap();
        assert_claim_status(&claim, ClaimStatus::PendingManager);
        assert_eq!(claim.version, 1);
        assert_eq!(claim.approval_history.len(), 1);
        assert!(claim.compliance_score > 0);

        let claim = h
            .service
            .act_on_claim(
                h.tenant,
                claim.id,
                action(ApprovalAction::Approve, ActorRole::Manager, None),
            )
            .await
            .unwrap();
        assert_claim_status(&claim, ClaimStatus::PendingHr);
        assert_eq!(claim.version, 2);

        let claim = h
            .service
            .act_on_claim(
                h.tenant,
                claim.id,
                action(ApprovalAction::Approve, ActorRole::Hr, None),
            )
            .await
            .unwrap();
        assert_claim_status(&claim, ClaimStatus::PendingFinance);

        let claim = h
            .service
            .act_on_claim(
                h.tenant,
                claim.id,
                action(ApprovalAction::Approve, ActorRole::Finance, None),
            )
            .await
            .unwrap();
        assert_claim_status(&claim, ClaimStatus::Approved);

        let claim = h
            .service
            .act_on_claim(
                h.tenant,
                claim.id,
                action(ApprovalAction::Settle, ActorRole::Finance, None),
            )
            .await
            .unwrap();
        assert_claim_status(&claim, ClaimStatus::Settled);
        assert_last_action(&claim, HistoryAction::Settled);
        assert_eq!(claim.approval_history.len(), 5);
        assert_eq!(claim.version, 5);
    }

    /// A rejected claim is terminal
    #[tokio::test]
    async fn test_rejection_is_terminal() {
        let h = harness().await;
        let claim = h
            .service
            .submit_claim(h.tenant, ClaimDraftBuilder::new().build())
            .await
            .unwrap();

        let claim = h
            .service
            .act_on_claim(
                h.tenant,
                claim.id,
                action(
                    ApprovalAction::Reject,
                    ActorRole::Manager,
                    Some("personal expense"),
                ),
            )
            .await
            .unwrap();
        assert_claim_status(&claim, ClaimStatus::Rejected);

        let result = h
            .service
            .act_on_claim(
                h.tenant,
                claim.id,
                action(ApprovalAction::Approve, ActorRole::Admin, None),
            )
            .await;
        assert!(matches!(
            result,
            Err(ApprovalError::InvalidTransition { .. })
        ));
    }
}

mod skip_rules {
    use super::*;

    /// A matching rule routes the submitting claim past manager and HR
    #[tokio::test]
    async fn test_director_rule_skips_to_finance() {
        let h = harness().await;
        let employee = EmployeeId::new();
        h.store
            .put_employee_context(h.tenant, employee, ConfigFixtures::director_context())
            .await
            .unwrap();
        h.store
            .upsert(
                SkipRuleBuilder::new(h.tenant)
                    .with_name("director fast lane")
                    .for_designations(&["director"])
                    .with_scope(SkipScope::ManagerAndHr)
                    .build(),
            )
            .await
            .unwrap();

        let claim = h
            .service
            .submit_claim(
                h.tenant,
                ClaimDraftBuilder::new().with_employee(employee).build(),
            )
            .await
            .unwrap();

        assert_claim_status(&claim, ClaimStatus::PendingFinance);
        // Skip routing bypasses the evaluator entirely
        assert!(claim.policy_checks.is_empty());
        assert_eq!(claim.compliance_score, 0);
    }

    /// An inactive or non-matching rule changes nothing
    #[tokio::test]
    async fn test_inactive_rule_is_ignored() {
        let h = harness().await;
        h.store
            .upsert(
                SkipRuleBuilder::new(h.tenant)
                    .with_scope(SkipScope::All)
                    .inactive()
                    .build(),
            )
            .await
            .unwrap();

        let claim = h
            .service
            .submit_claim(h.tenant, ClaimDraftBuilder::new().build())
            .await
            .unwrap();
        assert_claim_status(&claim, ClaimStatus::PendingManager);
    }
}

mod auto_approval {
    use super::*;

    #[tokio::test]
    async fn test_clean_small_claim_is_auto_approved() {
        let h = harness().await;
        h.store
            .put_auto_approval_config(h.tenant, ConfigFixtures::permissive_auto_approval())
            .await
            .unwrap();

        let claim = h
            .service
            .submit_claim(h.tenant, ClaimDraftBuilder::new().build())
            .await
            .unwrap();

        assert_claim_status(&claim, ClaimStatus::Approved);
        assert!(claim.compliance_score >= 70);
        assert!(!claim.has_failing_checks());
    }

    #[tokio::test]
    async fn test_large_claim_still_needs_a_manager() {
        let h = harness().await;
        h.store
            .put_auto_approval_config(h.tenant, ConfigFixtures::permissive_auto_approval())
            .await
            .unwrap();

        let claim = h
            .service
            .submit_claim(
                h.tenant,
                ClaimDraftBuilder::new()
                    .with_amount(MoneyFixtures::inr_large())
                    .build(),
            )
            .await
            .unwrap();

        assert_claim_status(&claim, ClaimStatus::PendingManager);
    }
}

mod return_and_resubmit {
    use super::*;

    #[tokio::test]
    async fn test_returned_claim_can_be_fixed_and_resubmitted() {
        let h = harness().await;
        h.store
            .put_auto_approval_config(h.tenant, ConfigFixtures::permissive_auto_approval())
            .await
            .unwrap();

        let draft = ClaimDraftBuilder::new()
            .with_amount(MoneyFixtures::inr_large())
            .build();
        let employee = draft.employee_id;
        let claim = h.service.submit_claim(h.tenant, draft).await.unwrap();
        assert_claim_status(&claim, ClaimStatus::PendingManager);

        let claim = h
            .service
            .act_on_claim(
                h.tenant,
                claim.id,
                action(
                    ApprovalAction::Return,
                    ActorRole::Manager,
                    Some("split this into two claims"),
                ),
            )
            .await
            .unwrap();
        assert_claim_status(&claim, ClaimStatus::Returned);
        assert_eq!(claim.return_count, 1);

        let claim = h
            .service
            .resubmit_claim(
                h.tenant,
                claim.id,
                employee,
                ClaimEdits {
                    amount: Some(Money::new(dec!(450), Currency::INR)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_claim_status(&claim, ClaimStatus::Approved);
        assert_eq!(claim.return_count, 1);
        assert_eq!(claim.amount.amount(), dec!(450));
    }

    /// Resubmission is not reachable through the actions surface, which
    /// would let a non-owner sidestep the owner check
    #[tokio::test]
    async fn test_actions_surface_refuses_resubmit() {
        let h = harness().await;
        let claim = h
            .service
            .submit_claim(h.tenant, ClaimDraftBuilder::new().build())
            .await
            .unwrap();
        let claim = h
            .service
            .act_on_claim(
                h.tenant,
                claim.id,
                action(ApprovalAction::Return, ActorRole::Manager, Some("rework")),
            )
            .await
            .unwrap();
        assert_claim_status(&claim, ClaimStatus::Returned);

        // A stranger with the employee role tries to push it back in
        let result = h
            .service
            .act_on_claim(
                h.tenant,
                claim.id,
                action(ApprovalAction::Resubmit, ActorRole::Employee, None),
            )
            .await;
        assert!(matches!(result, Err(ApprovalError::Validation(_))));

        let result = h
            .service
            .act_on_claim(
                h.tenant,
                claim.id,
                action(ApprovalAction::Submit, ActorRole::Employee, None),
            )
            .await;
        assert!(matches!(result, Err(ApprovalError::Validation(_))));

        let stored = h.service.get_claim(h.tenant, claim.id).await.unwrap();
        assert_claim_status(&stored, ClaimStatus::Returned);
        assert_eq!(stored.version, claim.version);
    }

    #[tokio::test]
    async fn test_only_the_owner_may_resubmit() {
        let h = harness().await;
        let claim = h
            .service
            .submit_claim(h.tenant, ClaimDraftBuilder::new().build())
            .await
            .unwrap();
        let claim = h
            .service
            .act_on_claim(
                h.tenant,
                claim.id,
                action(ApprovalAction::Return, ActorRole::Manager, Some("rework")),
            )
            .await
            .unwrap();

        let result = h
            .service
            .resubmit_claim(h.tenant, claim.id, EmployeeId::new(), ClaimEdits::default())
            .await;
        assert!(matches!(result, Err(ApprovalError::Unauthorized { .. })));
    }
}

mod concurrency {
    use super::*;

    /// Racing approvals on the same claim: exactly one transition wins
    #[tokio::test]
    async fn test_concurrent_approvals_have_one_winner() {
        let h = harness().await;
        let claim = h
            .service
            .submit_claim(h.tenant, ClaimDraftBuilder::new().build())
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..6 {
            let service = h.service.clone();
            let tenant = h.tenant;
            let claim_id = claim.id;
            handles.push(tokio::spawn(async move {
                service
                    .act_on_claim(
                        tenant,
                        claim_id,
                        action(ApprovalAction::Approve, ActorRole::Manager, None),
                    )
                    .await
            }));
        }

        let mut wins = 0;
        let mut refused = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(updated) => {
                    wins += 1;
                    assert_claim_status(&updated, ClaimStatus::PendingHr);
                }
                // Losers see either a version conflict or, having read the
                // already-moved claim, a role/state refusal
                Err(
                    ApprovalError::Conflict(_)
                    | ApprovalError::Unauthorized { .. }
                    | ApprovalError::InvalidTransition { .. },
                ) => refused += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(wins, 1);
        assert_eq!(refused, 5);

        let stored = h.service.get_claim(h.tenant, claim.id).await.unwrap();
        assert_claim_status(&stored, ClaimStatus::PendingHr);
        assert_eq!(stored.version, 2);
        assert_eq!(stored.approval_history.len(), 2);
    }

    /// A refused action leaves the stored claim untouched
    #[tokio::test]
    async fn test_unauthorized_action_has_no_effect() {
        let h = harness().await;
        let claim = h
            .service
            .submit_claim(h.tenant, ClaimDraftBuilder::new().build())
            .await
            .unwrap();

        let result = h
            .service
            .act_on_claim(
                h.tenant,
                claim.id,
                action(ApprovalAction::Approve, ActorRole::Finance, None),
            )
            .await;
        assert!(matches!(result, Err(ApprovalError::Unauthorized { .. })));

        let stored = h.service.get_claim(h.tenant, claim.id).await.unwrap();
        assert_claim_status(&stored, ClaimStatus::PendingManager);
        assert_eq!(stored.version, claim.version);
        assert_eq!(stored.approval_history.len(), claim.approval_history.len());
    }
}
