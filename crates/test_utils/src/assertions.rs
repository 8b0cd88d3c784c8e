//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for domain types that give more
//! meaningful error messages than standard assertions.

use domain_approval::claim::{Claim, ClaimStatus, HistoryAction};
use domain_approval::compliance::CheckStatus;

/// Asserts the claim is in the expected status
///
/// # Panics
///
/// Panics with the claim number and full history when the status differs,
/// which makes workflow test failures readable.
pub fn assert_claim_status(claim: &Claim, expected: ClaimStatus) {
    assert_eq!(
        claim.status, expected,
        "claim {} expected status {} but was {} (history: {:?})",
        claim.claim_number,
        expected,
        claim.status,
        claim
            .approval_history
            .iter()
            .map(|h| (h.action, h.to_status))
            .collect::<Vec<_>>()
    );
}

/// Asserts the last history entry records the given action
pub fn assert_last_action(claim: &Claim, expected: HistoryAction) {
    let last = claim
        .approval_history
        .last()
        .unwrap_or_else(|| panic!("claim {} has no history", claim.claim_number));
    assert_eq!(
        last.action, expected,
        "claim {} last action was {:?}, expected {:?}",
        claim.claim_number, last.action, expected
    );
}

/// Asserts a named policy check resolved to the given status
pub fn assert_check_status(claim: &Claim, check_id: &str, expected: CheckStatus) {
    let check = claim
        .policy_checks
        .iter()
        .find(|c| c.id == check_id)
        .unwrap_or_else(|| {
            panic!(
                "claim {} has no check '{}' (checks: {:?})",
                claim.claim_number,
                check_id,
                claim.policy_checks.iter().map(|c| &c.id).collect::<Vec<_>>()
            )
        });
    assert_eq!(
        check.status, expected,
        "check '{}' was {:?} ({}), expected {:?}",
        check_id, check.status, check.message, expected
    );
}

/// Asserts the history never shrinks between two claim snapshots
pub fn assert_history_grew(before: &Claim, after: &Claim) {
    assert!(
        after.approval_history.len() > before.approval_history.len(),
        "claim {} history did not grow ({} -> {})",
        after.claim_number,
        before.approval_history.len(),
        after.approval_history.len()
    );
}
