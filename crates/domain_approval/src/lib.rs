//! Claim Approval Domain
//!
//! This crate implements the approval workflow for expense claims: skip
//! rule resolution, policy compliance evaluation, the multi-stage approval
//! state machine, and the orchestration service tying them to the store
//! ports.
//!
//! # Approval Lifecycle
//!
//! ```text
//! Draft -> Pending Manager -> Pending HR -> Pending Finance -> Approved -> Settled
//!              |                  |              |
//!              +--- Returned <----+--------------+        (resubmission loops back)
//!              +--- Rejected (terminal)
//! ```
//!
//! Skip rules and auto-approval thresholds can bypass stages at submission.

pub mod claim;
pub mod compliance;
pub mod error;
pub mod ports;
pub mod services;
pub mod skip_rules;
pub mod state_machine;

pub use claim::{
    ActorRole, ApprovalHistoryItem, Claim, ClaimEdits, ClaimStatus, ClaimType, DocumentRef,
    FieldSource, HistoryAction, Sourced,
};
pub use compliance::{
    CategoryPolicy, CheckStatus, ComplianceEvaluation, DuplicateCandidate, PolicyCheck,
    TenantPolicyConfig,
};
pub use error::ApprovalError;
pub use ports::{ClaimStore, SkipRuleStore, TenantConfigStore};
pub use services::{ApprovalService, ClaimDraft};
pub use skip_rules::{
    ApprovalSkipRule, EmployeeContext, RuleConditions, SkipDecision, SkipScope,
};
pub use state_machine::{
    ActionRequest, ApprovalAction, AutoApprovalConfig, Transition, TransitionContext,
};
