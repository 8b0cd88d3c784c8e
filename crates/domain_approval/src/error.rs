use thiserror::Error;

use core_kernel::PortError;

use crate::claim::{ActorRole, ClaimStatus};
use crate::state_machine::ApprovalAction;

/// Errors surfaced by the approval domain
#[derive(Debug, Error)]
pub enum ApprovalError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Role {role} is not permitted to {action} a claim in state {status}")]
    Unauthorized {
        role: ActorRole,
        action: ApprovalAction,
        status: ClaimStatus,
    },

    #[error("Action {action} is not valid for a claim in state {status}")]
    InvalidTransition {
        status: ClaimStatus,
        action: ApprovalAction,
    },

    #[error("Concurrent modification: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    Store(String),
}

impl From<PortError> for ApprovalError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::Conflict { message } => ApprovalError::Conflict(message),
            PortError::NotFound { entity_type, id } => {
                ApprovalError::NotFound(format!("{} {}", entity_type, id))
            }
            PortError::Validation { message, .. } => ApprovalError::Validation(message),
            other => ApprovalError::Store(other.to_string()),
        }
    }
}
