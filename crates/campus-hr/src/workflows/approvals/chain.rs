//! Leave approval chains.
//!
//! Chains are walked strictly by index. [`advance`] records one approver action and
//! re-derives the aggregate status of the request; it trusts its caller to only act for the
//! role returned by [`awaiting_role`]. The request service enforces that ordering before
//! calling in.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::catalog::LeaveType;
use super::domain::{
    ApprovalRole, ApprovalStep, Decision, LeaveRequest, LeaveStatus, RequestId, StepStatus,
};

/// Shape of an approval chain, chosen by leave type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainTemplate {
    Standard,
    Medical,
}

struct ChainShape {
    roles: &'static [ApprovalRole],
    split_authority: ApprovalRole,
    category_authority: ApprovalRole,
}

const STANDARD: ChainShape = ChainShape {
    roles: &[ApprovalRole::Hod, ApprovalRole::Dean, ApprovalRole::Hr],
    split_authority: ApprovalRole::Dean,
    category_authority: ApprovalRole::Hr,
};

const MEDICAL: ChainShape = ChainShape {
    roles: &[ApprovalRole::Hod, ApprovalRole::Vc, ApprovalRole::President],
    split_authority: ApprovalRole::President,
    category_authority: ApprovalRole::President,
};

impl ChainTemplate {
    pub const fn for_leave(leave_type: LeaveType) -> Self {
        match leave_type {
            LeaveType::Medical => Self::Medical,
            _ => Self::Standard,
        }
    }

    const fn shape(self) -> &'static ChainShape {
        match self {
            Self::Standard => &STANDARD,
            Self::Medical => &MEDICAL,
        }
    }

    pub const fn roles(self) -> &'static [ApprovalRole] {
        self.shape().roles
    }

    /// Role allowed to divide the requested days into paid and unpaid portions.
    pub const fn split_authority(self) -> ApprovalRole {
        self.shape().split_authority
    }

    /// Role allowed to assign the leave category.
    pub const fn category_authority(self) -> ApprovalRole {
        self.shape().category_authority
    }

    /// Whether the category is also stored on the authority's step.
    const fn category_on_step(self) -> bool {
        matches!(self, Self::Medical)
    }
}

/// Fresh chain for a new leave request, every step pending.
pub fn initialize_chain(leave_type: LeaveType) -> Vec<ApprovalStep> {
    ChainTemplate::for_leave(leave_type)
        .roles()
        .iter()
        .map(|role| ApprovalStep::pending(*role))
        .collect()
}

/// Optional extras an approver may attach to a decision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionMetadata {
    #[serde(default)]
    pub paid_days: Option<u32>,
    #[serde(default)]
    pub unpaid_days: Option<u32>,
    #[serde(default)]
    pub leave_category: Option<String>,
}

/// A single approver action against a leave request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalAction {
    pub role: ApprovalRole,
    pub decision: Decision,
    pub approver_name: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub metadata: DecisionMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    #[error("role {role:?} is not part of the approval chain for request {request_id}")]
    RoleNotInChain {
        request_id: RequestId,
        role: ApprovalRole,
    },
    #[error("role {role:?} acted out of order on request {request_id}; awaiting {awaiting:?}")]
    OutOfOrder {
        request_id: RequestId,
        role: ApprovalRole,
        awaiting: Option<ApprovalRole>,
    },
    #[error("step {role:?} on request {request_id} was already decided")]
    StepAlreadyDecided {
        request_id: RequestId,
        role: ApprovalRole,
    },
    #[error(
        "split of {paid} paid and {unpaid:?} unpaid days does not fit the {days} days of request {request_id}"
    )]
    InvalidSplit {
        request_id: RequestId,
        days: u32,
        paid: u32,
        unpaid: Option<u32>,
    },
}

/// Aggregate status implied by a chain's step outcomes.
pub fn derive_status(chain: &[ApprovalStep]) -> LeaveStatus {
    if chain.iter().any(|step| step.status == StepStatus::Rejected) {
        return LeaveStatus::Rejected;
    }

    let approved = chain
        .iter()
        .filter(|step| step.status == StepStatus::Approved)
        .count();

    match approved {
        0 => LeaveStatus::Pending,
        n if n == chain.len() => LeaveStatus::Approved,
        _ => LeaveStatus::Forwarded,
    }
}

/// Role whose turn it is, or `None` once the chain is closed.
pub fn awaiting_role(chain: &[ApprovalStep]) -> Option<ApprovalRole> {
    for step in chain {
        match step.status {
            StepStatus::Approved => continue,
            StepStatus::Pending => return Some(step.role),
            StepStatus::Rejected => return None,
        }
    }
    None
}

/// Fill in a missing chain on records stored before chains existed.
pub fn ensure_chain(request: &mut LeaveRequest) {
    if request.approval_chain.is_empty() {
        request.approval_chain = initialize_chain(request.leave_type);
    }
}

/// Paid and unpaid portions must add up to the requested days. A missing unpaid figure
/// takes the remainder.
fn split_days(
    request: &LeaveRequest,
    paid: u32,
    unpaid: Option<u32>,
) -> Result<(u32, u32), ChainError> {
    let invalid = || ChainError::InvalidSplit {
        request_id: request.id.clone(),
        days: request.days,
        paid,
        unpaid,
    };
    let remainder = request.days.checked_sub(paid).ok_or_else(invalid)?;
    match unpaid {
        Some(unpaid) if unpaid != remainder => Err(invalid()),
        _ => Ok((paid, remainder)),
    }
}

/// Apply one approver action and re-derive the request status.
pub fn advance(
    request: &mut LeaveRequest,
    action: &ApprovalAction,
    on: NaiveDate,
) -> Result<LeaveStatus, ChainError> {
    ensure_chain(request);

    let template = ChainTemplate::for_leave(request.leave_type);
    let index = request
        .approval_chain
        .iter()
        .position(|step| step.role == action.role)
        .ok_or_else(|| ChainError::RoleNotInChain {
            request_id: request.id.clone(),
            role: action.role,
        })?;

    let split = if action.role == template.split_authority()
        && action.decision == Decision::Approved
    {
        action
            .metadata
            .paid_days
            .map(|paid| split_days(request, paid, action.metadata.unpaid_days))
            .transpose()?
    } else {
        None
    };

    let step = &mut request.approval_chain[index];
    step.status = action.decision.step_status();
    step.by = Some(action.approver_name.clone());
    step.date = Some(on);
    step.comment = action.comment.clone();

    if let Some((paid, unpaid)) = split {
        step.paid_days = Some(paid);
        step.unpaid_days = Some(unpaid);
        request.paid_days = Some(paid);
        request.unpaid_days = Some(unpaid);
    }

    if action.role == template.category_authority() {
        if let Some(category) = &action.metadata.leave_category {
            if template.category_on_step() {
                request.approval_chain[index].leave_category = Some(category.clone());
            }
            request.leave_category = Some(category.clone());
        }
    }

    match action.decision {
        Decision::Rejected => {
            request.status = LeaveStatus::Rejected;
            request.current_approver = None;
            request.reviewed_by = Some(action.approver_name.clone());
            request.reviewed_on = Some(on);
        }
        Decision::Approved => {
            let next = request.approval_chain[index + 1..]
                .iter()
                .find(|step| step.status == StepStatus::Pending)
                .map(|step| step.role);

            match next {
                Some(role) => {
                    request.status = LeaveStatus::Forwarded;
                    request.current_approver = Some(role);
                }
                None => {
                    request.status = LeaveStatus::Approved;
                    request.current_approver = None;
                    request.reviewed_by = Some(action.approver_name.clone());
                    request.reviewed_on = Some(on);
                }
            }
        }
    }

    Ok(request.status)
}
