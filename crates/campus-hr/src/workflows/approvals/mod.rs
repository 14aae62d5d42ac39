//! Leave, promotion, and resignation approval workflows.
//!
//! Leave requests walk a role chain chosen by leave type (`hod → dean → hr`, or
//! `hod → vc → president` for medical leave). Promotions and resignations follow shorter
//! HR-driven flows. Terminal approvals mutate the roster inside the same commit.

pub mod catalog;
pub mod chain;
pub mod domain;
pub(crate) mod effects;
pub mod eligibility;
pub mod records;
pub mod router;
pub mod service;
pub(crate) mod validation;

#[cfg(test)]
mod tests;

pub use catalog::{Designation, LeaveType};
pub use chain::{ApprovalAction, ChainError, ChainTemplate, DecisionMetadata};
pub use domain::{
    ApprovalRole, ApprovalStep, CommitteeReview, Decision, Employee, EmployeeId,
    EmployeeSnapshot, EmployeeStatus, EmployeeUpdate, EmploymentStatus, ExEmployee, ExitSurvey,
    Gender, HandoverStatus, HrDecision, LeaveRequest, LeaveStatus, NewEmployee, NewLeave,
    NewPromotion, NewResignation, PromotionRequest, PromotionStatus, RequestId,
    ResignationRequest, ResignationStatus, StepStatus,
};
pub use effects::{years_of_service, EffectError};
pub use eligibility::{AdvanceNoticeCheck, MaternityEligibility};
pub use records::{HrRecords, LeaveFilter, RecordStore, RecordsSummary, StoreError};
pub use router::approvals_router;
pub use service::{
    HrRequestService, HrServiceError, LeavePolicy, PromotionUpdate, ResignationUpdate,
};
pub use validation::ValidationError;
