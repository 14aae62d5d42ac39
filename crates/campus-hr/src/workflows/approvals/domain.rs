use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::catalog::{Designation, LeaveType};

/// Identifier wrapper for employees.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EmployeeId(pub String);

/// Identifier wrapper shared by leave, promotion, and resignation requests.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestId(pub String);

impl std::fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmploymentStatus {
    Probation,
    Confirmed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmployeeStatus {
    Active,
    #[serde(rename = "On Leave")]
    OnLeave,
    Resigned,
}

impl EmployeeStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::OnLeave => "On Leave",
            Self::Resigned => "Resigned",
        }
    }
}

/// Active roster entry owned by the request service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub code: String,
    pub name: String,
    pub email: String,
    pub gender: Gender,
    pub department: String,
    pub faculty: String,
    pub designation: Designation,
    pub join_date: NaiveDate,
    pub employment_status: EmploymentStatus,
    pub probation_end_date: Option<NaiveDate>,
    pub status: EmployeeStatus,
    pub salary_base: u32,
    pub leave_balance: BTreeMap<LeaveType, u32>,
}

impl Employee {
    pub fn snapshot(&self) -> EmployeeSnapshot {
        EmployeeSnapshot {
            name: self.name.clone(),
            department: self.department.clone(),
            faculty: self.faculty.clone(),
            designation: self.designation,
        }
    }
}

/// Employee details copied onto a request when it is filed. Later roster edits never
/// touch it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeSnapshot {
    pub name: String,
    pub department: String,
    pub faculty: String,
    pub designation: Designation,
}

/// HR registration payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEmployee {
    pub code: String,
    pub name: String,
    pub email: String,
    pub gender: Gender,
    pub department: String,
    pub faculty: String,
    pub designation: Designation,
    pub join_date: NaiveDate,
    pub employment_status: EmploymentStatus,
    pub salary_base: u32,
}

/// Profile fields HR may edit after registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub faculty: Option<String>,
    #[serde(default)]
    pub employment_status: Option<EmploymentStatus>,
}

/// Roles that can sit in an approval chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalRole {
    Hod,
    Dean,
    Hr,
    Vc,
    President,
}

impl ApprovalRole {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Hod => "Head of Department",
            Self::Dean => "Dean",
            Self::Hr => "HR",
            Self::Vc => "Vice Chancellor",
            Self::President => "President",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Approved,
    Rejected,
}

/// Decision submitted by an approver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    #[serde(alias = "approve", alias = "Approved", alias = "Approve")]
    Approved,
    #[serde(alias = "reject", alias = "Rejected", alias = "Reject")]
    Rejected,
}

impl Decision {
    pub const fn step_status(self) -> StepStatus {
        match self {
            Self::Approved => StepStatus::Approved,
            Self::Rejected => StepStatus::Rejected,
        }
    }
}

/// One role-scoped entry of a leave approval chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalStep {
    pub role: ApprovalRole,
    pub status: StepStatus,
    pub by: Option<String>,
    pub date: Option<NaiveDate>,
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unpaid_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leave_category: Option<String>,
}

impl ApprovalStep {
    pub fn pending(role: ApprovalRole) -> Self {
        Self {
            role,
            status: StepStatus::Pending,
            by: None,
            date: None,
            comment: None,
            paid_days: None,
            unpaid_days: None,
            leave_category: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaveStatus {
    Pending,
    Forwarded,
    Approved,
    Rejected,
}

impl LeaveStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Forwarded => "Forwarded",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub id: RequestId,
    pub employee_id: EmployeeId,
    pub employee: EmployeeSnapshot,
    #[serde(rename = "type")]
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: u32,
    pub reason: String,
    pub status: LeaveStatus,
    pub applied_on: NaiveDate,
    #[serde(default)]
    pub approval_chain: Vec<ApprovalStep>,
    #[serde(default)]
    pub current_approver: Option<ApprovalRole>,
    #[serde(default)]
    pub paid_days: Option<u32>,
    #[serde(default)]
    pub unpaid_days: Option<u32>,
    #[serde(default)]
    pub leave_category: Option<String>,
    #[serde(default)]
    pub reviewed_by: Option<String>,
    #[serde(default)]
    pub reviewed_on: Option<NaiveDate>,
    #[serde(default)]
    pub expected_delivery_date: Option<NaiveDate>,
}

/// Leave application payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLeave {
    pub employee_id: EmployeeId,
    #[serde(rename = "type")]
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    #[serde(default)]
    pub expected_delivery_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromotionStatus {
    Pending,
    #[serde(rename = "Under Review")]
    UnderReview,
    Approved,
    Rejected,
}

impl PromotionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::UnderReview => "Under Review",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitteeReview {
    pub meeting_date: NaiveDate,
    pub notes: String,
    pub scheduled_by: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HrDecision {
    pub decision: Decision,
    pub decided_by: String,
    pub notes: Option<String>,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionRequest {
    pub id: RequestId,
    pub employee_id: EmployeeId,
    pub employee: EmployeeSnapshot,
    pub requested_designation: Designation,
    pub justification: String,
    pub status: PromotionStatus,
    pub applied_on: NaiveDate,
    #[serde(default)]
    pub committee_review: Option<CommitteeReview>,
    #[serde(default)]
    pub hr_decision: Option<HrDecision>,
    #[serde(default)]
    pub approved_on: Option<NaiveDate>,
}

impl PromotionRequest {
    pub fn current_designation(&self) -> Designation {
        self.employee.designation
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPromotion {
    pub employee_id: EmployeeId,
    pub requested_designation: Designation,
    pub justification: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResignationStatus {
    Pending,
    Approved,
    Completed,
}

impl ResignationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandoverStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

/// Answers collected from the departing employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitSurvey {
    pub primary_reason: String,
    /// 1 (very dissatisfied) to 5 (very satisfied).
    pub overall_satisfaction: u8,
    pub would_recommend: bool,
    #[serde(default)]
    pub comments: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResignationRequest {
    pub id: RequestId,
    pub employee_id: EmployeeId,
    pub employee: EmployeeSnapshot,
    pub reason: String,
    pub notice_period_days: u32,
    pub last_working_date: NaiveDate,
    pub status: ResignationStatus,
    pub applied_on: NaiveDate,
    #[serde(default)]
    pub exit_survey: Option<ExitSurvey>,
    #[serde(default)]
    pub handover_status: HandoverStatus,
    #[serde(default)]
    pub approved_by: Option<String>,
    #[serde(default)]
    pub approved_on: Option<NaiveDate>,
    #[serde(default)]
    pub processed_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewResignation {
    pub employee_id: EmployeeId,
    pub reason: String,
    pub notice_period_days: u32,
    pub last_working_date: NaiveDate,
    #[serde(default)]
    pub exit_survey: Option<ExitSurvey>,
}

/// Alumni record written when a resignation is processed. Never re-enters the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExEmployee {
    pub id: String,
    pub employee_id: EmployeeId,
    pub name: String,
    pub email: String,
    pub department: String,
    pub faculty: String,
    pub designation: Designation,
    pub join_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub years_of_service: u32,
    pub exit_reason: String,
    pub exit_survey: Option<ExitSurvey>,
}
